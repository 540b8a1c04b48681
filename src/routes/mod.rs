/// Router Module Index
///
/// Routing is split by access level so authentication is applied at the
/// module boundary rather than per handler.

/// Routes accessible anonymously: the public site reads, the contact form,
/// login, and the development-only admin bootstrap. Handlers here must
/// enforce visibility (published articles, active ministries) at the
/// repository level.
pub mod public;

/// The admin dashboard API, nested under /admin. Everything except
/// POST /admin/login sits behind the bearer-token middleware.
pub mod admin;
