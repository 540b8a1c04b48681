use std::{
    collections::HashMap,
    net::SocketAddr,
    num::NonZeroU32,
    sync::{Arc, RwLock},
    time::Duration,
};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter as GovRateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};

use crate::{AppState, error::ApiError};

type IpRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// RateLimiterState
///
/// Blanket per-client request ceiling, keyed by source IP. Each IP gets its
/// own limiter whose quota approximates "max_requests per window": a full
/// burst is available up front and refills at window/max_requests per slot.
pub struct RateLimiterState {
    limiters: RwLock<HashMap<String, Arc<IpRateLimiter>>>,
    quota: Quota,
}

impl RateLimiterState {
    pub fn new(window_secs: u64, max_requests: u32) -> Self {
        let max = NonZeroU32::new(max_requests)
            .unwrap_or(NonZeroU32::new(100).unwrap_or(NonZeroU32::MIN));
        let window = Duration::from_secs(window_secs.max(1));
        let quota = Quota::with_period(window / max.get())
            .unwrap_or_else(|| Quota::per_second(max))
            .allow_burst(max);

        Self {
            limiters: RwLock::new(HashMap::new()),
            quota,
        }
    }

    fn get_or_create_limiter(&self, key: &str) -> Arc<IpRateLimiter> {
        {
            if let Ok(limiters) = self.limiters.read() {
                if let Some(limiter) = limiters.get(key) {
                    return limiter.clone();
                }
            }
        }

        let limiter = Arc::new(GovRateLimiter::direct(self.quota));
        if let Ok(mut limiters) = self.limiters.write() {
            // Another task may have raced us; keep whichever landed first.
            return limiters
                .entry(key.to_string())
                .or_insert(limiter)
                .clone();
        }
        limiter
    }

    /// Returns Ok(()) if the request is within quota, or Err with the number
    /// of seconds the client should wait.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let limiter = self.get_or_create_limiter(key);

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait = not_until.wait_time_from(governor::clock::Clock::now(
                    &governor::clock::DefaultClock::default(),
                ));
                Err(wait.as_secs().max(1))
            }
        }
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field(
                "active_limiters",
                &self.limiters.read().map(|l| l.len()).unwrap_or(0),
            )
            .finish()
    }
}

/// Derives the limiter key for a request: the first address in
/// `x-forwarded-for` when present (reverse-proxy deployments), otherwise the
/// peer address.
fn client_key(req: &Request<Body>) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(ip) = forwarded
            .split(',')
            .next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            return ip.to_string();
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware applying the per-IP ceiling to every route it wraps. Over-quota
/// requests get a 429 with a Retry-After header.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let key = client_key(&req);

    if let Err(retry_after) = state.rate_limiter.check(&key) {
        let mut response = ApiError::RateLimited.into_response();
        if let Ok(value) = header::HeaderValue::from_str(&retry_after.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    next.run(req).await
}
