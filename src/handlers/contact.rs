use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    AppState,
    error::ApiError,
    models::{
        ContactFilter, ContactList, ContactMessage, ContactPayload, ContactSubmitResponse,
        MessageResponse, PageParams, Pagination,
    },
};

const DEFAULT_LIMIT: i64 = 20;

/// submit_contact
///
/// [Public Route] Accepts a contact-form submission and stores it unread for
/// the admin inbox. The visitor gets the thank-you message plus the id of
/// the stored submission.
#[utoipa::path(
    post,
    path = "/contact",
    request_body = ContactPayload,
    responses(
        (status = 201, description = "Message received", body = ContactSubmitResponse),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn submit_contact(
    State(state): State<AppState>,
    Json(mut payload): Json<ContactPayload>,
) -> Result<(StatusCode, Json<ContactSubmitResponse>), ApiError> {
    payload.normalize();
    payload.validate()?;

    let stored = state.repo.create_contact_message(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ContactSubmitResponse {
            message: "Thank you for your message. We will get back to you soon.".to_string(),
            id: stored.id,
        }),
    ))
}

/// list_contact_messages
///
/// [Admin Route] Paged inbox, newest first, optionally filtered by read
/// state.
#[utoipa::path(
    get,
    path = "/admin/contact-messages",
    params(ContactFilter),
    responses((status = 200, description = "Messages page", body = ContactList))
)]
pub async fn list_contact_messages(
    State(state): State<AppState>,
    Query(filter): Query<ContactFilter>,
) -> Result<Json<ContactList>, ApiError> {
    let params = PageParams::new(filter.page, filter.limit, DEFAULT_LIMIT);
    let page = state.repo.list_contact_messages(&filter, params).await?;

    Ok(Json(ContactList {
        messages: page.items,
        pagination: Pagination::new(params, page.total),
    }))
}

/// mark_message_read
///
/// [Admin Route] Marks a message read and returns the updated record.
/// Idempotent: marking twice is a no-op.
#[utoipa::path(
    patch,
    path = "/admin/contact-messages/{id}/read",
    responses(
        (status = 200, description = "Updated message", body = ContactMessage),
        (status = 404, description = "Not found")
    )
)]
pub async fn mark_message_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ContactMessage>, ApiError> {
    state
        .repo
        .mark_message_read(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))
}

/// delete_contact_message
///
/// [Admin Route] Removes a message from the inbox.
#[utoipa::path(
    delete,
    path = "/admin/contact-messages/{id}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_contact_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.repo.delete_contact_message(id).await? {
        Ok(Json(MessageResponse::new(
            "Contact message deleted successfully",
        )))
    } else {
        Err(ApiError::NotFound("Message not found".to_string()))
    }
}
