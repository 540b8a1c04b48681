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
        Article, ArticleFilter, ArticleList, ArticlePayload, MessageResponse, PageParams,
        Pagination,
    },
};

const DEFAULT_LIMIT: i64 = 10;

/// list_published_articles
///
/// [Public Route] Paged listing of published articles only, most recently
/// published first.
#[utoipa::path(
    get,
    path = "/sermons/articles",
    params(ArticleFilter),
    responses((status = 200, description = "Articles page", body = ArticleList))
)]
pub async fn list_published_articles(
    State(state): State<AppState>,
    Query(filter): Query<ArticleFilter>,
) -> Result<Json<ArticleList>, ApiError> {
    let params = PageParams::new(filter.page, filter.limit, DEFAULT_LIMIT);
    let page = state.repo.list_articles(&filter, params, true).await?;

    Ok(Json(ArticleList {
        articles: page.items,
        pagination: Pagination::new(params, page.total),
    }))
}

/// get_published_article
///
/// [Public Route] Single article by id. Drafts are invisible here: an
/// unpublished id is a 404, not a 403.
#[utoipa::path(
    get,
    path = "/sermons/articles/{id}",
    responses(
        (status = 200, description = "Article", body = Article),
        (status = 404, description = "Not found or unpublished")
    )
)]
pub async fn get_published_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Article>, ApiError> {
    state
        .repo
        .get_article(id, true)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))
}

/// list_all_articles
///
/// [Admin Route] Every article including drafts, unpaged, for the dashboard
/// table.
#[utoipa::path(
    get,
    path = "/admin/articles",
    responses((status = 200, description = "All articles", body = [Article]))
)]
pub async fn list_all_articles(
    State(state): State<AppState>,
) -> Result<Json<Vec<Article>>, ApiError> {
    Ok(Json(state.repo.list_all_articles().await?))
}

/// create_article
///
/// [Admin Route] Persists a new article. When created already published
/// without an explicit date, publish_date is set to now.
#[utoipa::path(
    post,
    path = "/admin/articles",
    request_body = ArticlePayload,
    responses(
        (status = 201, description = "Created", body = Article),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn create_article(
    State(state): State<AppState>,
    Json(mut payload): Json<ArticlePayload>,
) -> Result<(StatusCode, Json<Article>), ApiError> {
    payload.normalize();
    payload.validate()?;

    let article = state.repo.create_article(payload).await?;
    Ok((StatusCode::CREATED, Json(article)))
}

/// update_article
///
/// [Admin Route] Full replace. Publishing for the first time back-fills
/// publish_date; republishing never moves it.
#[utoipa::path(
    put,
    path = "/admin/articles/{id}",
    request_body = ArticlePayload,
    responses(
        (status = 200, description = "Updated", body = Article),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(mut payload): Json<ArticlePayload>,
) -> Result<Json<Article>, ApiError> {
    payload.normalize();
    payload.validate()?;

    state
        .repo
        .update_article(id, payload)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Article not found".to_string()))
}

/// delete_article
///
/// [Admin Route] Removes an article.
#[utoipa::path(
    delete,
    path = "/admin/articles/{id}",
    responses(
        (status = 200, description = "Deleted", body = MessageResponse),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    if state.repo.delete_article(id).await? {
        Ok(Json(MessageResponse::new("Article deleted successfully")))
    } else {
        Err(ApiError::NotFound("Article not found".to_string()))
    }
}
