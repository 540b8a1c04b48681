use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- Allowed enum sets ---
//
// Categories and statuses travel as validated strings so that an invalid
// value produces a 400 naming the field instead of an anonymous
// deserialization failure.

pub const SERMON_CATEGORIES: [&str; 4] =
    ["Expository", "Book Study", "Confession Study", "Topical"];
pub const MISSION_STATUSES: [&str; 3] = ["Active", "Completed", "On Hold"];

fn validate_sermon_category(category: &str) -> Result<(), ValidationError> {
    if SERMON_CATEGORIES.contains(&category) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_category");
        err.message = Some("Valid category is required".into());
        Err(err)
    }
}

fn validate_mission_status(status: &str) -> Result<(), ValidationError> {
    if MISSION_STATUSES.contains(&status) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_status");
        err.message = Some("Valid status is required".into());
        Err(err)
    }
}

fn validate_short_strings(items: &Vec<String>) -> Result<(), ValidationError> {
    if items.iter().all(|s| s.len() <= 200) {
        Ok(())
    } else {
        let mut err = ValidationError::new("element_too_long");
        err.message = Some("Each entry must be at most 200 characters".into());
        Err(err)
    }
}

fn validate_member_names(items: &Vec<String>) -> Result<(), ValidationError> {
    if items.iter().all(|s| s.len() <= 100) {
        Ok(())
    } else {
        let mut err = ValidationError::new("name_too_long");
        err.message = Some("Each team member must be at most 100 characters".into());
        Err(err)
    }
}

fn default_true() -> bool {
    true
}

fn default_mission_status() -> String {
    "Active".to_string()
}

// --- Pure pre-persist functions ---
//
// The original schema performed these mutations in implicit pre-save hooks;
// here they are explicit functions the service layer calls right before
// handing data to the repository.

/// Trims, drops empties, and lowercases a tag list.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Resolves an article's publish date. Priority: an explicitly requested
/// date, then the already-stored one, then `now` if the article is being
/// published. An unpublished article with no prior date stays unset.
pub fn resolve_publish_date(
    is_published: bool,
    requested: Option<DateTime<Utc>>,
    existing: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    requested
        .or(existing)
        .or_else(|| is_published.then_some(now))
}

// --- Entities ---

/// Sermon
///
/// A recorded or scheduled sermon. `scriptures` and `tags` are free-form
/// string lists; tags are lowercased on write.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Sermon {
    pub id: Uuid,
    pub title: String,
    pub speaker: String,
    #[ts(type = "string")]
    pub date: DateTime<Utc>,
    pub category: String,
    pub description: String,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub video_url: Option<String>,
    /// Minutes, 1..=180.
    pub duration: Option<i32>,
    pub scriptures: Vec<String>,
    pub tags: Vec<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Article
///
/// Only published articles are visible on public routes. `publish_date` is
/// back-filled the first time `is_published` becomes true.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub content: String,
    pub excerpt: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub is_published: bool,
    #[ts(type = "string | null")]
    pub publish_date: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// A place a mission operates in. Stored inside the mission document.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MissionLocation {
    #[validate(length(min = 1, max = 200, message = "Location name is required"))]
    #[serde(default)]
    pub name: String,
    #[validate(length(min = 1, max = 500, message = "Location address is required"))]
    #[serde(default)]
    pub address: String,
    #[validate(length(min = 1, max = 1000, message = "Location description is required"))]
    #[serde(default)]
    pub description: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A dated progress report attached to a mission.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MissionUpdate {
    #[validate(length(min = 1, max = 200, message = "Update title is required"))]
    #[serde(default)]
    pub title: String,
    #[validate(length(min = 1, max = 2000, message = "Update content is required"))]
    #[serde(default)]
    pub content: String,
    #[ts(type = "string")]
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub photos: Vec<String>,
}

/// Mission
///
/// A mission is read and written as one document; locations and updates are
/// JSONB sub-documents.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Mission {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub purpose: String,
    #[ts(type = "string")]
    pub start_date: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub end_date: Option<DateTime<Utc>>,
    pub status: String,
    pub image_url: Option<String>,
    #[sqlx(json)]
    pub locations: Vec<MissionLocation>,
    #[sqlx(json)]
    pub updates: Vec<MissionUpdate>,
    pub budget: Option<f64>,
    pub team_members: Option<Vec<String>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// Ministry
///
/// Only active ministries are visible on public routes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Ministry {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub purpose: String,
    pub meeting_time: String,
    pub meeting_location: String,
    pub contact_person: String,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub activities: Vec<String>,
    pub age_group: Option<String>,
    pub capacity: Option<i32>,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// ContactMessage
///
/// A submission from the public contact form, tracked by the admin inbox.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub message: String,
    pub is_read: bool,
    pub is_resolved: bool,
    pub admin_notes: Option<String>,
    #[ts(type = "string | null")]
    pub resolved_at: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// User
///
/// Admin credential record. The password hash never leaves the process: it
/// is skipped during serialization, and responses use [`PublicUser`].
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The user shape embedded in login responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub role: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
        }
    }
}

// --- Request payloads ---

/// Input for creating or fully updating a sermon. Required strings default
/// to empty so a missing field reports as a length violation naming it.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SermonPayload {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    #[serde(default)]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Speaker is required"))]
    #[serde(default)]
    pub speaker: String,
    #[validate(required(message = "Valid date is required"))]
    #[ts(type = "string")]
    pub date: Option<DateTime<Utc>>,
    #[validate(custom(function = "validate_sermon_category"))]
    #[serde(default)]
    pub category: String,
    #[validate(length(
        min = 10,
        max = 1000,
        message = "Description must be between 10 and 1000 characters"
    ))]
    #[serde(default)]
    pub description: String,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
    #[validate(url(message = "Audio URL must be a valid URL"))]
    pub audio_url: Option<String>,
    #[validate(url(message = "Video URL must be a valid URL"))]
    pub video_url: Option<String>,
    #[validate(range(min = 1, max = 180, message = "Duration must be between 1 and 180 minutes"))]
    pub duration: Option<i32>,
    #[serde(default)]
    pub scriptures: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SermonPayload {
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.speaker = self.speaker.trim().to_string();
        self.scriptures = self
            .scriptures
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self.tags = normalize_tags(&self.tags);
    }
}

/// Input for creating or fully updating an article.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ArticlePayload {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    #[serde(default)]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Author is required"))]
    #[serde(default)]
    pub author: String,
    #[validate(length(min = 10, message = "Content must be at least 10 characters"))]
    #[serde(default)]
    pub content: String,
    #[validate(length(
        min = 10,
        max = 500,
        message = "Excerpt must be between 10 and 500 characters"
    ))]
    #[serde(default)]
    pub excerpt: String,
    #[validate(length(min = 1, max = 50, message = "Category is required"))]
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_published: bool,
    #[ts(type = "string | null")]
    pub publish_date: Option<DateTime<Utc>>,
}

impl ArticlePayload {
    pub fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.author = self.author.trim().to_string();
        self.category = self.category.trim().to_string();
        self.tags = normalize_tags(&self.tags);
    }
}

/// Input for creating or fully updating a mission.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MissionPayload {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    #[serde(default)]
    pub name: String,
    #[validate(length(
        min = 10,
        max = 1000,
        message = "Description must be between 10 and 1000 characters"
    ))]
    #[serde(default)]
    pub description: String,
    #[validate(length(
        min = 10,
        max = 500,
        message = "Purpose must be between 10 and 500 characters"
    ))]
    #[serde(default)]
    pub purpose: String,
    #[validate(required(message = "Valid start date is required"))]
    #[ts(type = "string")]
    pub start_date: Option<DateTime<Utc>>,
    #[ts(type = "string | null")]
    pub end_date: Option<DateTime<Utc>>,
    #[validate(custom(function = "validate_mission_status"))]
    #[serde(default = "default_mission_status")]
    pub status: String,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
    #[validate(nested)]
    #[serde(default)]
    pub locations: Vec<MissionLocation>,
    #[validate(nested)]
    #[serde(default)]
    pub updates: Vec<MissionUpdate>,
    #[validate(range(min = 0.0, message = "Budget must be non-negative"))]
    pub budget: Option<f64>,
    #[validate(custom(function = "validate_member_names"))]
    #[serde(default)]
    pub team_members: Vec<String>,
}

impl MissionPayload {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.team_members = self
            .team_members
            .iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
    }
}

/// Input for creating or fully updating a ministry.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MinistryPayload {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    #[serde(default)]
    pub name: String,
    #[validate(length(
        min = 10,
        max = 1000,
        message = "Description must be between 10 and 1000 characters"
    ))]
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, max = 500, message = "Purpose is required"))]
    #[serde(default)]
    pub purpose: String,
    #[validate(length(min = 1, max = 100, message = "Meeting time is required"))]
    #[serde(default)]
    pub meeting_time: String,
    #[validate(length(min = 1, max = 200, message = "Meeting location is required"))]
    #[serde(default)]
    pub meeting_location: String,
    #[validate(length(min = 1, max = 100, message = "Contact person is required"))]
    #[serde(default)]
    pub contact_person: String,
    #[validate(email(message = "Valid contact email is required"))]
    #[serde(default)]
    pub contact_email: String,
    #[validate(length(max = 20, message = "Contact phone must be at most 20 characters"))]
    pub contact_phone: Option<String>,
    #[validate(url(message = "Image URL must be a valid URL"))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[validate(custom(function = "validate_short_strings"))]
    #[serde(default)]
    pub activities: Vec<String>,
    #[validate(length(max = 50, message = "Age group must be at most 50 characters"))]
    pub age_group: Option<String>,
    #[validate(range(min = 1, max = 1000, message = "Capacity must be between 1 and 1000"))]
    pub capacity: Option<i32>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl MinistryPayload {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.contact_email = self.contact_email.trim().to_lowercase();
    }
}

/// Input for the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ContactPayload {
    #[validate(length(
        min = 2,
        max = 100,
        message = "Name must be between 2 and 100 characters"
    ))]
    #[serde(default)]
    pub name: String,
    #[validate(email(message = "Please provide a valid email address"))]
    #[serde(default)]
    pub email: String,
    #[validate(length(
        min = 10,
        max = 2000,
        message = "Message must be between 10 and 2000 characters"
    ))]
    #[serde(default)]
    pub message: String,
}

impl ContactPayload {
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();
        self.email = self.email.trim().to_lowercase();
        self.message = self.message.trim().to_string();
    }
}

/// Login input for `/auth/login` and `/admin/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct LoginRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[serde(default)]
    pub password: String,
}

/// Input for the development-only bootstrap endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateAdminRequest {
    #[validate(length(min = 3, message = "Username must be at least 3 characters"))]
    #[serde(default)]
    pub username: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    #[serde(default)]
    pub password: String,
}

// --- Query filters ---

/// Query parameters for the public and admin sermon listings.
#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SermonFilter {
    /// Exact category match; "All" disables the filter.
    pub category: Option<String>,
    /// Case-insensitive substring match on the speaker.
    pub speaker: Option<String>,
    /// Case-insensitive substring match across title/description/speaker.
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Query parameters for article listings.
#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ArticleFilter {
    pub category: Option<String>,
    /// Case-insensitive substring match on the author.
    pub author: Option<String>,
    /// Case-insensitive substring match across title/excerpt/content.
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Query parameters for mission listings.
#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MissionFilter {
    pub status: Option<String>,
    /// Case-insensitive substring match on location names.
    pub location: Option<String>,
    pub limit: Option<i64>,
}

/// Query parameters for ministry listings.
#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct MinistryFilter {
    pub age_group: Option<String>,
    /// Case-insensitive substring match on name/description.
    pub search: Option<String>,
}

/// Query parameters for the admin contact inbox.
#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ContactFilter {
    pub is_read: Option<bool>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

// --- Pagination ---

/// Sanitized page/limit pair. Page starts at 1; limit is clamped to 1..=100.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(default_limit).clamp(1, 100),
        }
    }

    pub fn offset(&self) -> i64 {
        // Saturates so an absurd client-supplied page cannot overflow; the
        // query just comes back empty.
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// ceil(total / limit) without floating point.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if total == 0 { 0 } else { (total + limit - 1) / limit }
}

/// The pagination envelope attached to paged list responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Pagination {
    pub current: i64,
    pub pages: i64,
    pub total: i64,
}

impl Pagination {
    pub fn new(params: PageParams, total: i64) -> Self {
        Self {
            current: params.page,
            pages: page_count(total, params.limit),
            total,
        }
    }
}

/// One page of repository results plus the unpaged total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

// --- Response envelopes ---

#[derive(Debug, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SermonList {
    pub sermons: Vec<Sermon>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ArticleList {
    pub articles: Vec<Article>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContactList {
    pub messages: Vec<ContactMessage>,
    pub pagination: Pagination,
}

/// Output of `GET /admin/stats`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, FromRow)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    pub sermons: i64,
    pub missions: i64,
    /// Active ministries only.
    pub ministries: i64,
    /// Contact messages with `is_read = false`.
    pub unread_messages: i64,
}

/// Output of a successful login.
#[derive(Debug, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

/// Output of the development-only admin bootstrap.
#[derive(Debug, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateAdminResponse {
    pub message: String,
    pub user: PublicUser,
}

/// Output of a public contact-form submission: the thank-you text plus the
/// id of the stored message.
#[derive(Debug, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ContactSubmitResponse {
    pub message: String,
    pub id: Uuid,
}

/// Bare acknowledgment body, e.g. "Sermon deleted successfully".
#[derive(Debug, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Output of a successful upload.
#[derive(Debug, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UploadResponse {
    pub url: String,
}
