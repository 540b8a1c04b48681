use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder, types::Json};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{
    Article, ArticleFilter, ArticlePayload, ContactFilter, ContactMessage, ContactPayload,
    DashboardStats, Ministry, MinistryFilter, MinistryPayload, Mission, MissionFilter,
    MissionPayload, Page, PageParams, Sermon, SermonFilter, SermonPayload, User,
    resolve_publish_date,
};

/// Repository Trait
///
/// The abstract contract for all persistence operations. Handlers talk to
/// this trait only, so the Postgres implementation can be swapped for the
/// in-memory one in tests.
///
/// Inputs arrive already normalized and validated; the repository assigns
/// ids and timestamps. Every method surfaces storage failures as
/// `sqlx::Error`, which the error layer maps to a generic 500.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Sermons ---
    async fn list_sermons(
        &self,
        filter: &SermonFilter,
        params: PageParams,
    ) -> Result<Page<Sermon>, sqlx::Error>;
    /// Admin listing: every sermon, unpaged, newest first.
    async fn list_all_sermons(&self) -> Result<Vec<Sermon>, sqlx::Error>;
    async fn get_sermon(&self, id: Uuid) -> Result<Option<Sermon>, sqlx::Error>;
    async fn create_sermon(&self, payload: SermonPayload) -> Result<Sermon, sqlx::Error>;
    /// Full replace. Preserves created_at, bumps updated_at. None if absent.
    async fn update_sermon(
        &self,
        id: Uuid,
        payload: SermonPayload,
    ) -> Result<Option<Sermon>, sqlx::Error>;
    async fn delete_sermon(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Articles ---
    /// `published_only` is set for public routes and clear for admin ones.
    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        params: PageParams,
        published_only: bool,
    ) -> Result<Page<Article>, sqlx::Error>;
    /// Admin listing: every article including drafts, unpaged.
    async fn list_all_articles(&self) -> Result<Vec<Article>, sqlx::Error>;
    async fn get_article(
        &self,
        id: Uuid,
        published_only: bool,
    ) -> Result<Option<Article>, sqlx::Error>;
    async fn create_article(&self, payload: ArticlePayload) -> Result<Article, sqlx::Error>;
    async fn update_article(
        &self,
        id: Uuid,
        payload: ArticlePayload,
    ) -> Result<Option<Article>, sqlx::Error>;
    async fn delete_article(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Missions ---
    async fn list_missions(&self, filter: &MissionFilter) -> Result<Vec<Mission>, sqlx::Error>;
    async fn list_all_missions(&self) -> Result<Vec<Mission>, sqlx::Error>;
    async fn get_mission(&self, id: Uuid) -> Result<Option<Mission>, sqlx::Error>;
    async fn create_mission(&self, payload: MissionPayload) -> Result<Mission, sqlx::Error>;
    async fn update_mission(
        &self,
        id: Uuid,
        payload: MissionPayload,
    ) -> Result<Option<Mission>, sqlx::Error>;
    async fn delete_mission(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Ministries ---
    /// `active_only` is set for public routes.
    async fn list_ministries(
        &self,
        filter: &MinistryFilter,
        active_only: bool,
    ) -> Result<Vec<Ministry>, sqlx::Error>;
    async fn list_all_ministries(&self) -> Result<Vec<Ministry>, sqlx::Error>;
    async fn get_ministry(
        &self,
        id: Uuid,
        active_only: bool,
    ) -> Result<Option<Ministry>, sqlx::Error>;
    async fn create_ministry(&self, payload: MinistryPayload) -> Result<Ministry, sqlx::Error>;
    async fn update_ministry(
        &self,
        id: Uuid,
        payload: MinistryPayload,
    ) -> Result<Option<Ministry>, sqlx::Error>;
    async fn delete_ministry(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Contact messages ---
    async fn create_contact_message(
        &self,
        payload: ContactPayload,
    ) -> Result<ContactMessage, sqlx::Error>;
    async fn list_contact_messages(
        &self,
        filter: &ContactFilter,
        params: PageParams,
    ) -> Result<Page<ContactMessage>, sqlx::Error>;
    async fn mark_message_read(&self, id: Uuid) -> Result<Option<ContactMessage>, sqlx::Error>;
    async fn delete_contact_message(&self, id: Uuid) -> Result<bool, sqlx::Error>;

    // --- Users ---
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, sqlx::Error>;

    // --- Dashboard ---
    async fn get_stats(&self) -> Result<DashboardStats, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

const SERMON_COLS: &str = "id, title, speaker, date, category, description, image_url, \
     audio_url, video_url, duration, scriptures, tags, created_at, updated_at";
const ARTICLE_COLS: &str = "id, title, author, content, excerpt, category, tags, image_url, \
     is_published, publish_date, created_at, updated_at";
const MISSION_COLS: &str = "id, name, description, purpose, start_date, end_date, status, \
     image_url, locations, updates, budget, team_members, created_at, updated_at";
const MINISTRY_COLS: &str = "id, name, description, purpose, meeting_time, meeting_location, \
     contact_person, contact_email, contact_phone, image_url, images, activities, age_group, \
     capacity, is_active, created_at, updated_at";
const CONTACT_COLS: &str =
    "id, name, email, message, is_read, is_resolved, admin_notes, resolved_at, \
     created_at, updated_at";

/// PostgresRepository
///
/// The production implementation, backed by a PostgreSQL pool. List
/// endpoints use QueryBuilder so every filter value is bound, never
/// interpolated.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A filter value of "All" (any case) disables that filter; the public
/// frontends send it as the default dropdown choice.
fn effective<'a>(value: &'a Option<String>) -> Option<&'a str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn push_sermon_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &SermonFilter) {
    if let Some(category) = effective(&filter.category) {
        builder.push(" AND category = ");
        builder.push_bind(category.to_string());
    }
    if let Some(speaker) = effective(&filter.speaker) {
        builder.push(" AND speaker ILIKE ");
        builder.push_bind(format!("%{speaker}%"));
    }
    if let Some(search) = effective(&filter.search) {
        let pattern = format!("%{search}%");
        builder.push(" AND (title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR description ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR speaker ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

fn push_article_filters(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &ArticleFilter,
    published_only: bool,
) {
    if published_only {
        builder.push(" AND is_published = TRUE");
    }
    if let Some(category) = effective(&filter.category) {
        builder.push(" AND category = ");
        builder.push_bind(category.to_string());
    }
    if let Some(author) = effective(&filter.author) {
        builder.push(" AND author ILIKE ");
        builder.push_bind(format!("%{author}%"));
    }
    if let Some(search) = effective(&filter.search) {
        let pattern = format!("%{search}%");
        builder.push(" AND (title ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR excerpt ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR content ILIKE ");
        builder.push_bind(pattern);
        builder.push(")");
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_sermons(
        &self,
        filter: &SermonFilter,
        params: PageParams,
    ) -> Result<Page<Sermon>, sqlx::Error> {
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM sermons WHERE 1=1");
        push_sermon_filters(&mut count_builder, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {SERMON_COLS} FROM sermons WHERE 1=1"));
        push_sermon_filters(&mut builder, filter);
        builder.push(" ORDER BY date DESC LIMIT ");
        builder.push_bind(params.limit);
        builder.push(" OFFSET ");
        builder.push_bind(params.offset());

        let items = builder
            .build_query_as::<Sermon>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page { items, total })
    }

    async fn list_all_sermons(&self) -> Result<Vec<Sermon>, sqlx::Error> {
        sqlx::query_as::<_, Sermon>(&format!(
            "SELECT {SERMON_COLS} FROM sermons ORDER BY date DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn get_sermon(&self, id: Uuid) -> Result<Option<Sermon>, sqlx::Error> {
        sqlx::query_as::<_, Sermon>(&format!(
            "SELECT {SERMON_COLS} FROM sermons WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_sermon(&self, payload: SermonPayload) -> Result<Sermon, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Sermon>(&format!(
            "INSERT INTO sermons \
             (id, title, speaker, date, category, description, image_url, audio_url, \
              video_url, duration, scriptures, tags, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13) \
             RETURNING {SERMON_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(payload.title)
        .bind(payload.speaker)
        .bind(payload.date.unwrap_or(now))
        .bind(payload.category)
        .bind(payload.description)
        .bind(payload.image_url)
        .bind(payload.audio_url)
        .bind(payload.video_url)
        .bind(payload.duration)
        .bind(payload.scriptures)
        .bind(payload.tags)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_sermon(
        &self,
        id: Uuid,
        payload: SermonPayload,
    ) -> Result<Option<Sermon>, sqlx::Error> {
        sqlx::query_as::<_, Sermon>(&format!(
            "UPDATE sermons SET \
             title = $2, speaker = $3, date = $4, category = $5, description = $6, \
             image_url = $7, audio_url = $8, video_url = $9, duration = $10, \
             scriptures = $11, tags = $12, updated_at = $13 \
             WHERE id = $1 RETURNING {SERMON_COLS}"
        ))
        .bind(id)
        .bind(payload.title)
        .bind(payload.speaker)
        .bind(payload.date.unwrap_or_else(Utc::now))
        .bind(payload.category)
        .bind(payload.description)
        .bind(payload.image_url)
        .bind(payload.audio_url)
        .bind(payload.video_url)
        .bind(payload.duration)
        .bind(payload.scriptures)
        .bind(payload.tags)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_sermon(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sermons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        params: PageParams,
        published_only: bool,
    ) -> Result<Page<Article>, sqlx::Error> {
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM articles WHERE 1=1");
        push_article_filters(&mut count_builder, filter, published_only);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {ARTICLE_COLS} FROM articles WHERE 1=1"));
        push_article_filters(&mut builder, filter, published_only);
        // NULLS LAST keeps never-published drafts at the tail of admin lists.
        builder.push(" ORDER BY publish_date DESC NULLS LAST, created_at DESC LIMIT ");
        builder.push_bind(params.limit);
        builder.push(" OFFSET ");
        builder.push_bind(params.offset());

        let items = builder
            .build_query_as::<Article>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page { items, total })
    }

    async fn list_all_articles(&self) -> Result<Vec<Article>, sqlx::Error> {
        sqlx::query_as::<_, Article>(&format!(
            "SELECT {ARTICLE_COLS} FROM articles \
             ORDER BY publish_date DESC NULLS LAST, created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn get_article(
        &self,
        id: Uuid,
        published_only: bool,
    ) -> Result<Option<Article>, sqlx::Error> {
        let sql = if published_only {
            format!("SELECT {ARTICLE_COLS} FROM articles WHERE id = $1 AND is_published = TRUE")
        } else {
            format!("SELECT {ARTICLE_COLS} FROM articles WHERE id = $1")
        };
        sqlx::query_as::<_, Article>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_article(&self, payload: ArticlePayload) -> Result<Article, sqlx::Error> {
        let now = Utc::now();
        let publish_date =
            resolve_publish_date(payload.is_published, payload.publish_date, None, now);

        sqlx::query_as::<_, Article>(&format!(
            "INSERT INTO articles \
             (id, title, author, content, excerpt, category, tags, image_url, \
              is_published, publish_date, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $11) \
             RETURNING {ARTICLE_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(payload.title)
        .bind(payload.author)
        .bind(payload.content)
        .bind(payload.excerpt)
        .bind(payload.category)
        .bind(payload.tags)
        .bind(payload.image_url)
        .bind(payload.is_published)
        .bind(publish_date)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_article(
        &self,
        id: Uuid,
        payload: ArticlePayload,
    ) -> Result<Option<Article>, sqlx::Error> {
        let now = Utc::now();
        // COALESCE($requested, publish_date, $now_if_published) mirrors the
        // resolve_publish_date priority: an explicit date wins, the stored
        // one survives, and first publication back-fills the current time.
        let now_if_published = payload.is_published.then_some(now);

        sqlx::query_as::<_, Article>(&format!(
            "UPDATE articles SET \
             title = $2, author = $3, content = $4, excerpt = $5, category = $6, \
             tags = $7, image_url = $8, is_published = $9, \
             publish_date = COALESCE($10, publish_date, $11), updated_at = $12 \
             WHERE id = $1 RETURNING {ARTICLE_COLS}"
        ))
        .bind(id)
        .bind(payload.title)
        .bind(payload.author)
        .bind(payload.content)
        .bind(payload.excerpt)
        .bind(payload.category)
        .bind(payload.tags)
        .bind(payload.image_url)
        .bind(payload.is_published)
        .bind(payload.publish_date)
        .bind(now_if_published)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_article(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_missions(&self, filter: &MissionFilter) -> Result<Vec<Mission>, sqlx::Error> {
        let limit = filter.limit.unwrap_or(20).clamp(1, 100);

        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {MISSION_COLS} FROM missions WHERE 1=1"));
        if let Some(status) = effective(&filter.status) {
            builder.push(" AND status = ");
            builder.push_bind(status.to_string());
        }
        if let Some(location) = effective(&filter.location) {
            builder.push(
                " AND EXISTS (SELECT 1 FROM jsonb_array_elements(locations) loc \
                 WHERE loc->>'name' ILIKE ",
            );
            builder.push_bind(format!("%{location}%"));
            builder.push(")");
        }
        builder.push(" ORDER BY start_date DESC LIMIT ");
        builder.push_bind(limit);

        builder.build_query_as::<Mission>().fetch_all(&self.pool).await
    }

    async fn list_all_missions(&self) -> Result<Vec<Mission>, sqlx::Error> {
        sqlx::query_as::<_, Mission>(&format!(
            "SELECT {MISSION_COLS} FROM missions ORDER BY start_date DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn get_mission(&self, id: Uuid) -> Result<Option<Mission>, sqlx::Error> {
        sqlx::query_as::<_, Mission>(&format!(
            "SELECT {MISSION_COLS} FROM missions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_mission(&self, payload: MissionPayload) -> Result<Mission, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Mission>(&format!(
            "INSERT INTO missions \
             (id, name, description, purpose, start_date, end_date, status, image_url, \
              locations, updates, budget, team_members, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13) \
             RETURNING {MISSION_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.purpose)
        .bind(payload.start_date.unwrap_or(now))
        .bind(payload.end_date)
        .bind(payload.status)
        .bind(payload.image_url)
        .bind(Json(payload.locations))
        .bind(Json(payload.updates))
        .bind(payload.budget)
        .bind(payload.team_members)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_mission(
        &self,
        id: Uuid,
        payload: MissionPayload,
    ) -> Result<Option<Mission>, sqlx::Error> {
        sqlx::query_as::<_, Mission>(&format!(
            "UPDATE missions SET \
             name = $2, description = $3, purpose = $4, start_date = $5, end_date = $6, \
             status = $7, image_url = $8, locations = $9, updates = $10, budget = $11, \
             team_members = $12, updated_at = $13 \
             WHERE id = $1 RETURNING {MISSION_COLS}"
        ))
        .bind(id)
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.purpose)
        .bind(payload.start_date.unwrap_or_else(Utc::now))
        .bind(payload.end_date)
        .bind(payload.status)
        .bind(payload.image_url)
        .bind(Json(payload.locations))
        .bind(Json(payload.updates))
        .bind(payload.budget)
        .bind(payload.team_members)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_mission(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM missions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_ministries(
        &self,
        filter: &MinistryFilter,
        active_only: bool,
    ) -> Result<Vec<Ministry>, sqlx::Error> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {MINISTRY_COLS} FROM ministries WHERE 1=1"));
        if active_only {
            builder.push(" AND is_active = TRUE");
        }
        if let Some(age_group) = effective(&filter.age_group) {
            builder.push(" AND age_group = ");
            builder.push_bind(age_group.to_string());
        }
        if let Some(search) = effective(&filter.search) {
            let pattern = format!("%{search}%");
            builder.push(" AND (name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR description ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
        builder.push(" ORDER BY name ASC");

        builder
            .build_query_as::<Ministry>()
            .fetch_all(&self.pool)
            .await
    }

    async fn list_all_ministries(&self) -> Result<Vec<Ministry>, sqlx::Error> {
        sqlx::query_as::<_, Ministry>(&format!(
            "SELECT {MINISTRY_COLS} FROM ministries ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    async fn get_ministry(
        &self,
        id: Uuid,
        active_only: bool,
    ) -> Result<Option<Ministry>, sqlx::Error> {
        let sql = if active_only {
            format!("SELECT {MINISTRY_COLS} FROM ministries WHERE id = $1 AND is_active = TRUE")
        } else {
            format!("SELECT {MINISTRY_COLS} FROM ministries WHERE id = $1")
        };
        sqlx::query_as::<_, Ministry>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_ministry(&self, payload: MinistryPayload) -> Result<Ministry, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, Ministry>(&format!(
            "INSERT INTO ministries \
             (id, name, description, purpose, meeting_time, meeting_location, \
              contact_person, contact_email, contact_phone, image_url, images, activities, \
              age_group, capacity, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $16) \
             RETURNING {MINISTRY_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.purpose)
        .bind(payload.meeting_time)
        .bind(payload.meeting_location)
        .bind(payload.contact_person)
        .bind(payload.contact_email)
        .bind(payload.contact_phone)
        .bind(payload.image_url)
        .bind(payload.images)
        .bind(payload.activities)
        .bind(payload.age_group)
        .bind(payload.capacity)
        .bind(payload.is_active)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_ministry(
        &self,
        id: Uuid,
        payload: MinistryPayload,
    ) -> Result<Option<Ministry>, sqlx::Error> {
        sqlx::query_as::<_, Ministry>(&format!(
            "UPDATE ministries SET \
             name = $2, description = $3, purpose = $4, meeting_time = $5, \
             meeting_location = $6, contact_person = $7, contact_email = $8, \
             contact_phone = $9, image_url = $10, images = $11, activities = $12, \
             age_group = $13, capacity = $14, is_active = $15, updated_at = $16 \
             WHERE id = $1 RETURNING {MINISTRY_COLS}"
        ))
        .bind(id)
        .bind(payload.name)
        .bind(payload.description)
        .bind(payload.purpose)
        .bind(payload.meeting_time)
        .bind(payload.meeting_location)
        .bind(payload.contact_person)
        .bind(payload.contact_email)
        .bind(payload.contact_phone)
        .bind(payload.image_url)
        .bind(payload.images)
        .bind(payload.activities)
        .bind(payload.age_group)
        .bind(payload.capacity)
        .bind(payload.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_ministry(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM ministries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_contact_message(
        &self,
        payload: ContactPayload,
    ) -> Result<ContactMessage, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, ContactMessage>(&format!(
            "INSERT INTO contact_messages (id, name, email, message, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) RETURNING {CONTACT_COLS}"
        ))
        .bind(Uuid::new_v4())
        .bind(payload.name)
        .bind(payload.email)
        .bind(payload.message)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    async fn list_contact_messages(
        &self,
        filter: &ContactFilter,
        params: PageParams,
    ) -> Result<Page<ContactMessage>, sqlx::Error> {
        let mut count_builder: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM contact_messages WHERE 1=1");
        if let Some(is_read) = filter.is_read {
            count_builder.push(" AND is_read = ");
            count_builder.push_bind(is_read);
        }
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "SELECT {CONTACT_COLS} FROM contact_messages WHERE 1=1"
        ));
        if let Some(is_read) = filter.is_read {
            builder.push(" AND is_read = ");
            builder.push_bind(is_read);
        }
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(params.limit);
        builder.push(" OFFSET ");
        builder.push_bind(params.offset());

        let items = builder
            .build_query_as::<ContactMessage>()
            .fetch_all(&self.pool)
            .await?;

        Ok(Page { items, total })
    }

    async fn mark_message_read(&self, id: Uuid) -> Result<Option<ContactMessage>, sqlx::Error> {
        sqlx::query_as::<_, ContactMessage>(&format!(
            "UPDATE contact_messages SET is_read = TRUE, updated_at = $2 \
             WHERE id = $1 RETURNING {CONTACT_COLS}"
        ))
        .bind(id)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_contact_message(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, role, created_at, updated_at \
             FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, username, password_hash, role, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $5) \
             RETURNING id, username, password_hash, role, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .bind(now)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_stats(&self) -> Result<DashboardStats, sqlx::Error> {
        sqlx::query_as::<_, DashboardStats>(
            "SELECT \
             (SELECT COUNT(*) FROM sermons) AS sermons, \
             (SELECT COUNT(*) FROM missions) AS missions, \
             (SELECT COUNT(*) FROM ministries WHERE is_active = TRUE) AS ministries, \
             (SELECT COUNT(*) FROM contact_messages WHERE is_read = FALSE) AS unread_messages",
        )
        .fetch_one(&self.pool)
        .await
    }
}

/// MemoryRepository
///
/// In-memory implementation used by the integration tests. Mirrors the
/// Postgres semantics: same filter rules, same sort orders, same publish
/// back-fill behavior.
#[derive(Default)]
pub struct MemoryRepository {
    sermons: Mutex<HashMap<Uuid, Sermon>>,
    articles: Mutex<HashMap<Uuid, Article>>,
    missions: Mutex<HashMap<Uuid, Mission>>,
    ministries: Mutex<HashMap<Uuid, Ministry>>,
    messages: Mutex<HashMap<Uuid, ContactMessage>>,
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn paginate<T: Clone>(mut items: Vec<T>, params: PageParams) -> Page<T> {
    let total = items.len() as i64;
    let start = (params.offset() as usize).min(items.len());
    let end = (start + params.limit as usize).min(items.len());
    items = items[start..end].to_vec();
    Page { items, total }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_sermons(
        &self,
        filter: &SermonFilter,
        params: PageParams,
    ) -> Result<Page<Sermon>, sqlx::Error> {
        let sermons = self.sermons.lock().await;
        let mut items: Vec<Sermon> = sermons
            .values()
            .filter(|s| {
                effective(&filter.category).is_none_or(|c| s.category == c)
                    && effective(&filter.speaker).is_none_or(|sp| matches_ci(&s.speaker, sp))
                    && effective(&filter.search).is_none_or(|q| {
                        matches_ci(&s.title, q)
                            || matches_ci(&s.description, q)
                            || matches_ci(&s.speaker, q)
                    })
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(paginate(items, params))
    }

    async fn list_all_sermons(&self) -> Result<Vec<Sermon>, sqlx::Error> {
        let sermons = self.sermons.lock().await;
        let mut items: Vec<Sermon> = sermons.values().cloned().collect();
        items.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(items)
    }

    async fn get_sermon(&self, id: Uuid) -> Result<Option<Sermon>, sqlx::Error> {
        Ok(self.sermons.lock().await.get(&id).cloned())
    }

    async fn create_sermon(&self, payload: SermonPayload) -> Result<Sermon, sqlx::Error> {
        let now = Utc::now();
        let sermon = Sermon {
            id: Uuid::new_v4(),
            title: payload.title,
            speaker: payload.speaker,
            date: payload.date.unwrap_or(now),
            category: payload.category,
            description: payload.description,
            image_url: payload.image_url,
            audio_url: payload.audio_url,
            video_url: payload.video_url,
            duration: payload.duration,
            scriptures: payload.scriptures,
            tags: payload.tags,
            created_at: now,
            updated_at: now,
        };
        self.sermons.lock().await.insert(sermon.id, sermon.clone());
        Ok(sermon)
    }

    async fn update_sermon(
        &self,
        id: Uuid,
        payload: SermonPayload,
    ) -> Result<Option<Sermon>, sqlx::Error> {
        let mut sermons = self.sermons.lock().await;
        let Some(existing) = sermons.get_mut(&id) else {
            return Ok(None);
        };
        let now = Utc::now();
        existing.title = payload.title;
        existing.speaker = payload.speaker;
        existing.date = payload.date.unwrap_or(now);
        existing.category = payload.category;
        existing.description = payload.description;
        existing.image_url = payload.image_url;
        existing.audio_url = payload.audio_url;
        existing.video_url = payload.video_url;
        existing.duration = payload.duration;
        existing.scriptures = payload.scriptures;
        existing.tags = payload.tags;
        existing.updated_at = now;
        Ok(Some(existing.clone()))
    }

    async fn delete_sermon(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.sermons.lock().await.remove(&id).is_some())
    }

    async fn list_articles(
        &self,
        filter: &ArticleFilter,
        params: PageParams,
        published_only: bool,
    ) -> Result<Page<Article>, sqlx::Error> {
        let articles = self.articles.lock().await;
        let mut items: Vec<Article> = articles
            .values()
            .filter(|a| {
                (!published_only || a.is_published)
                    && effective(&filter.category).is_none_or(|c| a.category == c)
                    && effective(&filter.author).is_none_or(|au| matches_ci(&a.author, au))
                    && effective(&filter.search).is_none_or(|q| {
                        matches_ci(&a.title, q)
                            || matches_ci(&a.excerpt, q)
                            || matches_ci(&a.content, q)
                    })
            })
            .cloned()
            .collect();
        // Some(publish_date) sorts before None, matching NULLS LAST.
        items.sort_by(|a, b| {
            b.publish_date
                .cmp(&a.publish_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(paginate(items, params))
    }

    async fn list_all_articles(&self) -> Result<Vec<Article>, sqlx::Error> {
        let articles = self.articles.lock().await;
        let mut items: Vec<Article> = articles.values().cloned().collect();
        items.sort_by(|a, b| {
            b.publish_date
                .cmp(&a.publish_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(items)
    }

    async fn get_article(
        &self,
        id: Uuid,
        published_only: bool,
    ) -> Result<Option<Article>, sqlx::Error> {
        let articles = self.articles.lock().await;
        Ok(articles
            .get(&id)
            .filter(|a| !published_only || a.is_published)
            .cloned())
    }

    async fn create_article(&self, payload: ArticlePayload) -> Result<Article, sqlx::Error> {
        let now = Utc::now();
        let article = Article {
            id: Uuid::new_v4(),
            title: payload.title,
            author: payload.author,
            content: payload.content,
            excerpt: payload.excerpt,
            category: payload.category,
            tags: payload.tags,
            image_url: payload.image_url,
            is_published: payload.is_published,
            publish_date: resolve_publish_date(
                payload.is_published,
                payload.publish_date,
                None,
                now,
            ),
            created_at: now,
            updated_at: now,
        };
        self.articles
            .lock()
            .await
            .insert(article.id, article.clone());
        Ok(article)
    }

    async fn update_article(
        &self,
        id: Uuid,
        payload: ArticlePayload,
    ) -> Result<Option<Article>, sqlx::Error> {
        let mut articles = self.articles.lock().await;
        let Some(existing) = articles.get_mut(&id) else {
            return Ok(None);
        };
        let now = Utc::now();
        existing.publish_date = resolve_publish_date(
            payload.is_published,
            payload.publish_date,
            existing.publish_date,
            now,
        );
        existing.title = payload.title;
        existing.author = payload.author;
        existing.content = payload.content;
        existing.excerpt = payload.excerpt;
        existing.category = payload.category;
        existing.tags = payload.tags;
        existing.image_url = payload.image_url;
        existing.is_published = payload.is_published;
        existing.updated_at = now;
        Ok(Some(existing.clone()))
    }

    async fn delete_article(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.articles.lock().await.remove(&id).is_some())
    }

    async fn list_missions(&self, filter: &MissionFilter) -> Result<Vec<Mission>, sqlx::Error> {
        let limit = filter.limit.unwrap_or(20).clamp(1, 100) as usize;
        let missions = self.missions.lock().await;
        let mut items: Vec<Mission> = missions
            .values()
            .filter(|m| {
                effective(&filter.status).is_none_or(|s| m.status == s)
                    && effective(&filter.location).is_none_or(|loc| {
                        m.locations.iter().any(|l| matches_ci(&l.name, loc))
                    })
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        items.truncate(limit);
        Ok(items)
    }

    async fn list_all_missions(&self) -> Result<Vec<Mission>, sqlx::Error> {
        let missions = self.missions.lock().await;
        let mut items: Vec<Mission> = missions.values().cloned().collect();
        items.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(items)
    }

    async fn get_mission(&self, id: Uuid) -> Result<Option<Mission>, sqlx::Error> {
        Ok(self.missions.lock().await.get(&id).cloned())
    }

    async fn create_mission(&self, payload: MissionPayload) -> Result<Mission, sqlx::Error> {
        let now = Utc::now();
        let mission = Mission {
            id: Uuid::new_v4(),
            name: payload.name,
            description: payload.description,
            purpose: payload.purpose,
            start_date: payload.start_date.unwrap_or(now),
            end_date: payload.end_date,
            status: payload.status,
            image_url: payload.image_url,
            locations: payload.locations,
            updates: payload.updates,
            budget: payload.budget,
            team_members: Some(payload.team_members),
            created_at: now,
            updated_at: now,
        };
        self.missions
            .lock()
            .await
            .insert(mission.id, mission.clone());
        Ok(mission)
    }

    async fn update_mission(
        &self,
        id: Uuid,
        payload: MissionPayload,
    ) -> Result<Option<Mission>, sqlx::Error> {
        let mut missions = self.missions.lock().await;
        let Some(existing) = missions.get_mut(&id) else {
            return Ok(None);
        };
        let now = Utc::now();
        existing.name = payload.name;
        existing.description = payload.description;
        existing.purpose = payload.purpose;
        existing.start_date = payload.start_date.unwrap_or(now);
        existing.end_date = payload.end_date;
        existing.status = payload.status;
        existing.image_url = payload.image_url;
        existing.locations = payload.locations;
        existing.updates = payload.updates;
        existing.budget = payload.budget;
        existing.team_members = Some(payload.team_members);
        existing.updated_at = now;
        Ok(Some(existing.clone()))
    }

    async fn delete_mission(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.missions.lock().await.remove(&id).is_some())
    }

    async fn list_ministries(
        &self,
        filter: &MinistryFilter,
        active_only: bool,
    ) -> Result<Vec<Ministry>, sqlx::Error> {
        let ministries = self.ministries.lock().await;
        let mut items: Vec<Ministry> = ministries
            .values()
            .filter(|m| {
                (!active_only || m.is_active)
                    && effective(&filter.age_group)
                        .is_none_or(|g| m.age_group.as_deref() == Some(g))
                    && effective(&filter.search).is_none_or(|q| {
                        matches_ci(&m.name, q) || matches_ci(&m.description, q)
                    })
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn list_all_ministries(&self) -> Result<Vec<Ministry>, sqlx::Error> {
        let ministries = self.ministries.lock().await;
        let mut items: Vec<Ministry> = ministries.values().cloned().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn get_ministry(
        &self,
        id: Uuid,
        active_only: bool,
    ) -> Result<Option<Ministry>, sqlx::Error> {
        let ministries = self.ministries.lock().await;
        Ok(ministries
            .get(&id)
            .filter(|m| !active_only || m.is_active)
            .cloned())
    }

    async fn create_ministry(&self, payload: MinistryPayload) -> Result<Ministry, sqlx::Error> {
        let now = Utc::now();
        let ministry = Ministry {
            id: Uuid::new_v4(),
            name: payload.name,
            description: payload.description,
            purpose: payload.purpose,
            meeting_time: payload.meeting_time,
            meeting_location: payload.meeting_location,
            contact_person: payload.contact_person,
            contact_email: payload.contact_email,
            contact_phone: payload.contact_phone,
            image_url: payload.image_url,
            images: payload.images,
            activities: payload.activities,
            age_group: payload.age_group,
            capacity: payload.capacity,
            is_active: payload.is_active,
            created_at: now,
            updated_at: now,
        };
        self.ministries
            .lock()
            .await
            .insert(ministry.id, ministry.clone());
        Ok(ministry)
    }

    async fn update_ministry(
        &self,
        id: Uuid,
        payload: MinistryPayload,
    ) -> Result<Option<Ministry>, sqlx::Error> {
        let mut ministries = self.ministries.lock().await;
        let Some(existing) = ministries.get_mut(&id) else {
            return Ok(None);
        };
        existing.name = payload.name;
        existing.description = payload.description;
        existing.purpose = payload.purpose;
        existing.meeting_time = payload.meeting_time;
        existing.meeting_location = payload.meeting_location;
        existing.contact_person = payload.contact_person;
        existing.contact_email = payload.contact_email;
        existing.contact_phone = payload.contact_phone;
        existing.image_url = payload.image_url;
        existing.images = payload.images;
        existing.activities = payload.activities;
        existing.age_group = payload.age_group;
        existing.capacity = payload.capacity;
        existing.is_active = payload.is_active;
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn delete_ministry(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.ministries.lock().await.remove(&id).is_some())
    }

    async fn create_contact_message(
        &self,
        payload: ContactPayload,
    ) -> Result<ContactMessage, sqlx::Error> {
        let now = Utc::now();
        let message = ContactMessage {
            id: Uuid::new_v4(),
            name: payload.name,
            email: payload.email,
            message: payload.message,
            is_read: false,
            is_resolved: false,
            admin_notes: None,
            resolved_at: None,
            created_at: now,
            updated_at: now,
        };
        self.messages
            .lock()
            .await
            .insert(message.id, message.clone());
        Ok(message)
    }

    async fn list_contact_messages(
        &self,
        filter: &ContactFilter,
        params: PageParams,
    ) -> Result<Page<ContactMessage>, sqlx::Error> {
        let messages = self.messages.lock().await;
        let mut items: Vec<ContactMessage> = messages
            .values()
            .filter(|m| filter.is_read.is_none_or(|r| m.is_read == r))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(items, params))
    }

    async fn mark_message_read(&self, id: Uuid) -> Result<Option<ContactMessage>, sqlx::Error> {
        let mut messages = self.messages.lock().await;
        let Some(existing) = messages.get_mut(&id) else {
            return Ok(None);
        };
        existing.is_read = true;
        existing.updated_at = Utc::now();
        Ok(Some(existing.clone()))
    }

    async fn delete_contact_message(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        Ok(self.messages.lock().await.remove(&id).is_some())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.username == username).cloned())
    }

    async fn create_user(
        &self,
        username: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            role: role.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.users.lock().await.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_stats(&self) -> Result<DashboardStats, sqlx::Error> {
        let sermons = self.sermons.lock().await.len() as i64;
        let missions = self.missions.lock().await.len() as i64;
        let ministries = self
            .ministries
            .lock()
            .await
            .values()
            .filter(|m| m.is_active)
            .count() as i64;
        let unread_messages = self
            .messages
            .lock()
            .await
            .values()
            .filter(|m| !m.is_read)
            .count() as i64;

        Ok(DashboardStats {
            sermons,
            missions,
            ministries,
            unread_messages,
        })
    }
}
