use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Everything the processor needs to publish one composed video.
#[derive(Debug, Clone)]
pub struct ResolvedVideo {
    pub file_path: String,
    pub prayer_text: String,
    pub verse_reference: String,
    pub theme_slug: String,
    pub theme_name: String,
}

/// Lookup seam between the queue processor and the content tables.
pub trait VideoResolver {
    fn resolve(
        &self,
        video_id: i64,
    ) -> impl std::future::Future<Output = anyhow::Result<Option<ResolvedVideo>>> + Send;
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GeneratedVideo {
    pub id: i64,
    pub prayer_id: Option<i64>,
    pub file_path: String,
    pub duration_sec: Option<f64>,
    pub resolution: Option<String>,
    pub file_size_bytes: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct ContentRepo {
    pool: SqlitePool,
}

impl ContentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert_theme(
        &self,
        slug: &str,
        name: &str,
        tone: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO themes (slug, name, tone, is_active, created_at)
            VALUES (?1, ?2, ?3, 1, ?4)
            RETURNING id
            "#,
        )
        .bind(slug)
        .bind(name)
        .bind(tone)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn insert_verse(
        &self,
        reference: &str,
        text: &str,
        theme_id: i64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO bible_verses (reference, text, theme_id, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id
            "#,
        )
        .bind(reference)
        .bind(text)
        .bind(theme_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn insert_prayer(
        &self,
        verse_id: i64,
        theme_id: i64,
        prayer_text: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<i64> {
        let word_count = prayer_text.split_whitespace().count() as i64;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO prayers (verse_id, theme_id, prayer_text, word_count, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id
            "#,
        )
        .bind(verse_id)
        .bind(theme_id)
        .bind(prayer_text)
        .bind(word_count)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn insert_video(
        &self,
        prayer_id: i64,
        file_path: &str,
        duration_sec: f64,
        now: DateTime<Utc>,
    ) -> anyhow::Result<i64> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO generated_videos (prayer_id, file_path, duration_sec, created_at)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id
            "#,
        )
        .bind(prayer_id)
        .bind(file_path)
        .bind(duration_sec)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    pub async fn get_video(&self, video_id: i64) -> anyhow::Result<Option<GeneratedVideo>> {
        let row =
            sqlx::query_as::<_, GeneratedVideo>("SELECT * FROM generated_videos WHERE id = ?1")
                .bind(video_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row)
    }
}

/// Resolver backed by the content tables. Verse and theme lookups that come
/// back empty fall back to generic caption text rather than failing the item.
#[derive(Clone)]
pub struct DbVideoResolver {
    pool: SqlitePool,
}

impl DbVideoResolver {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ResolvedRow {
    file_path: String,
    prayer_text: Option<String>,
    verse_reference: Option<String>,
    theme_slug: Option<String>,
    theme_name: Option<String>,
}

impl VideoResolver for DbVideoResolver {
    async fn resolve(&self, video_id: i64) -> anyhow::Result<Option<ResolvedVideo>> {
        let row = sqlx::query_as::<_, ResolvedRow>(
            r#"
            SELECT
                v.file_path        AS file_path,
                p.prayer_text      AS prayer_text,
                bv.reference       AS verse_reference,
                t.slug             AS theme_slug,
                t.name             AS theme_name
            FROM generated_videos v
            LEFT JOIN prayers p       ON p.id = v.prayer_id
            LEFT JOIN bible_verses bv ON bv.id = p.verse_id
            LEFT JOIN themes t        ON t.id = p.theme_id
            WHERE v.id = ?1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| ResolvedVideo {
            file_path: r.file_path,
            prayer_text: r.prayer_text.unwrap_or_default(),
            verse_reference: r.verse_reference.unwrap_or_else(|| "Scripture".to_string()),
            theme_slug: r.theme_slug.unwrap_or_else(|| "faith".to_string()),
            theme_name: r.theme_name.unwrap_or_else(|| "Faith".to_string()),
        }))
    }
}
