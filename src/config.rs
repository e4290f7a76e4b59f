use std::path::PathBuf;

use serde_json::{json, Value};
use sqlx::SqlitePool;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub overlay_dir: PathBuf,
    pub font_path: Option<PathBuf>,
    pub tiktok_access_token: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env_or_fallback("VERSECAST_DATABASE_URL", "DATABASE_URL")
            .unwrap_or_else(|| "sqlite:data/versecast.db?mode=rwc".to_string());

        let overlay_dir = std::env::var("VERSECAST_OVERLAY_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("media/overlays"));

        let font_path = std::env::var("VERSECAST_FONT_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let tiktok_access_token = std::env::var("TIKTOK_ACCESS_TOKEN")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            database_url,
            overlay_dir,
            font_path,
            tiktok_access_token,
        })
    }
}

fn env_or_fallback(primary: &str, fallback: &str) -> Option<String> {
    std::env::var(primary)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| std::env::var(fallback).ok().filter(|s| !s.trim().is_empty()))
}

/// Compiled-in defaults for the dotted-key settings surface.
fn default_value(key: &str) -> Option<Value> {
    match key {
        "publishing.min_hours_between_posts" => Some(json!(4)),
        "publishing.hashtags" => Some(json!(["#faith", "#prayer", "#ChristianTikTok"])),
        "publishing.max_hashtags" => Some(json!(5)),
        _ => None,
    }
}

/// Dotted-key settings: operator overrides in `config_overrides` merged over
/// compiled-in defaults. Values are JSON-encoded TEXT rows.
#[derive(Clone)]
pub struct SettingsRepo {
    pool: SqlitePool,
}

impl SettingsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> anyhow::Result<Option<Value>> {
        let row: Option<String> =
            sqlx::query_scalar("SELECT value FROM config_overrides WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            // A raw string that is not valid JSON is kept as a string value.
            Some(text) => Ok(Some(
                serde_json::from_str(&text).unwrap_or(Value::String(text)),
            )),
            None => Ok(default_value(key)),
        }
    }

    pub async fn get_f64(&self, key: &str, default: f64) -> anyhow::Result<f64> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.as_f64())
            .unwrap_or(default))
    }

    pub async fn get_i64(&self, key: &str, default: i64) -> anyhow::Result<i64> {
        Ok(self
            .get(key)
            .await?
            .and_then(|v| v.as_i64())
            .unwrap_or(default))
    }

    pub async fn get_string_list(&self, key: &str) -> anyhow::Result<Vec<String>> {
        let list = self
            .get(key)
            .await?
            .and_then(|v| {
                v.as_array().map(|items| {
                    items
                        .iter()
                        .filter_map(|i| i.as_str().map(str::to_string))
                        .collect::<Vec<_>>()
                })
            })
            .unwrap_or_default();
        Ok(list)
    }

    pub async fn set_override(
        &self,
        key: &str,
        value: &Value,
        now: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<()> {
        let text = serde_json::to_string(value)?;
        sqlx::query(
            r#"
            INSERT INTO config_overrides (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(text)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_override(&self, key: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM config_overrides WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
