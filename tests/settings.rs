mod common;

use serde_json::json;
use serial_test::serial;

use common::{setup_db, t0};
use versecast::config::{Config, SettingsRepo};

#[tokio::test]
async fn compiled_defaults_answer_missing_keys() {
    let pool = setup_db().await;
    let settings = SettingsRepo::new(pool);

    let hours = settings
        .get_f64("publishing.min_hours_between_posts", 99.0)
        .await
        .unwrap();
    assert_eq!(hours, 4.0);

    let tags = settings
        .get_string_list("publishing.hashtags")
        .await
        .unwrap();
    assert_eq!(tags, vec!["#faith", "#prayer", "#ChristianTikTok"]);

    assert!(settings.get("no.such.key").await.unwrap().is_none());
}

#[tokio::test]
async fn overrides_win_over_defaults_and_delete_restores_them() {
    let pool = setup_db().await;
    let settings = SettingsRepo::new(pool);

    settings
        .set_override("publishing.min_hours_between_posts", &json!(8), t0())
        .await
        .unwrap();
    assert_eq!(
        settings
            .get_f64("publishing.min_hours_between_posts", 4.0)
            .await
            .unwrap(),
        8.0
    );

    // Upsert replaces in place.
    settings
        .set_override("publishing.min_hours_between_posts", &json!(2.5), t0())
        .await
        .unwrap();
    assert_eq!(
        settings
            .get_f64("publishing.min_hours_between_posts", 4.0)
            .await
            .unwrap(),
        2.5
    );

    assert!(settings
        .delete_override("publishing.min_hours_between_posts")
        .await
        .unwrap());
    assert_eq!(
        settings
            .get_f64("publishing.min_hours_between_posts", 4.0)
            .await
            .unwrap(),
        4.0
    );

    // Deleting a key with no override reports nothing deleted.
    assert!(!settings.delete_override("no.such.key").await.unwrap());
}

#[tokio::test]
async fn mistyped_override_falls_back_to_caller_default() {
    let pool = setup_db().await;
    let settings = SettingsRepo::new(pool);

    settings
        .set_override("publishing.max_hashtags", &json!("not a number"), t0())
        .await
        .unwrap();

    assert_eq!(
        settings.get_i64("publishing.max_hashtags", 5).await.unwrap(),
        5
    );
}

#[test]
#[serial]
fn config_reads_environment_with_fallbacks() {
    std::env::remove_var("VERSECAST_DATABASE_URL");
    std::env::remove_var("DATABASE_URL");
    std::env::remove_var("VERSECAST_FONT_PATH");
    std::env::remove_var("TIKTOK_ACCESS_TOKEN");

    let config = Config::from_env().unwrap();
    assert_eq!(config.database_url, "sqlite:data/versecast.db?mode=rwc");
    assert!(config.font_path.is_none());
    assert!(config.tiktok_access_token.is_none());

    std::env::set_var("DATABASE_URL", "sqlite:other.db");
    std::env::set_var("TIKTOK_ACCESS_TOKEN", "token-123");
    let config = Config::from_env().unwrap();
    assert_eq!(config.database_url, "sqlite:other.db");
    assert_eq!(config.tiktok_access_token.as_deref(), Some("token-123"));

    // The VERSECAST-prefixed variable wins over the bare one.
    std::env::set_var("VERSECAST_DATABASE_URL", "sqlite:primary.db");
    let config = Config::from_env().unwrap();
    assert_eq!(config.database_url, "sqlite:primary.db");

    std::env::remove_var("VERSECAST_DATABASE_URL");
    std::env::remove_var("DATABASE_URL");
    std::env::remove_var("TIKTOK_ACCESS_TOKEN");
}
