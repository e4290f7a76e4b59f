mod common;

use serde_json::json;

use common::{setup_db, t0};
use versecast::config::SettingsRepo;
use versecast::publish::build_caption;

#[tokio::test]
async fn caption_carries_reference_theme_and_hashtags() {
    let pool = setup_db().await;
    let settings = SettingsRepo::new(pool);

    let caption = build_caption(&settings, "Psalm 34:18", "Loneliness")
        .await
        .unwrap();
    assert_eq!(
        caption,
        "Psalm 34:18 | Loneliness\n\n#faith #prayer #ChristianTikTok"
    );
}

#[tokio::test]
async fn hashtag_list_is_capped_by_max_hashtags() {
    let pool = setup_db().await;
    let settings = SettingsRepo::new(pool);

    settings
        .set_override(
            "publishing.hashtags",
            &json!(["#one", "#two", "#three", "#four"]),
            t0(),
        )
        .await
        .unwrap();
    settings
        .set_override("publishing.max_hashtags", &json!(2), t0())
        .await
        .unwrap();

    let caption = build_caption(&settings, "John 3:16", "Faith").await.unwrap();
    assert_eq!(caption, "John 3:16 | Faith\n\n#one #two");
}
