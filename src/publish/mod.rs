pub mod tiktok;

use crate::config::SettingsRepo;

pub use tiktok::TikTokClient;

/// Receipt handed back by a platform on a successful publish.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub external_post_id: String,
}

/// Outbound platform seam. Any error from `publish` is recorded verbatim on
/// the queue item; the core never inspects error subtypes.
pub trait Publisher {
    fn publish(
        &self,
        file_path: &str,
        caption: &str,
    ) -> impl std::future::Future<Output = anyhow::Result<PublishReceipt>> + Send;
}

/// Caption: verse reference, theme, then a capped hashtag block.
pub async fn build_caption(
    settings: &SettingsRepo,
    verse_reference: &str,
    theme_name: &str,
) -> anyhow::Result<String> {
    let hashtags = settings.get_string_list("publishing.hashtags").await?;
    let max_tags = settings.get_i64("publishing.max_hashtags", 5).await?.max(0) as usize;
    let tags = hashtags
        .iter()
        .take(max_tags)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");
    Ok(format!("{verse_reference} | {theme_name}\n\n{tags}"))
}
