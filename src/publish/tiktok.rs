use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::publish::{PublishReceipt, Publisher};

const TIKTOK_API_BASE: &str = "https://open.tiktokapis.com/v2";

/// TikTok title field caps out around 150 characters.
const MAX_TITLE_CHARS: usize = 150;

/// TikTok Content Posting API v2 direct-post flow:
/// init upload -> PUT the file to the returned upload_url -> receipt.
///
/// Posts are created `SELF_ONLY` so a misbehaving batch never lands on the
/// public feed before an operator has reviewed it.
#[derive(Clone)]
pub struct TikTokClient {
    http: reqwest::Client,
    access_token: Option<String>,
    api_base: String,
}

#[derive(Serialize)]
struct InitRequest {
    post_info: PostInfo,
    source_info: SourceInfo,
}

#[derive(Serialize)]
struct PostInfo {
    title: String,
    privacy_level: &'static str,
    disable_duet: bool,
    disable_comment: bool,
    disable_stitch: bool,
}

#[derive(Serialize)]
struct SourceInfo {
    source: &'static str,
    video_size: u64,
    chunk_size: u64,
    total_chunk_count: u32,
}

#[derive(Deserialize)]
struct InitResponse {
    #[serde(default)]
    data: InitData,
    #[serde(default)]
    error: ApiError,
}

#[derive(Deserialize, Default)]
struct InitData {
    #[serde(default)]
    publish_id: String,
    #[serde(default)]
    upload_url: String,
}

#[derive(Deserialize, Default)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

impl TikTokClient {
    pub fn new(access_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            access_token,
            api_base: TIKTOK_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn access_token(&self) -> anyhow::Result<&str> {
        self.access_token
            .as_deref()
            .context("TIKTOK_ACCESS_TOKEN is not set. Add it to your .env file.")
    }

    async fn init_direct_post(&self, video_size: u64, caption: &str) -> anyhow::Result<InitData> {
        let token = self.access_token()?;
        let title: String = caption.chars().take(MAX_TITLE_CHARS).collect();

        let body = InitRequest {
            post_info: PostInfo {
                title,
                privacy_level: "SELF_ONLY",
                disable_duet: false,
                disable_comment: false,
                disable_stitch: false,
            },
            source_info: SourceInfo {
                source: "FILE_UPLOAD",
                video_size,
                chunk_size: video_size,
                total_chunk_count: 1,
            },
        };

        let resp = self
            .http
            .post(format!("{}/post/publish/video/init/", self.api_base))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: InitResponse = resp.json().await?;
        if parsed.error.code != "ok" {
            anyhow::bail!("TikTok init failed: {}", nonempty_or(&parsed.error.message, "Unknown error"));
        }
        if parsed.data.upload_url.is_empty() {
            anyhow::bail!("TikTok did not return an upload_url.");
        }

        Ok(parsed.data)
    }

    async fn upload_video(&self, upload_url: &str, bytes: Vec<u8>) -> anyhow::Result<()> {
        let size = bytes.len() as u64;
        self.http
            .put(upload_url)
            .header(
                "Content-Range",
                format!("bytes 0-{}/{}", size.saturating_sub(1), size),
            )
            .header("Content-Type", "video/mp4")
            .body(bytes)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

impl Publisher for TikTokClient {
    async fn publish(&self, file_path: &str, caption: &str) -> anyhow::Result<PublishReceipt> {
        let bytes = tokio::fs::read(file_path)
            .await
            .with_context(|| format!("read video file '{file_path}'"))?;

        let init = self
            .init_direct_post(bytes.len() as u64, caption)
            .await?;

        self.upload_video(&init.upload_url, bytes).await?;

        tracing::info!(publish_id = %init.publish_id, "uploaded video to TikTok");

        Ok(PublishReceipt {
            external_post_id: init.publish_id,
        })
    }
}

fn nonempty_or<'a>(s: &'a str, fallback: &'a str) -> &'a str {
    if s.is_empty() {
        fallback
    } else {
        s
    }
}
