pub mod builder;
pub mod cta;
pub mod layout;
pub mod raster;
pub mod timeline;

use std::path::PathBuf;

use serde::Serialize;

pub use builder::{frame_path, OverlayTimelineBuilder};
pub use cta::{theme_cta, DEFAULT_CTA};
pub use layout::{
    clear_of_safe_zones, FramePlan, FrameRasterizer, TextBlock, TextStyle,
};
pub use raster::{ImageWriter, ParleyRasterizer, PngWriter};
pub use timeline::{allocate_timings, chunk_words, FrameTiming, WORDS_PER_CHUNK};

/// Layout reference height; safe zones and font sizes are expressed against
/// it and scaled linearly for other frame heights.
pub const REFERENCE_HEIGHT: u32 = 1920;

/// Platform chrome (username, follow button) covers the top ~10% of the
/// frame at the reference height.
pub const TOP_SAFE_ZONE: u32 = 192;

/// Caption and action-button chrome covers the bottom ~20%.
pub const BOTTOM_SAFE_ZONE: u32 = 384;

pub fn top_safe_zone(height: u32) -> f32 {
    TOP_SAFE_ZONE as f32 * height as f32 / REFERENCE_HEIGHT as f32
}

pub fn bottom_safe_zone(height: u32) -> f32 {
    BOTTOM_SAFE_ZONE as f32 * height as f32 / REFERENCE_HEIGHT as f32
}

/// Inputs for one overlay render job.
#[derive(Debug, Clone)]
pub struct OverlayJob {
    pub verse_reference: String,
    pub verse_text: String,
    pub prayer_text: String,
    pub theme_slug: String,
    pub hook_text: Option<String>,
    pub duration_sec: f64,
    pub width: u32,
    pub height: u32,
}

impl OverlayJob {
    /// Job at the standard 1080x1920 vertical frame.
    pub fn vertical(
        verse_reference: impl Into<String>,
        verse_text: impl Into<String>,
        prayer_text: impl Into<String>,
        theme_slug: impl Into<String>,
        duration_sec: f64,
    ) -> Self {
        Self {
            verse_reference: verse_reference.into(),
            verse_text: verse_text.into(),
            prayer_text: prayer_text.into(),
            theme_slug: theme_slug.into(),
            hook_text: None,
            duration_sec,
            width: 1080,
            height: 1920,
        }
    }

    pub fn with_hook(mut self, hook_text: impl Into<String>) -> Self {
        self.hook_text = Some(hook_text.into());
        self
    }
}

/// One timed image layer: frames of a job are contiguous, ordered by
/// `chunk_index`, and partition `[0, duration_sec)` exactly.
#[derive(Debug, Clone, Serialize)]
pub struct OverlayFrame {
    pub image_ref: PathBuf,
    pub start_sec: f64,
    pub end_sec: f64,
    pub chunk_index: usize,
}
