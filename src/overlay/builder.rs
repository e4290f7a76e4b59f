use std::path::{Path, PathBuf};

use crate::overlay::layout::{plan_frame, validate_plan, FrameRasterizer};
use crate::overlay::raster::ImageWriter;
use crate::overlay::timeline::{allocate_timings, chunk_words};
use crate::overlay::{OverlayFrame, OverlayJob};

/// Frame file identity is a pure function of theme and chunk index, so
/// re-running a job overwrites its own frames deterministically. A smaller
/// re-run leaves higher-indexed frames from an earlier, larger job behind;
/// cleaning those up is the caller's responsibility.
pub fn frame_path(out_dir: &Path, theme_slug: &str, chunk_index: usize) -> PathBuf {
    out_dir.join(format!("overlay_{theme_slug}_{chunk_index:03}.png"))
}

/// Turns one job into timed, validated, written overlay frames.
pub struct OverlayTimelineBuilder<R: FrameRasterizer, W: ImageWriter> {
    rasterizer: R,
    writer: W,
    out_dir: PathBuf,
}

impl<R: FrameRasterizer, W: ImageWriter> OverlayTimelineBuilder<R, W> {
    pub fn new(rasterizer: R, writer: W, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            rasterizer,
            writer,
            out_dir: out_dir.into(),
        }
    }

    /// Produce the ordered frame sequence covering `[0, duration_sec)`.
    pub fn build(&mut self, job: &OverlayJob) -> anyhow::Result<Vec<OverlayFrame>> {
        anyhow::ensure!(
            job.duration_sec > 0.0,
            "overlay duration must be positive, got {}",
            job.duration_sec
        );

        let chunks = chunk_words(&job.prayer_text);
        anyhow::ensure!(!chunks.is_empty(), "prayer text has no words to pace");

        let word_counts: Vec<usize> = chunks
            .iter()
            .map(|c| c.split_whitespace().count())
            .collect();
        let timings = allocate_timings(&word_counts, job.duration_sec);

        let mut frames = Vec::with_capacity(chunks.len());

        for (chunk_index, (chunk, timing)) in chunks.iter().zip(timings.iter()).enumerate() {
            let plan = plan_frame(job, chunk, chunk_index, &mut self.rasterizer)?;
            validate_plan(&plan)?;

            let rgba = self.rasterizer.rasterize(&plan)?;
            let path = frame_path(&self.out_dir, &job.theme_slug, chunk_index);
            self.writer.write(&rgba, job.width, job.height, &path)?;

            frames.push(OverlayFrame {
                image_ref: path,
                start_sec: timing.start_sec,
                end_sec: timing.end_sec,
                chunk_index,
            });
        }

        tracing::info!(
            theme = %job.theme_slug,
            frames = frames.len(),
            duration_sec = job.duration_sec,
            "rendered overlay frames"
        );

        Ok(frames)
    }
}
