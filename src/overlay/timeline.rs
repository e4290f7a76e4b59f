/// Spoken-word pacing: every frame carries at most this many words. Fixed,
/// not configurable, so the on-screen rhythm stays word-by-word fast.
pub const WORDS_PER_CHUNK: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTiming {
    pub start_sec: f64,
    pub end_sec: f64,
}

/// Split prayer text into 3-word groups; the last group takes the remainder
/// (1-3 words).
pub fn chunk_words(text: &str) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(WORDS_PER_CHUNK)
        .map(|group| group.join(" "))
        .collect()
}

/// Allocate `duration_sec` across chunks proportionally to word count.
///
/// Starts are the cumulative sum of prior durations; the final end is pinned
/// to `duration_sec` exactly so accumulated float drift never leaks into the
/// last frame boundary.
pub fn allocate_timings(word_counts: &[usize], duration_sec: f64) -> Vec<FrameTiming> {
    let total_words: usize = word_counts.iter().sum();
    if word_counts.is_empty() || total_words == 0 {
        return Vec::new();
    }

    let mut timings = Vec::with_capacity(word_counts.len());
    let mut cursor = 0.0_f64;

    for (i, &count) in word_counts.iter().enumerate() {
        let chunk_duration = duration_sec * count as f64 / total_words as f64;
        let start_sec = cursor;
        let end_sec = if i == word_counts.len() - 1 {
            duration_sec
        } else {
            cursor + chunk_duration
        };
        timings.push(FrameTiming { start_sec, end_sec });
        cursor += chunk_duration;
    }

    timings
}
