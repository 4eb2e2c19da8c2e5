//! Embedding capability and frame feature extraction.
//!
//! The pipeline never trains or loads a model itself; it consumes an
//! injected [`Embedder`]. A real vision-text backend lives outside this
//! crate. [`MeanColorEmbedder`] is the shipped placeholder: it keeps the
//! mechanics runnable without a model, and its `is_semantic() == false`
//! flag is what downstream scoring uses to attach the degraded-capability
//! warning.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use themecut_models::FrameSample;

use crate::error::{AnalysisError, AnalysisResult};
use crate::math::l2_normalize;

/// Histogram bins per color channel (8^3 = 512 total bins).
pub const HIST_BINS_PER_CHANNEL: usize = 8;

/// Borrowed view over one decoded frame, tightly packed RGB24.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
}

impl<'a> FrameView<'a> {
    /// Wrap a pixel buffer; the buffer must hold exactly `width * height`
    /// RGB triples.
    pub fn new(data: &'a [u8], width: usize, height: usize) -> AnalysisResult<Self> {
        if width == 0 || height == 0 || data.len() != width * height * 3 {
            return Err(AnalysisError::invalid_input(format!(
                "frame buffer of {} bytes does not match {}x{} RGB24",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Iterate over RGB triples.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + 'a {
        self.data.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }
}

/// Capability interface for the external embedding backend.
///
/// Frame and text embeddings must live in the same metric space and be
/// unit-normalized. Implementations are queried for `is_semantic` rather
/// than callers branching on the tag string.
pub trait Embedder: Send + Sync {
    /// Embed one decoded frame into a unit-normalized vector.
    fn embed_frame(&self, frame: &FrameView<'_>) -> AnalysisResult<Vec<f32>>;

    /// Embed a short text prompt into the same space.
    fn embed_text(&self, text: &str) -> AnalysisResult<Vec<f32>>;

    /// Stable tag recorded on every clip this backend produces.
    fn model_tag(&self) -> &str;

    /// True for a real vision-text joint space; false for placeholders
    /// whose similarity scores carry no thematic meaning.
    fn is_semantic(&self) -> bool;
}

/// Placeholder backend: normalized mean RGB for frames, a hashed
/// bag-of-characters vector for text. Cheap, deterministic, non-semantic.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeanColorEmbedder;

impl Embedder for MeanColorEmbedder {
    fn embed_frame(&self, frame: &FrameView<'_>) -> AnalysisResult<Vec<f32>> {
        let mut sums = [0.0f64; 3];
        let mut count = 0u64;
        for [r, g, b] in frame.pixels() {
            sums[0] += r as f64;
            sums[1] += g as f64;
            sums[2] += b as f64;
            count += 1;
        }
        let mut mean = [
            (sums[0] / count as f64) as f32,
            (sums[1] / count as f64) as f32,
            (sums[2] / count as f64) as f32,
        ];
        l2_normalize(&mut mean);
        Ok(mean.to_vec())
    }

    fn embed_text(&self, text: &str) -> AnalysisResult<Vec<f32>> {
        // Hash each character into one of three buckets so different
        // prompts land on different directions of the toy space.
        let mut buckets = [0.0f32; 3];
        for ch in text.to_lowercase().chars().filter(|c| !c.is_whitespace()) {
            let mut hasher = DefaultHasher::new();
            ch.hash(&mut hasher);
            buckets[(hasher.finish() % 3) as usize] += 1.0;
        }
        l2_normalize(&mut buckets);
        Ok(buckets.to_vec())
    }

    fn model_tag(&self) -> &str {
        "mean-color-v1"
    }

    fn is_semantic(&self) -> bool {
        false
    }
}

/// Compute the normalized RGB color histogram used by the shot detector.
///
/// 8 bins per channel, flattened to 512, L1-normalized so Bhattacharyya
/// distances are comparable across frame sizes.
pub fn rgb_histogram(frame: &FrameView<'_>) -> Vec<f32> {
    let bins = HIST_BINS_PER_CHANNEL;
    let mut hist = vec![0.0f32; bins * bins * bins];
    let shift = 8 - bins.trailing_zeros() as usize; // 256 -> bins
    for [r, g, b] in frame.pixels() {
        let (ri, gi, bi) = (
            (r as usize) >> shift,
            (g as usize) >> shift,
            (b as usize) >> shift,
        );
        hist[(ri * bins + gi) * bins + bi] += 1.0;
    }
    let total: f32 = hist.iter().sum();
    if total > 0.0 {
        for v in hist.iter_mut() {
            *v /= total;
        }
    }
    hist
}

/// Build one [`FrameSample`] from a decoded frame: embedding via the
/// injected backend plus the detector's color histogram.
pub fn sample_frame(
    timestamp: f64,
    frame: &FrameView<'_>,
    embedder: &dyn Embedder,
) -> AnalysisResult<FrameSample> {
    if !timestamp.is_finite() || timestamp < 0.0 {
        return Err(AnalysisError::invalid_input(format!(
            "frame timestamp must be a non-negative finite number, got {timestamp}"
        )));
    }
    let embedding = embedder.embed_frame(frame)?;
    if embedding.is_empty() {
        return Err(AnalysisError::embedding_failed(format!(
            "backend {} returned an empty frame embedding",
            embedder.model_tag()
        )));
    }
    let histogram = rgb_histogram(frame);
    Ok(FrameSample::new(timestamp, embedding, histogram))
}
