//! Shot boundary detection over per-frame embeddings and color histograms.
//!
//! For each consecutive frame pair two distances are computed: cosine
//! distance of the embeddings (catches slow semantic drift) and
//! Bhattacharyya distance of the color histograms (catches fast low-level
//! transients that embeddings under-react to). Either signal alone past its
//! threshold declares a cut.

use themecut_models::FrameSample;
use tracing::{debug, info};

use crate::config::SegmentationConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::math::cosine_similarity;

/// Detect cut timestamps in an ordered frame stream.
///
/// The returned timestamps are sample timestamps at which a new shot
/// starts; together with the stream bounds they partition the sampled
/// timeline into raw segments. No merging or splitting happens here.
///
/// A stream of zero or one frames yields no cuts. Identical consecutive
/// frames never cut (both distances are zero).
pub fn detect_cuts(
    samples: &[FrameSample],
    config: &SegmentationConfig,
) -> AnalysisResult<Vec<f64>> {
    config.validate()?;
    validate_stream(samples)?;

    let mut cuts = Vec::new();
    for pair in samples.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let d_cos = cosine_distance(&prev.embedding, &curr.embedding);
        let d_hist = bhattacharyya_distance(&prev.histogram, &curr.histogram);
        if d_cos > config.cosine_threshold || d_hist > config.histogram_threshold {
            debug!(
                timestamp = curr.timestamp,
                d_cos = format!("{:.3}", d_cos),
                d_hist = format!("{:.3}", d_hist),
                "Shot cut detected"
            );
            cuts.push(curr.timestamp);
        }
    }

    info!(
        frames = samples.len(),
        cuts = cuts.len(),
        "Shot boundary detection finished"
    );
    Ok(cuts)
}

fn validate_stream(samples: &[FrameSample]) -> AnalysisResult<()> {
    let Some(first) = samples.first() else {
        return Ok(());
    };
    let emb_dim = first.embedding.len();
    let hist_dim = first.histogram.len();
    if emb_dim == 0 {
        return Err(AnalysisError::invalid_input(
            "frame embeddings must not be zero-length",
        ));
    }

    for pair in samples.windows(2) {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(AnalysisError::invalid_input(format!(
                "frame timestamps must be strictly increasing, got {} after {}",
                pair[1].timestamp, pair[0].timestamp
            )));
        }
    }
    for sample in samples {
        if !sample.timestamp.is_finite() || sample.timestamp < 0.0 {
            return Err(AnalysisError::invalid_input(format!(
                "frame timestamp must be non-negative and finite, got {}",
                sample.timestamp
            )));
        }
        if sample.embedding.len() != emb_dim || sample.histogram.len() != hist_dim {
            return Err(AnalysisError::invalid_input(
                "inconsistent feature dimensions across the frame stream",
            ));
        }
    }
    Ok(())
}

/// Cosine distance in [0, 1]-ish range; a zero-norm embedding on either
/// side counts as maximally distant.
fn cosine_distance(a: &[f32], b: &[f32]) -> f64 {
    let zero_a = a.iter().all(|x| *x == 0.0);
    let zero_b = b.iter().all(|x| *x == 0.0);
    if zero_a && zero_b {
        return 0.0;
    }
    if zero_a || zero_b {
        return 1.0;
    }
    (1.0 - cosine_similarity(a, b)).max(0.0)
}

/// Bhattacharyya distance between two histograms, clamped to [0, 1].
///
/// Histograms are re-normalized to probability mass internally so the
/// distance stays comparable regardless of the caller's normalization.
fn bhattacharyya_distance(h1: &[f32], h2: &[f32]) -> f64 {
    if h1.len() != h2.len() || h1.is_empty() {
        return 1.0;
    }
    let sum1: f64 = h1.iter().map(|v| *v as f64).sum();
    let sum2: f64 = h2.iter().map(|v| *v as f64).sum();
    if sum1 <= 0.0 || sum2 <= 0.0 {
        // An all-zero histogram only compares equal to another all-zero one
        return if sum1 == sum2 { 0.0 } else { 1.0 };
    }

    let mut coefficient = 0.0f64;
    for (a, b) in h1.iter().zip(h2.iter()) {
        coefficient += ((*a as f64 / sum1) * (*b as f64 / sum2)).sqrt();
    }
    (1.0 - coefficient.min(1.0)).sqrt().clamp(0.0, 1.0)
}
