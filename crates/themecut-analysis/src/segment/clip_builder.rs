//! Clip building: turn raw cut points into a duration-policed clip list.
//!
//! Policy order is fixed: merge-short, then split-long, then embedding
//! aggregation. The resulting clips partition the sampled timeline with no
//! gaps and no overlaps; the only permitted gap is a dropped trailing tail
//! when `keep_last_short_segment` is off.

use chrono::Utc;
use themecut_models::{validate_clip_list, Clip, FrameSample, CLIP_SCHEMA_VERSION};
use tracing::{info, warn};

use crate::config::SegmentationConfig;
use crate::error::{AnalysisError, AnalysisResult};
use crate::math::l2_normalize;

/// Result of segmenting one video.
#[derive(Debug, Clone)]
pub struct SegmentOutcome {
    /// Final clip list, ids ascending by `t_start`.
    pub clips: Vec<Clip>,
    /// Raw segments folded away by merging or dropped by the tail policy.
    pub discarded_segments: usize,
}

impl SegmentOutcome {
    fn empty() -> Self {
        Self {
            clips: Vec::new(),
            discarded_segments: 0,
        }
    }
}

/// Build the final clip list for one video.
///
/// `cuts` are the detector's boundary timestamps; `sampled_duration` is the
/// end of the sampled timeline (must lie beyond the last sample). A video
/// with a single sample yields one clip spanning the full duration
/// regardless of min/max policy, since it cannot be split below one sample.
pub fn build_clips(
    video_id: &str,
    samples: &[FrameSample],
    cuts: &[f64],
    sampled_duration: f64,
    config: &SegmentationConfig,
    embedding_model_tag: &str,
) -> AnalysisResult<SegmentOutcome> {
    config.validate()?;
    if video_id.is_empty() {
        return Err(AnalysisError::invalid_input("video_id must not be empty"));
    }
    if samples.is_empty() {
        // Zero frames sampled is a valid, empty outcome
        return Ok(SegmentOutcome::empty());
    }
    let first_ts = samples[0].timestamp;
    let last_ts = samples[samples.len() - 1].timestamp;
    if !sampled_duration.is_finite() || sampled_duration <= last_ts {
        return Err(AnalysisError::invalid_input(format!(
            "sampled_duration ({sampled_duration}) must exceed the last sample timestamp ({last_ts})"
        )));
    }

    if samples.len() == 1 {
        let clip = make_clip(
            video_id,
            0,
            first_ts,
            sampled_duration,
            aggregate_embedding(samples, first_ts, sampled_duration)
                .unwrap_or_else(|| samples[0].embedding.clone()),
            embedding_model_tag,
        );
        return Ok(SegmentOutcome {
            clips: vec![clip],
            discarded_segments: 0,
        });
    }

    // Raw segments from boundary timestamps
    let mut boundaries: Vec<f64> = cuts
        .iter()
        .copied()
        .filter(|t| *t > first_ts && *t < sampled_duration)
        .collect();
    boundaries.sort_by(|a, b| a.total_cmp(b));
    boundaries.dedup();
    boundaries.insert(0, first_ts);
    boundaries.push(sampled_duration);

    let raw: Vec<(f64, f64)> = boundaries.windows(2).map(|w| (w[0], w[1])).collect();
    let mut discarded = 0usize;

    // Merge-short: fold an under-length segment into the following one,
    // the final segment into the preceding one.
    let mut merged: Vec<(f64, f64)> = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let start = raw[i].0;
        let mut end = raw[i].1;
        if config.merge_short_segments {
            while end - start < config.min_clip_seconds && i + 1 < raw.len() {
                i += 1;
                end = raw[i].1;
                discarded += 1;
            }
        }
        merged.push((start, end));
        i += 1;
    }
    if config.merge_short_segments && merged.len() >= 2 {
        let (last_start, last_end) = *merged.last().unwrap();
        if last_end - last_start < config.min_clip_seconds {
            merged.pop();
            merged.last_mut().unwrap().1 = last_end;
            discarded += 1;
        }
    }

    // Tail policy: a final segment still short after all merging attempts
    // is kept or dropped by the explicit flag.
    if let Some(&(last_start, last_end)) = merged.last() {
        if last_end - last_start < config.min_clip_seconds && !config.keep_last_short_segment {
            warn!(
                video_id,
                t_start = last_start,
                t_end = last_end,
                "Dropping short trailing segment"
            );
            merged.pop();
            discarded += 1;
        }
    }

    // Split-long: equal-width pieces, each within max_clip_seconds.
    let mut clips = Vec::new();
    for &(seg_start, seg_end) in &merged {
        let parent_embedding = aggregate_embedding(samples, seg_start, seg_end);
        for (piece_start, piece_end) in split_even(seg_start, seg_end, config) {
            let embedding = aggregate_embedding(samples, piece_start, piece_end)
                .or_else(|| parent_embedding.clone())
                .ok_or_else(|| {
                    AnalysisError::invalid_input(format!(
                        "segment [{piece_start}, {piece_end}) contains no samples"
                    ))
                })?;
            let clip = make_clip(
                video_id,
                clips.len() as u32,
                piece_start,
                piece_end,
                embedding,
                embedding_model_tag,
            );
            clips.push(clip);
        }
    }

    validate_clip_list(&clips)?;
    info!(
        video_id,
        clips = clips.len(),
        discarded_segments = discarded,
        "Clip building finished"
    );
    Ok(SegmentOutcome {
        clips,
        discarded_segments: discarded,
    })
}

/// Partition `[start, end)` into `ceil(duration / max)` equal-width pieces
/// when splitting is enabled and the segment is over-length.
fn split_even(start: f64, end: f64, config: &SegmentationConfig) -> Vec<(f64, f64)> {
    let duration = end - start;
    if !config.split_long_segments || duration <= config.max_clip_seconds {
        return vec![(start, end)];
    }
    let pieces = (duration / config.max_clip_seconds).ceil() as usize;
    let width = duration / pieces as f64;
    (0..pieces)
        .map(|k| {
            let piece_start = start + width * k as f64;
            let piece_end = if k + 1 == pieces {
                end
            } else {
                start + width * (k + 1) as f64
            };
            (piece_start, piece_end)
        })
        .collect()
}

/// Mean of frame embeddings with `timestamp ∈ [start, end)`, re-normalized
/// to unit length. `None` when the window contains no sample.
fn aggregate_embedding(samples: &[FrameSample], start: f64, end: f64) -> Option<Vec<f32>> {
    let members: Vec<&FrameSample> = samples
        .iter()
        .filter(|s| s.timestamp >= start && s.timestamp < end)
        .collect();
    if members.is_empty() {
        return None;
    }
    let dim = members[0].embedding.len();
    let mut mean = vec![0.0f32; dim];
    for sample in &members {
        for (acc, v) in mean.iter_mut().zip(sample.embedding.iter()) {
            *acc += v / members.len() as f32;
        }
    }
    // Mean of unit vectors is not itself unit length
    l2_normalize(&mut mean);
    Some(mean)
}

fn make_clip(
    video_id: &str,
    clip_id: u32,
    t_start: f64,
    t_end: f64,
    embedding: Vec<f32>,
    embedding_model_tag: &str,
) -> Clip {
    Clip {
        video_id: video_id.to_string(),
        clip_id,
        t_start,
        t_end,
        embedding_model_tag: embedding_model_tag.to_string(),
        embedding,
        created_at: Utc::now(),
        schema_version: CLIP_SCHEMA_VERSION,
    }
}
