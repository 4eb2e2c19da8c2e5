//! Per-video pipeline entry points and the rayon batch driver.
//!
//! Each stage is a synchronous, cancellable unit of work: abandon the whole
//! per-video computation or keep its complete result, nothing in between.
//! One video's failure never blocks or corrupts another's output, so batch
//! results are per-video `Result`s rather than one all-or-nothing value.

use rayon::prelude::*;
use themecut_models::{Clip, FrameSample, ScoreArtifact, ThemePrototypeSet};
use tracing::{error, info};

use crate::config::SegmentationConfig;
use crate::embedding::Embedder;
use crate::error::{AnalysisError, AnalysisResult};
use crate::score::score_clips;
use crate::segment::{build_clips, detect_cuts, SegmentOutcome};

/// Sampled frame stream for one video.
#[derive(Debug, Clone)]
pub struct VideoSamples {
    pub video_id: String,
    pub samples: Vec<FrameSample>,
    /// Sampling interval in seconds (1.0 for the nominal 1 Hz stream).
    pub sample_interval: f64,
}

impl VideoSamples {
    pub fn new(video_id: impl Into<String>, samples: Vec<FrameSample>, sample_interval: f64) -> Self {
        Self {
            video_id: video_id.into(),
            samples,
            sample_interval,
        }
    }
}

/// Segment one video: detect cuts, then build the policed clip list.
///
/// The sampled duration is derived as `last timestamp + sample_interval`,
/// so the trailing frame keeps its full sampling window.
pub fn segment_video(
    video: &VideoSamples,
    config: &SegmentationConfig,
    embedding_model_tag: &str,
) -> AnalysisResult<SegmentOutcome> {
    if !video.sample_interval.is_finite() || video.sample_interval <= 0.0 {
        return Err(AnalysisError::invalid_input(format!(
            "sample_interval must be positive, got {}",
            video.sample_interval
        )));
    }
    let cuts = detect_cuts(&video.samples, config)?;
    let sampled_duration = video
        .samples
        .last()
        .map(|s| s.timestamp + video.sample_interval)
        .unwrap_or(0.0);
    build_clips(
        &video.video_id,
        &video.samples,
        &cuts,
        sampled_duration,
        config,
        embedding_model_tag,
    )
}

/// Segment a batch of videos in parallel.
///
/// Returns one `(video_id, result)` pair per input, in input order.
pub fn segment_batch(
    videos: &[VideoSamples],
    config: &SegmentationConfig,
    embedding_model_tag: &str,
) -> Vec<(String, AnalysisResult<SegmentOutcome>)> {
    config_check_logged(config.validate());
    let results: Vec<_> = videos
        .par_iter()
        .map(|video| {
            let result = segment_video(video, config, embedding_model_tag);
            if let Err(err) = &result {
                error!(video_id = video.video_id.as_str(), %err, "Segmentation failed");
            }
            (video.video_id.clone(), result)
        })
        .collect();
    info!(
        videos = results.len(),
        failed = results.iter().filter(|(_, r)| r.is_err()).count(),
        "Segmentation batch finished"
    );
    results
}

/// Score a batch of per-video clip lists against one prototype set.
///
/// The per-clip similarity inside each video is already a batched matrix
/// multiplication; the batch level parallelizes across videos.
pub fn score_batch(
    clip_lists: &[(String, Vec<Clip>)],
    prototypes: &ThemePrototypeSet,
    embedder: &dyn Embedder,
) -> Vec<(String, AnalysisResult<ScoreArtifact>)> {
    let results: Vec<_> = clip_lists
        .par_iter()
        .map(|(video_id, clips)| {
            let result = score_clips(clips, prototypes, embedder);
            if let Err(err) = &result {
                error!(video_id = video_id.as_str(), %err, "Scoring failed");
            }
            (video_id.clone(), result)
        })
        .collect();
    info!(
        videos = results.len(),
        failed = results.iter().filter(|(_, r)| r.is_err()).count(),
        theme = prototypes.theme.as_str(),
        "Scoring batch finished"
    );
    results
}

fn config_check_logged(result: AnalysisResult<()>) {
    // Per-video calls re-validate and report the error per video; this is
    // just an early batch-level log line.
    if let Err(err) = result {
        error!(%err, "Rejecting batch configuration");
    }
}
