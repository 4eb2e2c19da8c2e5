//! Stage configuration structs.
//!
//! Thresholds are explicit inputs to each stage call, never ambient process
//! state. Both structs deserialize with no field defaults, so a document
//! missing a required threshold fails at the deserialization boundary
//! instead of silently running with a baked-in value.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// Parameters for shot boundary detection and clip building.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SegmentationConfig {
    /// Cut when `1 - cosine_similarity` of consecutive frame embeddings
    /// exceeds this.
    pub cosine_threshold: f64,

    /// Cut when the Bhattacharyya distance of consecutive frame histograms
    /// exceeds this (range 0-1).
    pub histogram_threshold: f64,

    /// Segments shorter than this are merged into a neighbor.
    pub min_clip_seconds: f64,

    /// Segments longer than this are split into equal-width pieces.
    pub max_clip_seconds: f64,

    /// Enable the merge-short policy.
    pub merge_short_segments: bool,

    /// Keep a final segment that is still under `min_clip_seconds` after
    /// all merging attempts; dropping it is the only permitted coverage gap.
    pub keep_last_short_segment: bool,

    /// Enable the split-long policy.
    pub split_long_segments: bool,
}

impl SegmentationConfig {
    /// Validate value ranges and cross-field consistency.
    pub fn validate(&self) -> AnalysisResult<()> {
        for (name, value) in [
            ("cosine_threshold", self.cosine_threshold),
            ("histogram_threshold", self.histogram_threshold),
            ("min_clip_seconds", self.min_clip_seconds),
            ("max_clip_seconds", self.max_clip_seconds),
        ] {
            if !value.is_finite() {
                return Err(AnalysisError::invalid_config(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.cosine_threshold < 0.0 || self.histogram_threshold < 0.0 {
            return Err(AnalysisError::invalid_config(
                "distance thresholds must be non-negative",
            ));
        }
        if self.min_clip_seconds < 0.0 {
            return Err(AnalysisError::invalid_config(
                "min_clip_seconds must be non-negative",
            ));
        }
        if self.max_clip_seconds <= 0.0 {
            return Err(AnalysisError::invalid_config(
                "max_clip_seconds must be positive",
            ));
        }
        if self.min_clip_seconds > self.max_clip_seconds {
            return Err(AnalysisError::invalid_config(format!(
                "min_clip_seconds ({}) exceeds max_clip_seconds ({})",
                self.min_clip_seconds, self.max_clip_seconds
            )));
        }
        Ok(())
    }
}

/// Parameters for hysteresis selection and EDL assembly.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SequencingConfig {
    /// Score needed to start a selected run.
    pub upper_threshold: f64,

    /// Score needed to continue an active run (<= upper_threshold).
    pub lower_threshold: f64,

    /// Merged runs shorter than this are dropped.
    pub min_duration: f64,

    /// Runs longer than this are split into equal-width pieces. May be
    /// `f64::INFINITY` to disable the ceiling.
    pub max_duration: f64,

    /// Selected runs separated by a gap of at most this many seconds merge.
    pub merge_gap: f64,
}

impl SequencingConfig {
    /// Validate value ranges and cross-field consistency.
    pub fn validate(&self) -> AnalysisResult<()> {
        for (name, value) in [
            ("upper_threshold", self.upper_threshold),
            ("lower_threshold", self.lower_threshold),
            ("min_duration", self.min_duration),
            ("merge_gap", self.merge_gap),
        ] {
            if !value.is_finite() {
                return Err(AnalysisError::invalid_config(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.lower_threshold > self.upper_threshold {
            return Err(AnalysisError::invalid_config(format!(
                "lower_threshold ({}) exceeds upper_threshold ({})",
                self.lower_threshold, self.upper_threshold
            )));
        }
        if self.min_duration < 0.0 || self.merge_gap < 0.0 {
            return Err(AnalysisError::invalid_config(
                "min_duration and merge_gap must be non-negative",
            ));
        }
        // max_duration may be infinite, but never NaN or non-positive
        if self.max_duration.is_nan() || self.max_duration <= 0.0 {
            return Err(AnalysisError::invalid_config(
                "max_duration must be positive",
            ));
        }
        Ok(())
    }
}
