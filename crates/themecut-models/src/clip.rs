//! Clip and frame sample models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Current schema version written into new clips.
pub const CLIP_SCHEMA_VERSION: u32 = 1;

/// One sampled frame: timestamp plus the visual features used for
/// segmentation. Ephemeral — produced and consumed within the segmentation
/// stage, never persisted.
#[derive(Debug, Clone)]
pub struct FrameSample {
    /// Sample timestamp in seconds from the start of the video.
    pub timestamp: f64,

    /// L2-normalized visual embedding.
    pub embedding: Vec<f32>,

    /// Normalized color histogram (bounded bins, sums to ~1.0).
    pub histogram: Vec<f32>,
}

impl FrameSample {
    pub fn new(timestamp: f64, embedding: Vec<f32>, histogram: Vec<f32>) -> Self {
        Self {
            timestamp,
            embedding,
            histogram,
        }
    }
}

/// An atomic, non-overlapping time interval of one source video with one
/// aggregate visual embedding.
///
/// For a given video, clips are time-ordered, non-overlapping, and their
/// union covers the sampled duration (a short trailing tail may be dropped
/// when explicitly configured). Clips are immutable once written; re-running
/// segmentation supersedes the whole list.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Clip {
    /// Source video identifier.
    pub video_id: String,

    /// 0-based id, strictly increasing and contiguous per video.
    pub clip_id: u32,

    /// Start time in seconds (inclusive).
    pub t_start: f64,

    /// End time in seconds (exclusive, > t_start).
    pub t_end: f64,

    /// Tag of the embedding backend that produced the frame embeddings.
    pub embedding_model_tag: String,

    /// L2-normalized mean of the member frame embeddings.
    pub embedding: Vec<f32>,

    /// Creation time of this record.
    pub created_at: DateTime<Utc>,

    /// Schema version for forward migration.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

fn default_schema_version() -> u32 {
    CLIP_SCHEMA_VERSION
}

impl Clip {
    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        self.t_end - self.t_start
    }

    /// Validate a single clip record.
    pub fn validate(&self) -> ModelResult<()> {
        if self.embedding.is_empty() {
            return Err(ModelError::EmptyEmbedding {
                video_id: self.video_id.clone(),
                clip_id: self.clip_id,
            });
        }
        if !self.t_start.is_finite() || !self.t_end.is_finite() || self.t_end <= self.t_start {
            return Err(ModelError::InvalidTimeRange {
                video_id: self.video_id.clone(),
                clip_id: self.clip_id,
                t_start: self.t_start,
                t_end: self.t_end,
            });
        }
        Ok(())
    }
}

/// Validate an ordered clip list for one video: per-record checks plus the
/// cross-record invariants (contiguous ids, time order, no overlaps, one
/// embedding model, one embedding dimension).
pub fn validate_clip_list(clips: &[Clip]) -> ModelResult<()> {
    let Some(first) = clips.first() else {
        return Ok(());
    };
    let dim = first.embedding.len();

    for (idx, clip) in clips.iter().enumerate() {
        clip.validate()?;
        if clip.clip_id != idx as u32 {
            return Err(ModelError::NonContiguousClipIds {
                video_id: clip.video_id.clone(),
                expected: idx as u32,
                found: clip.clip_id,
            });
        }
        if clip.embedding_model_tag != first.embedding_model_tag {
            return Err(ModelError::MixedModelTags {
                first: first.embedding_model_tag.clone(),
                other: clip.embedding_model_tag.clone(),
            });
        }
        if clip.embedding.len() != dim {
            return Err(ModelError::DimensionMismatch {
                expected: dim,
                found: clip.embedding.len(),
            });
        }
        if idx > 0 {
            let prev = &clips[idx - 1];
            // Allow a hair of float slack at shared boundaries
            if clip.t_start < prev.t_end - 1e-6 {
                return Err(ModelError::UnorderedClips {
                    video_id: clip.video_id.clone(),
                    clip_id: clip.clip_id,
                });
            }
        }
    }
    Ok(())
}
