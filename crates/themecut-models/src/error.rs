//! Error types for model validation.

use thiserror::Error;

/// Result type for model-level validation.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised when a record or record set fails validation.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Empty embedding vector on clip {video_id}/{clip_id}")]
    EmptyEmbedding { video_id: String, clip_id: u32 },

    #[error("Invalid time range on clip {video_id}/{clip_id}: [{t_start}, {t_end}]")]
    InvalidTimeRange {
        video_id: String,
        clip_id: u32,
        t_start: f64,
        t_end: f64,
    },

    #[error("Clip ids for video {video_id} are not contiguous: expected {expected}, found {found}")]
    NonContiguousClipIds {
        video_id: String,
        expected: u32,
        found: u32,
    },

    #[error("Clips for video {video_id} overlap or are out of order at clip {clip_id}")]
    UnorderedClips { video_id: String, clip_id: u32 },

    #[error("Mixed embedding model tags in one clip list: {first:?} vs {other:?}")]
    MixedModelTags { first: String, other: String },

    #[error("Prototype set for theme {theme:?} has no positive prototypes")]
    NoPositivePrototypes { theme: String },

    #[error(
        "Prototype embedding count mismatch for theme {theme:?}: {texts} texts, {embeddings} embeddings"
    )]
    PrototypeCountMismatch {
        theme: String,
        texts: usize,
        embeddings: usize,
    },

    #[error("Embedding dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
}
