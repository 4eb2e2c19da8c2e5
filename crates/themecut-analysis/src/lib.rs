#![deny(unreachable_patterns)]
//! Theme-driven trimming pipeline: shot segmentation, theme scoring and
//! hysteresis sequencing.
//!
//! This crate provides:
//! - An `Embedder` capability trait with a color-statistics placeholder
//! - Shot boundary detection over per-frame embeddings and histograms
//! - Clip building with min/max duration policy
//! - Zero-shot theme scoring against positive/negative text prototypes
//! - Hysteresis-based selection and EDL assembly
//! - A rayon batch driver with per-video error isolation
//!
//! Every stage is a pure synchronous transformation over immutable inputs;
//! all I/O belongs to the caller. Configuration is passed explicitly per
//! call and is never read from process-wide state.

pub mod config;
pub mod embedding;
pub mod error;
mod math;
pub mod pipeline;
pub mod score;
pub mod segment;
pub mod sequence;

pub use config::{SegmentationConfig, SequencingConfig};
pub use embedding::{sample_frame, Embedder, FrameView, MeanColorEmbedder};
pub use error::{AnalysisError, AnalysisResult};
pub use pipeline::{score_batch, segment_batch, segment_video, VideoSamples};
pub use score::{build_prototype_set, score_clips};
pub use segment::{build_clips, detect_cuts, SegmentOutcome};
pub use sequence::{build_edl, selection_mask, SequencerInput};
