//! Shared data models for the ThemeCut analysis pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Clips produced by shot segmentation
//! - Theme scores and the persisted score artifact
//! - Theme prototype sets (positive/negative text anchors)
//! - Edit decision list (EDL) entries
//!
//! Every persisted artifact is a flat JSON document built from these types;
//! producers replace artifacts wholesale and never patch them in place.

pub mod clip;
pub mod edl;
pub mod error;
pub mod score;
pub mod theme;
pub mod timeline;

// Re-export common types
pub use clip::{validate_clip_list, Clip, FrameSample, CLIP_SCHEMA_VERSION};
pub use edl::EdlEntry;
pub use error::{ModelError, ModelResult};
pub use score::{ScoreArtifact, ScoreWarning, ThemeScore};
pub use theme::ThemePrototypeSet;
pub use timeline::format_seconds;
