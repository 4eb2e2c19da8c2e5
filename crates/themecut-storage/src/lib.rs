//! Local JSON artifact store for pipeline outputs.
//!
//! This crate provides:
//! - A directory layout per artifact kind (clips, scores, EDL)
//! - Atomic publication: write to a temp file, then rename, so a
//!   concurrent reader sees either the complete prior version or the
//!   complete new one, never a torn write
//! - Theme slugs for filesystem-safe theme directories
//!
//! Artifacts are replaced wholesale; there is no partial patching.

pub mod error;
mod store;

pub use error::{StorageError, StorageResult};
pub use store::{theme_slug, ArtifactStore};
