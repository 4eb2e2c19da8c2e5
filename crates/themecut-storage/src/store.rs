//! Artifact store implementation.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;
use themecut_models::{Clip, EdlEntry, ScoreArtifact};
use tracing::debug;

use crate::error::{StorageError, StorageResult};

const SEGMENTATION_DIR: &str = "segmentation";
const THEMES_DIR: &str = "themes";
const EDL_DIR: &str = "edl";

/// Filesystem-backed store for pipeline artifacts, rooted at a workspace
/// directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the clip list for one video.
    pub fn clips_path(&self, video_id: &str) -> StorageResult<PathBuf> {
        Ok(self
            .root
            .join(SEGMENTATION_DIR)
            .join(safe_key(video_id)?)
            .join("clips.json"))
    }

    /// Path of the score artifact for one (theme, video) pair.
    pub fn scores_path(&self, theme_slug: &str, video_id: &str) -> StorageResult<PathBuf> {
        Ok(self
            .root
            .join(THEMES_DIR)
            .join(safe_key(theme_slug)?)
            .join(safe_key(video_id)?)
            .join("scores.json"))
    }

    /// Path of the EDL for one theme and its video set.
    pub fn edl_path(&self, theme_slug: &str) -> StorageResult<PathBuf> {
        Ok(self
            .root
            .join(EDL_DIR)
            .join(safe_key(theme_slug)?)
            .join("edl.json"))
    }

    /// Publish the clip list for a video, superseding any previous version.
    pub fn write_clips(&self, video_id: &str, clips: &[Clip]) -> StorageResult<PathBuf> {
        let path = self.clips_path(video_id)?;
        write_json_atomic(&path, &clips)?;
        Ok(path)
    }

    /// Read the clip list for a video.
    pub fn read_clips(&self, video_id: &str) -> StorageResult<Vec<Clip>> {
        read_json(&self.clips_path(video_id)?)
    }

    /// Publish the score artifact for a (theme, video) pair.
    pub fn write_scores(
        &self,
        theme_slug: &str,
        video_id: &str,
        artifact: &ScoreArtifact,
    ) -> StorageResult<PathBuf> {
        let path = self.scores_path(theme_slug, video_id)?;
        write_json_atomic(&path, artifact)?;
        Ok(path)
    }

    /// Read the score artifact for a (theme, video) pair.
    pub fn read_scores(&self, theme_slug: &str, video_id: &str) -> StorageResult<ScoreArtifact> {
        read_json(&self.scores_path(theme_slug, video_id)?)
    }

    /// Publish the EDL for a theme.
    pub fn write_edl(&self, theme_slug: &str, entries: &[EdlEntry]) -> StorageResult<PathBuf> {
        let path = self.edl_path(theme_slug)?;
        write_json_atomic(&path, &entries)?;
        Ok(path)
    }

    /// Read the EDL for a theme.
    pub fn read_edl(&self, theme_slug: &str) -> StorageResult<Vec<EdlEntry>> {
        read_json(&self.edl_path(theme_slug)?)
    }
}

/// Serialize to a temp file in the destination directory, then rename into
/// place. The rename is what makes publication atomic; the temp file lives
/// next to the target so the rename never crosses filesystems.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    let parent = path
        .parent()
        .ok_or_else(|| StorageError::invalid_key(format!("{} has no parent", path.display())))?;
    fs::create_dir_all(parent)?;

    let tmp = NamedTempFile::new_in(parent)?;
    serde_json::to_writer_pretty(tmp.as_file(), value)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StorageError::Io(e.error))?;

    debug!(path = %path.display(), "Published artifact");
    Ok(())
}

fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<T> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

/// Reject keys that would escape the store layout.
fn safe_key(key: &str) -> StorageResult<&str> {
    if key.is_empty() {
        return Err(StorageError::invalid_key("key must not be empty"));
    }
    if key == "." || key == ".." || key.contains('/') || key.contains('\\') {
        return Err(StorageError::invalid_key(format!(
            "key {key:?} must not contain path separators"
        )));
    }
    Ok(key)
}

/// Filesystem-safe slug for a theme: lowercase alphanumeric runs joined by
/// underscores, with a hash fallback for themes that slug to nothing.
pub fn theme_slug(theme: &str) -> String {
    let mut slug = String::new();
    let mut last_was_sep = true;
    for ch in theme.trim().to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    let slug = slug.trim_end_matches('_').to_string();
    if !slug.is_empty() {
        return slug;
    }
    let mut hasher = DefaultHasher::new();
    theme.hash(&mut hasher);
    format!("theme_{:08x}", hasher.finish() as u32)
}
