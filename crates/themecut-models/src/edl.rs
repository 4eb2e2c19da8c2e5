//! Edit decision list (EDL) entry model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One source time range to extract and concatenate into the final cut.
///
/// Ordering is chronological within each source video; videos are
/// concatenated in the caller-supplied order. One EDL is produced per
/// (theme, video-set) combination and is immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EdlEntry {
    /// 1-based position in the final sequence.
    pub index: u32,

    /// Source video identifier.
    pub video_id: String,

    /// Start time in the source video, seconds.
    pub t_start: f64,

    /// End time in the source video, seconds.
    pub t_end: f64,

    /// `t_end - t_start`, materialized for the renderer.
    pub duration: f64,

    /// Machine-readable tag describing why this range was selected.
    pub reason: String,

    /// Mean theme score of the clips covered by this range.
    pub aggregate_score: f64,
}

impl EdlEntry {
    pub fn new(
        index: u32,
        video_id: impl Into<String>,
        t_start: f64,
        t_end: f64,
        reason: impl Into<String>,
        aggregate_score: f64,
    ) -> Self {
        Self {
            index,
            video_id: video_id.into(),
            t_start,
            t_end,
            duration: t_end - t_start,
            reason: reason.into(),
            aggregate_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_is_materialized() {
        let entry = EdlEntry::new(1, "vid", 4.5, 10.0, "theme_match", 0.27);
        assert!((entry.duration - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_json_round_trip() {
        let entries = vec![
            EdlEntry::new(1, "a", 0.0, 2.0, "theme_match", 0.3),
            EdlEntry::new(2, "b", 1.5, 9.25, "theme_match", 0.22),
        ];
        let json = serde_json::to_string(&entries).unwrap();
        let back: Vec<EdlEntry> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[1].index, 2);
        assert_eq!(back[1].video_id, "b");
        assert!((back[1].duration - 7.75).abs() < 1e-9);
    }
}
