//! Theme score models and the persisted score artifact.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Relevance score of one clip against one theme.
///
/// `score = s_pos - s_neg` exactly; both sides are max-aggregated cosine
/// similarities against the prototype embeddings, so for normalized inputs
/// `s_pos` and `s_neg` lie in [-1, 1].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ThemeScore {
    /// Clip id within `video_id`.
    pub clip_id: u32,

    /// Source video identifier.
    pub video_id: String,

    /// Clip start time in seconds (copied from the clip for self-contained artifacts).
    pub t_start: f64,

    /// Clip end time in seconds.
    pub t_end: f64,

    /// `s_pos - s_neg`.
    pub score: f64,

    /// Best similarity against the positive prototypes.
    pub s_pos: f64,

    /// Best similarity against the negative prototypes (0.0 when none).
    pub s_neg: f64,
}

/// Structured warning attached to a score artifact.
///
/// A degraded embedding backend is not an error: the pipeline still runs
/// end-to-end (useful for smoke-testing the mechanics), but the scores are
/// not interpretable and callers must be able to see that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreWarning {
    /// The embedding backend is a non-semantic placeholder (e.g. color
    /// statistics); scores carry no thematic meaning.
    NonSemanticEmbedding,
}

impl ScoreWarning {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreWarning::NonSemanticEmbedding => "non_semantic_embedding",
        }
    }
}

/// Persisted scoring output for one (theme, video) pair.
///
/// Recomputed wholesale whenever the theme or its prototypes change; never
/// partially patched.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScoreArtifact {
    /// Free-text theme the scores were computed against.
    pub theme: String,

    /// Embedding backend tag shared by the clips and the prototypes.
    pub embedding_model_tag: String,

    /// Creation time of this artifact.
    pub created_at: DateTime<Utc>,

    /// Degraded-capability warning, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<ScoreWarning>,

    /// One record per scored clip, in clip order.
    pub scores: Vec<ThemeScore>,
}

impl ScoreArtifact {
    /// True when the scores were produced by a non-semantic backend.
    pub fn is_degraded(&self) -> bool {
        self.warning.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(warning: Option<ScoreWarning>) -> ScoreArtifact {
        ScoreArtifact {
            theme: "sunset beach".to_string(),
            embedding_model_tag: "clip-vit-b32".to_string(),
            created_at: Utc::now(),
            warning,
            scores: vec![ThemeScore {
                clip_id: 0,
                video_id: "vid".to_string(),
                t_start: 0.0,
                t_end: 3.0,
                score: 0.12,
                s_pos: 0.31,
                s_neg: 0.19,
            }],
        }
    }

    #[test]
    fn test_score_identity_survives_round_trip() {
        let json = serde_json::to_string(&artifact(None)).unwrap();
        let back: ScoreArtifact = serde_json::from_str(&json).unwrap();
        let s = &back.scores[0];
        assert!((s.score - (s.s_pos - s.s_neg)).abs() < 1e-9);
        assert!(!back.is_degraded());
    }

    #[test]
    fn test_warning_serializes_snake_case() {
        let json = serde_json::to_string(&artifact(Some(ScoreWarning::NonSemanticEmbedding))).unwrap();
        assert!(json.contains("non_semantic_embedding"));
        let back: ScoreArtifact = serde_json::from_str(&json).unwrap();
        assert!(back.is_degraded());
    }

    #[test]
    fn test_missing_warning_field_defaults_to_none() {
        let json = r#"{
            "theme": "t",
            "embedding_model_tag": "m",
            "created_at": "2026-01-01T00:00:00Z",
            "scores": []
        }"#;
        let back: ScoreArtifact = serde_json::from_str(json).unwrap();
        assert!(back.warning.is_none());
        assert!(back.scores.is_empty());
    }
}
