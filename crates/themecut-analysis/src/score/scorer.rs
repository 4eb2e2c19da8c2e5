//! Per-clip theme scoring.
//!
//! `s_pos` is the best cosine similarity against any positive prototype,
//! `s_neg` the best against any negative, `score = s_pos - s_neg`. Max
//! aggregation is deliberate: a clip matching one strong positive facet
//! should score highly even when the other facets describe something else.
//! Subtracting the best negative cancels systematic theme-irrelevant
//! similarity (shared lighting or color statistics), the main source of
//! false positives in single-sided scoring.

use chrono::Utc;
use ndarray::Array2;
use themecut_models::{
    validate_clip_list, Clip, ScoreArtifact, ScoreWarning, ThemePrototypeSet, ThemeScore,
};
use tracing::{info, warn};

use crate::embedding::Embedder;
use crate::error::{AnalysisError, AnalysisResult};
use crate::math::l2_normalize;

/// Score every clip against the prototype set.
///
/// Computed as one batched matrix multiplication (clip embeddings ×
/// prototype embeddings) with a row-max reduction, not a per-clip loop.
/// A non-semantic backend does not fail the call; the artifact carries
/// [`ScoreWarning::NonSemanticEmbedding`] so callers can warn instead of
/// trusting noise.
pub fn score_clips(
    clips: &[Clip],
    prototypes: &ThemePrototypeSet,
    embedder: &dyn Embedder,
) -> AnalysisResult<ScoreArtifact> {
    validate_clip_list(clips)?;
    prototypes.validate()?;

    let warning = if embedder.is_semantic() {
        None
    } else {
        warn!(
            backend = embedder.model_tag(),
            theme = prototypes.theme.as_str(),
            "Embedding backend is a non-semantic placeholder; theme scores are not interpretable"
        );
        Some(ScoreWarning::NonSemanticEmbedding)
    };

    let artifact = |scores: Vec<ThemeScore>| ScoreArtifact {
        theme: prototypes.theme.clone(),
        embedding_model_tag: embedder.model_tag().to_string(),
        created_at: Utc::now(),
        warning,
        scores,
    };

    let Some(first) = clips.first() else {
        return Ok(artifact(Vec::new()));
    };
    if first.embedding_model_tag != embedder.model_tag() {
        return Err(AnalysisError::invalid_input(format!(
            "clips were embedded with {:?} but the scoring backend is {:?}",
            first.embedding_model_tag,
            embedder.model_tag()
        )));
    }
    let dim = first.embedding.len();
    if prototypes.dimension() != dim {
        return Err(AnalysisError::invalid_input(format!(
            "clip embeddings have dimension {} but prototypes have {}",
            dim,
            prototypes.dimension()
        )));
    }

    let clip_matrix = to_matrix(clips.iter().map(|c| c.embedding.as_slice()), dim)?;
    let s_pos = max_similarities(&clip_matrix, &prototypes.positive_embeddings, dim)?;
    let s_neg = if prototypes.negative_embeddings.is_empty() {
        vec![0.0; clips.len()]
    } else {
        max_similarities(&clip_matrix, &prototypes.negative_embeddings, dim)?
    };

    let scores: Vec<ThemeScore> = clips
        .iter()
        .zip(s_pos.iter().zip(s_neg.iter()))
        .map(|(clip, (&pos, &neg))| ThemeScore {
            clip_id: clip.clip_id,
            video_id: clip.video_id.clone(),
            t_start: clip.t_start,
            t_end: clip.t_end,
            score: pos - neg,
            s_pos: pos,
            s_neg: neg,
        })
        .collect();

    let max_score = scores.iter().map(|s| s.score).fold(f64::NEG_INFINITY, f64::max);
    let avg_score = scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64;
    info!(
        theme = prototypes.theme.as_str(),
        clips = scores.len(),
        max_score = format!("{:.4}", max_score),
        avg_score = format!("{:.4}", avg_score),
        "Theme scoring finished"
    );

    Ok(artifact(scores))
}

/// Stack row vectors into an (n, dim) matrix, re-normalizing each row.
fn to_matrix<'a>(
    rows: impl Iterator<Item = &'a [f32]>,
    dim: usize,
) -> AnalysisResult<Array2<f32>> {
    let mut flat = Vec::new();
    let mut count = 0usize;
    for row in rows {
        let mut row = row.to_vec();
        l2_normalize(&mut row);
        flat.extend_from_slice(&row);
        count += 1;
    }
    Array2::from_shape_vec((count, dim), flat)
        .map_err(|e| AnalysisError::invalid_input(format!("embedding matrix shape error: {e}")))
}

/// Row-max of `clips × prototypesᵀ`.
fn max_similarities(
    clip_matrix: &Array2<f32>,
    prototype_rows: &[Vec<f32>],
    dim: usize,
) -> AnalysisResult<Vec<f64>> {
    let proto_matrix = to_matrix(prototype_rows.iter().map(|r| r.as_slice()), dim)?;
    let sims = clip_matrix.dot(&proto_matrix.t());
    Ok(sims
        .outer_iter()
        .map(|row| {
            row.iter()
                .map(|v| *v as f64)
                .fold(f64::NEG_INFINITY, f64::max)
        })
        .collect())
}
