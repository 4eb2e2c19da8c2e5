//! Theme prototype embedding.
//!
//! Prototype texts are embedded once through the injected backend; the
//! resulting set is the persisted contract between theme definition and
//! scoring. When a caller supplies no positive prototypes the theme string
//! itself becomes the sole positive anchor.

use themecut_models::{theme::unique_keep_order, ThemePrototypeSet};
use tracing::debug;

use crate::embedding::Embedder;
use crate::error::{AnalysisError, AnalysisResult};
use crate::math::l2_normalize;

/// Build a [`ThemePrototypeSet`] by embedding the prototype texts.
///
/// Texts are de-duplicated preserving order; blank entries are dropped.
/// Embeddings are defensively re-normalized so the scorer's cosine math
/// holds even for a backend that is sloppy about unit length.
pub fn build_prototype_set(
    theme: &str,
    positives: &[String],
    negatives: &[String],
    embedder: &dyn Embedder,
) -> AnalysisResult<ThemePrototypeSet> {
    let theme = theme.trim();
    let mut positives = unique_keep_order(positives);
    let negatives = unique_keep_order(negatives);

    if positives.is_empty() {
        if theme.is_empty() {
            return Err(AnalysisError::invalid_input(
                "a theme or at least one positive prototype is required",
            ));
        }
        positives.push(theme.to_string());
    }

    debug!(
        theme,
        positives = positives.len(),
        negatives = negatives.len(),
        backend = embedder.model_tag(),
        "Embedding theme prototypes"
    );

    let positive_embeddings = embed_all(&positives, embedder)?;
    let negative_embeddings = embed_all(&negatives, embedder)?;

    let set = ThemePrototypeSet {
        theme: theme.to_string(),
        positives,
        negatives,
        positive_embeddings,
        negative_embeddings,
    };
    set.validate()?;
    Ok(set)
}

fn embed_all(texts: &[String], embedder: &dyn Embedder) -> AnalysisResult<Vec<Vec<f32>>> {
    let mut embeddings = Vec::with_capacity(texts.len());
    for text in texts {
        let mut embedding = embedder.embed_text(text)?;
        if embedding.is_empty() {
            return Err(AnalysisError::embedding_failed(format!(
                "backend {} returned an empty embedding for prototype {:?}",
                embedder.model_tag(),
                text
            )));
        }
        l2_normalize(&mut embedding);
        embeddings.push(embedding);
    }
    Ok(embeddings)
}
