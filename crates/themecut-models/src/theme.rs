//! Theme prototype set: positive/negative text anchors and their embeddings.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// A theme plus its positive and negative text prototypes, embedded into the
/// same metric space as the clip embeddings.
///
/// The embeddings must come from the same encoder family as the frame
/// embeddings or the similarity scores are meaningless. `positives[i]`
/// pairs with `positive_embeddings[i]`, likewise for negatives.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ThemePrototypeSet {
    /// Free-text theme this set expands.
    pub theme: String,

    /// Desired visual concepts.
    pub positives: Vec<String>,

    /// Undesired/contrastive concepts used to cancel systematic similarity.
    pub negatives: Vec<String>,

    /// Unit-normalized embeddings aligned with `positives`.
    pub positive_embeddings: Vec<Vec<f32>>,

    /// Unit-normalized embeddings aligned with `negatives`.
    pub negative_embeddings: Vec<Vec<f32>>,
}

impl ThemePrototypeSet {
    /// Embedding dimension, taken from the first positive prototype.
    pub fn dimension(&self) -> usize {
        self.positive_embeddings
            .first()
            .map(|e| e.len())
            .unwrap_or(0)
    }

    /// Validate alignment and dimensional consistency.
    pub fn validate(&self) -> ModelResult<()> {
        if self.positives.is_empty() || self.positive_embeddings.is_empty() {
            return Err(ModelError::NoPositivePrototypes {
                theme: self.theme.clone(),
            });
        }
        if self.positives.len() != self.positive_embeddings.len() {
            return Err(ModelError::PrototypeCountMismatch {
                theme: self.theme.clone(),
                texts: self.positives.len(),
                embeddings: self.positive_embeddings.len(),
            });
        }
        if self.negatives.len() != self.negative_embeddings.len() {
            return Err(ModelError::PrototypeCountMismatch {
                theme: self.theme.clone(),
                texts: self.negatives.len(),
                embeddings: self.negative_embeddings.len(),
            });
        }
        let dim = self.dimension();
        for emb in self
            .positive_embeddings
            .iter()
            .chain(self.negative_embeddings.iter())
        {
            if emb.len() != dim || dim == 0 {
                return Err(ModelError::DimensionMismatch {
                    expected: dim,
                    found: emb.len(),
                });
            }
        }
        Ok(())
    }
}

/// De-duplicate prototype texts preserving first-seen order; blank entries
/// are dropped.
pub fn unique_keep_order<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = std::collections::HashSet::new();
    let mut result = Vec::new();
    for item in items {
        let trimmed = item.as_ref().trim();
        if trimmed.is_empty() || !seen.insert(trimmed.to_string()) {
            continue;
        }
        result.push(trimmed.to_string());
    }
    result
}
