//! Zero-shot theme scoring against text prototypes.

mod prototypes;
mod scorer;

pub use prototypes::build_prototype_set;
pub use scorer::score_clips;
