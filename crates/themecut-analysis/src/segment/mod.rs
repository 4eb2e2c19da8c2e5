//! Shot segmentation: boundary detection and clip building.

mod clip_builder;
mod shot_detector;

pub use clip_builder::{build_clips, SegmentOutcome};
pub use shot_detector::detect_cuts;
