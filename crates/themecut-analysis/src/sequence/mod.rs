//! Hysteresis selection and EDL assembly.
//!
//! A two-state Schmitt trigger walks each video's clips in chronological
//! order: a selected run starts only when a score clears the upper
//! threshold, but continues while scores stay above the lower one, so a
//! single-clip dip does not fragment an otherwise coherent stretch.
//! Selected runs are then gap-merged, floored, capped, and emitted as EDL
//! entries.

use std::collections::HashMap;

use themecut_models::{validate_clip_list, Clip, EdlEntry, ThemeScore};
use tracing::{debug, info};

use crate::config::SequencingConfig;
use crate::error::{AnalysisError, AnalysisResult};

/// Reason tag written on every entry produced here.
const REASON_THEME_MATCH: &str = "theme_match";

/// Aligned inputs for one video: the clip list and its scores.
#[derive(Debug, Clone, Copy)]
pub struct SequencerInput<'a> {
    pub clips: &'a [Clip],
    pub scores: &'a [ThemeScore],
}

impl<'a> SequencerInput<'a> {
    pub fn new(clips: &'a [Clip], scores: &'a [ThemeScore]) -> Self {
        Self { clips, scores }
    }
}

/// Selection state of the Schmitt trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SelectionState {
    Idle,
    Selecting,
}

/// Compute the boolean selection mask for a score sequence.
///
/// Exposed separately because the dual-threshold walk is the part worth
/// testing in isolation: `[0.05, 0.25, 0.18, 0.05]` with upper 0.2 and
/// lower 0.15 must yield `[false, true, true, false]`.
pub fn selection_mask(scores: &[f64], config: &SequencingConfig) -> Vec<bool> {
    let mut state = SelectionState::Idle;
    scores
        .iter()
        .map(|&score| {
            state = match state {
                SelectionState::Idle if score >= config.upper_threshold => {
                    SelectionState::Selecting
                }
                SelectionState::Selecting if score >= config.lower_threshold => {
                    SelectionState::Selecting
                }
                _ => SelectionState::Idle,
            };
            state == SelectionState::Selecting
        })
        .collect()
}

/// Build the EDL for one or more videos.
///
/// Videos are processed independently and concatenated in the given order;
/// within a video, entries are chronological. `index` is assigned 1-based
/// over the final concatenation. Empty input is a valid empty EDL.
pub fn build_edl(
    videos: &[SequencerInput<'_>],
    config: &SequencingConfig,
) -> AnalysisResult<Vec<EdlEntry>> {
    config.validate()?;

    let mut entries = Vec::new();
    for video in videos {
        sequence_video(video, config, &mut entries)?;
    }
    for (idx, entry) in entries.iter_mut().enumerate() {
        entry.index = idx as u32 + 1;
    }

    info!(
        videos = videos.len(),
        entries = entries.len(),
        "Sequencing finished"
    );
    Ok(entries)
}

/// A contiguous stretch of selected timeline within one video.
#[derive(Debug, Clone, Copy)]
struct Run {
    t_start: f64,
    t_end: f64,
}

fn sequence_video(
    input: &SequencerInput<'_>,
    config: &SequencingConfig,
    entries: &mut Vec<EdlEntry>,
) -> AnalysisResult<()> {
    validate_clip_list(input.clips)?;
    let scores = align_scores(input)?;
    let Some(video_id) = input.clips.first().map(|c| c.video_id.clone()) else {
        return Ok(());
    };

    // Schmitt-trigger walk over chronological clips
    let score_values: Vec<f64> = scores.iter().map(|s| s.score).collect();
    let mask = selection_mask(&score_values, config);

    let mut runs: Vec<Run> = Vec::new();
    for (clip, selected) in input.clips.iter().zip(mask.iter()) {
        if !selected {
            continue;
        }
        match runs.last_mut() {
            // Adjacent selected clips share a boundary; extend the open run
            Some(run) if (clip.t_start - run.t_end).abs() < 1e-9 => run.t_end = clip.t_end,
            _ => runs.push(Run {
                t_start: clip.t_start,
                t_end: clip.t_end,
            }),
        }
    }

    let runs = merge_gaps(runs, config.merge_gap);

    for run in runs {
        let duration = run.t_end - run.t_start;
        if duration < config.min_duration {
            debug!(
                video_id = video_id.as_str(),
                t_start = run.t_start,
                t_end = run.t_end,
                "Dropping run below minimum duration"
            );
            continue;
        }
        for (piece_start, piece_end) in split_even(run.t_start, run.t_end, config.max_duration) {
            let aggregate = mean_score_in_window(&scores, piece_start, piece_end);
            entries.push(EdlEntry::new(
                0, // assigned after concatenation
                video_id.clone(),
                piece_start,
                piece_end,
                REASON_THEME_MATCH,
                aggregate,
            ));
        }
    }
    Ok(())
}

/// Align scores to clips by `clip_id`; any mismatch is a hard error.
fn align_scores<'a>(input: &SequencerInput<'a>) -> AnalysisResult<Vec<&'a ThemeScore>> {
    let mut by_id: HashMap<u32, &ThemeScore> = HashMap::with_capacity(input.scores.len());
    for score in input.scores {
        if let Some(clip) = input.clips.first() {
            if score.video_id != clip.video_id {
                return Err(AnalysisError::invalid_input(format!(
                    "score for video {:?} paired with clips of video {:?}",
                    score.video_id, clip.video_id
                )));
            }
        }
        if by_id.insert(score.clip_id, score).is_some() {
            return Err(AnalysisError::invalid_input(format!(
                "duplicate score for clip_id {}",
                score.clip_id
            )));
        }
        if !input.clips.iter().any(|c| c.clip_id == score.clip_id) {
            return Err(AnalysisError::invalid_input(format!(
                "score references clip_id {} absent from the clip list",
                score.clip_id
            )));
        }
    }

    input
        .clips
        .iter()
        .map(|clip| {
            by_id.get(&clip.clip_id).copied().ok_or_else(|| {
                AnalysisError::invalid_input(format!(
                    "clip_id {} of video {:?} has no score",
                    clip.clip_id, clip.video_id
                ))
            })
        })
        .collect()
}

/// Merge runs separated by a gap of at most `merge_gap` seconds.
fn merge_gaps(runs: Vec<Run>, merge_gap: f64) -> Vec<Run> {
    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(prev) if run.t_start - prev.t_end <= merge_gap + 1e-9 => {
                prev.t_end = run.t_end;
            }
            _ => merged.push(run),
        }
    }
    merged
}

/// Equal-width split of an over-length run; mirrors the clip builder's
/// split-long policy.
fn split_even(start: f64, end: f64, max_duration: f64) -> Vec<(f64, f64)> {
    let duration = end - start;
    if duration <= max_duration {
        return vec![(start, end)];
    }
    let pieces = (duration / max_duration).ceil() as usize;
    let width = duration / pieces as f64;
    (0..pieces)
        .map(|k| {
            let piece_start = start + width * k as f64;
            let piece_end = if k + 1 == pieces {
                end
            } else {
                start + width * (k + 1) as f64
            };
            (piece_start, piece_end)
        })
        .collect()
}

/// Mean score of the clips whose interval overlaps `[start, end)`; clips
/// bridged by a gap merge count toward the aggregate.
fn mean_score_in_window(scores: &[&ThemeScore], start: f64, end: f64) -> f64 {
    let member: Vec<f64> = scores
        .iter()
        .filter(|s| s.t_start < end - 1e-9 && s.t_end > start + 1e-9)
        .map(|s| s.score)
        .collect();
    if member.is_empty() {
        return 0.0;
    }
    member.iter().sum::<f64>() / member.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use themecut_models::CLIP_SCHEMA_VERSION;

    fn config(upper: f64, lower: f64, min: f64, max: f64, gap: f64) -> SequencingConfig {
        SequencingConfig {
            upper_threshold: upper,
            lower_threshold: lower,
            min_duration: min,
            max_duration: max,
            merge_gap: gap,
        }
    }

    fn clip(video: &str, id: u32, t_start: f64, t_end: f64) -> Clip {
        Clip {
            video_id: video.to_string(),
            clip_id: id,
            t_start,
            t_end,
            embedding_model_tag: "axis-test".to_string(),
            embedding: vec![1.0, 0.0],
            created_at: Utc::now(),
            schema_version: CLIP_SCHEMA_VERSION,
        }
    }

    fn score(clip: &Clip, value: f64) -> ThemeScore {
        ThemeScore {
            clip_id: clip.clip_id,
            video_id: clip.video_id.clone(),
            t_start: clip.t_start,
            t_end: clip.t_end,
            score: value,
            s_pos: value,
            s_neg: 0.0,
        }
    }

    /// One-second clips at 0..n with the given scores.
    fn video(video_id: &str, values: &[f64]) -> (Vec<Clip>, Vec<ThemeScore>) {
        let clips: Vec<Clip> = values
            .iter()
            .enumerate()
            .map(|(i, _)| clip(video_id, i as u32, i as f64, i as f64 + 1.0))
            .collect();
        let scores = clips
            .iter()
            .zip(values.iter())
            .map(|(c, v)| score(c, *v))
            .collect();
        (clips, scores)
    }

    #[test]
    fn test_hysteresis_mask_keeps_dipping_continuation() {
        let cfg = config(0.2, 0.15, 0.0, f64::INFINITY, 0.0);
        let mask = selection_mask(&[0.05, 0.25, 0.18, 0.05], &cfg);
        assert_eq!(mask, vec![false, true, true, false]);
    }

    #[test]
    fn test_mask_requires_upper_to_start() {
        let cfg = config(0.2, 0.15, 0.0, f64::INFINITY, 0.0);
        // 0.18 clears lower but no run is active; it must not start one
        let mask = selection_mask(&[0.18, 0.18, 0.25, 0.16], &cfg);
        assert_eq!(mask, vec![false, false, true, true]);
    }

    #[test]
    fn test_open_run_closes_at_last_clip() {
        let (clips, scores) = video("vid", &[0.05, 0.3, 0.3]);
        let cfg = config(0.2, 0.15, 0.0, f64::INFINITY, 0.0);
        let edl = build_edl(&[SequencerInput::new(&clips, &scores)], &cfg).unwrap();
        assert_eq!(edl.len(), 1);
        assert_eq!(edl[0].t_start, 1.0);
        assert_eq!(edl[0].t_end, 3.0);
    }

    #[test]
    fn test_gap_merge_joins_nearby_runs() {
        // Selected runs [0,2) and [2.5,4) with a 0.5s gap
        let clips = vec![
            clip("vid", 0, 0.0, 2.0),
            clip("vid", 1, 2.0, 2.5),
            clip("vid", 2, 2.5, 4.0),
        ];
        let scores = vec![
            score(&clips[0], 0.3),
            score(&clips[1], 0.0),
            score(&clips[2], 0.3),
        ];

        let merged = build_edl(
            &[SequencerInput::new(&clips, &scores)],
            &config(0.2, 0.15, 0.0, f64::INFINITY, 1.0),
        )
        .unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].t_start, 0.0);
        assert_eq!(merged[0].t_end, 4.0);

        let separate = build_edl(
            &[SequencerInput::new(&clips, &scores)],
            &config(0.2, 0.15, 0.0, f64::INFINITY, 0.3),
        )
        .unwrap();
        assert_eq!(separate.len(), 2);
        assert_eq!(separate[0].t_end, 2.0);
        assert_eq!(separate[1].t_start, 2.5);
    }

    #[test]
    fn test_duration_floor_drops_short_runs() {
        let (clips, scores) = video("vid", &[0.3, 0.0, 0.0, 0.0]);
        let cfg = config(0.2, 0.15, 2.0, f64::INFINITY, 0.0);
        let edl = build_edl(&[SequencerInput::new(&clips, &scores)], &cfg).unwrap();
        assert!(edl.is_empty());
    }

    #[test]
    fn test_duration_ceiling_splits_evenly() {
        let (clips, scores) = video("vid", &[0.3; 10]);
        let cfg = config(0.2, 0.15, 0.0, 4.0, 0.0);
        let edl = build_edl(&[SequencerInput::new(&clips, &scores)], &cfg).unwrap();
        // One 10s run capped at 4s -> 3 pieces of 10/3 s
        assert_eq!(edl.len(), 3);
        for entry in &edl {
            assert!(entry.duration <= 4.0 + 1e-9);
            assert!((entry.duration - 10.0 / 3.0).abs() < 1e-9);
        }
        assert_eq!(edl[0].t_start, 0.0);
        assert_eq!(edl[2].t_end, 10.0);
    }

    #[test]
    fn test_end_to_end_scenario() {
        // Synthetic scenario: runs [0-1], [3-4] and [7-9] with no gap
        // tolerance produce exactly three chronological entries.
        let (clips, scores) = video(
            "vid",
            &[0.3, 0.3, 0.1, 0.3, 0.3, 0.05, 0.05, 0.3, 0.3, 0.3],
        );
        let cfg = config(0.2, 0.15, 0.0, f64::INFINITY, 0.0);
        let edl = build_edl(&[SequencerInput::new(&clips, &scores)], &cfg).unwrap();
        assert_eq!(edl.len(), 3);
        // Clip ids 0-1
        assert_eq!(edl[0].t_start, 0.0);
        assert_eq!(edl[0].t_end, 2.0);
        // Clip ids 3-4
        assert_eq!(edl[1].t_start, 3.0);
        assert_eq!(edl[1].t_end, 5.0);
        // Clip ids 7-9
        assert_eq!(edl[2].t_start, 7.0);
        assert_eq!(edl[2].t_end, 10.0);
        assert_eq!(
            edl.iter().map(|e| e.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        // A 1s gap tolerance closes the single-clip hole at [2,3) but not
        // the two-clip hole at [5,7): exactly two entries remain.
        let merged = build_edl(
            &[SequencerInput::new(&clips, &scores)],
            &config(0.2, 0.15, 0.0, f64::INFINITY, 1.0),
        )
        .unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].t_start, 0.0);
        assert_eq!(merged[0].t_end, 5.0);
        assert_eq!(merged[1].t_start, 7.0);
        assert_eq!(merged[1].t_end, 10.0);

        // Large enough tolerance closes both holes.
        let single = build_edl(
            &[SequencerInput::new(&clips, &scores)],
            &config(0.2, 0.15, 0.0, f64::INFINITY, 2.0),
        )
        .unwrap();
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].t_start, 0.0);
        assert_eq!(single[0].t_end, 10.0);
    }

    #[test]
    fn test_aggregate_score_is_mean_of_covered_clips() {
        let (clips, scores) = video("vid", &[0.3, 0.2, 0.25, 0.0]);
        let cfg = config(0.2, 0.15, 0.0, f64::INFINITY, 0.0);
        let edl = build_edl(&[SequencerInput::new(&clips, &scores)], &cfg).unwrap();
        assert_eq!(edl.len(), 1);
        assert!((edl[0].aggregate_score - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_videos_concatenate_in_caller_order() {
        let (clips_b, scores_b) = video("b", &[0.3, 0.3]);
        let (clips_a, scores_a) = video("a", &[0.3]);
        let cfg = config(0.2, 0.15, 0.0, f64::INFINITY, 0.0);
        let edl = build_edl(
            &[
                SequencerInput::new(&clips_b, &scores_b),
                SequencerInput::new(&clips_a, &scores_a),
            ],
            &cfg,
        )
        .unwrap();
        assert_eq!(edl.len(), 2);
        assert_eq!(edl[0].video_id, "b");
        assert_eq!(edl[1].video_id, "a");
        assert_eq!(edl[1].index, 2);
    }

    #[test]
    fn test_empty_input_is_empty_edl() {
        let cfg = config(0.2, 0.15, 0.0, f64::INFINITY, 0.0);
        assert!(build_edl(&[], &cfg).unwrap().is_empty());
        let edl = build_edl(&[SequencerInput::new(&[], &[])], &cfg).unwrap();
        assert!(edl.is_empty());
    }

    #[test]
    fn test_score_for_unknown_clip_is_hard_error() {
        let (clips, mut scores) = video("vid", &[0.3, 0.3]);
        scores[1].clip_id = 99;
        let cfg = config(0.2, 0.15, 0.0, f64::INFINITY, 0.0);
        assert!(matches!(
            build_edl(&[SequencerInput::new(&clips, &scores)], &cfg),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_missing_score_is_hard_error() {
        let (clips, mut scores) = video("vid", &[0.3, 0.3]);
        scores.pop();
        let cfg = config(0.2, 0.15, 0.0, f64::INFINITY, 0.0);
        assert!(build_edl(&[SequencerInput::new(&clips, &scores)], &cfg).is_err());
    }

    #[test]
    fn test_reason_tag() {
        let (clips, scores) = video("vid", &[0.3]);
        let cfg = config(0.2, 0.15, 0.0, f64::INFINITY, 0.0);
        let edl = build_edl(&[SequencerInput::new(&clips, &scores)], &cfg).unwrap();
        assert_eq!(edl[0].reason, "theme_match");
    }
}
