//! Pattern review — descriptive aggregates over the archive.
//!
//! Counts, ratios, and frequencies only. This module performs no judgment,
//! scoring, or recommendation by explicit design contract, and it never
//! reads the active chain — a pattern is something a finished cycle left
//! behind.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use immanence_types::{ActionType, ChainId, ChainRecord, ContextCategory};

/// How many archived chains the recent timeline covers.
const RECENT_TIMELINE_LEN: usize = 30;

/// How archived chains left the Wave stage. Each chain that reached a Wave
/// terminal state falls into exactly one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WaveCapacity {
    /// Rode the timer out (Wave locked).
    pub completed: usize,
    pub aborted: usize,
    pub skipped: usize,
}

/// One archived chain reduced to its timeline footprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: ChainId,
    pub date: DateTime<Utc>,
    pub context: ContextCategory,
    pub completed: bool,
}

/// Aggregate, non-judgmental statistics over completed and abandoned
/// chains.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternStats {
    pub total_chains: usize,
    /// Chains per Mirror context category.
    pub context_frequency: BTreeMap<ContextCategory, usize>,
    /// Mean of `1 - supported_ratio` over Prism-locked chains; `None` when
    /// no archived chain locked Prism (skipped chains are excluded
    /// entirely, not counted as zero).
    pub avg_unsupported_narrative_ratio: Option<f64>,
    pub wave_capacity: WaveCapacity,
    /// Mean of `start - end` intensity over Wave-locked chains with both
    /// readings present; `None` when no chain qualifies.
    pub avg_intensity_delta: Option<f64>,
    /// Chains per Sword action type, over Sword-locked chains.
    pub action_type_distribution: BTreeMap<ActionType, usize>,
    /// Fraction of archived chains that reached full completion; abandoned
    /// chains stay in the denominator.
    pub completion_ratio: f64,
    /// The last thirty archived chains in archive order, oldest first.
    pub recent_chains: Vec<TimelineEntry>,
}

impl PatternStats {
    /// Compute statistics over the archive; `None` while it is empty.
    #[must_use]
    pub fn compute(archive: &[ChainRecord]) -> Option<Self> {
        if archive.is_empty() {
            return None;
        }

        let mut context_frequency: BTreeMap<ContextCategory, usize> = BTreeMap::new();
        for chain in archive {
            *context_frequency
                .entry(chain.mirror.context.category)
                .or_insert(0) += 1;
        }

        let prism_ratios: Vec<f64> = archive
            .iter()
            .filter(|c| c.prism.locked)
            .map(|c| 1.0 - c.prism.supported_ratio)
            .collect();
        let avg_unsupported_narrative_ratio = mean(&prism_ratios);

        let mut wave_capacity = WaveCapacity::default();
        for chain in archive {
            if chain.wave.locked {
                wave_capacity.completed += 1;
            } else if chain.wave.aborted {
                wave_capacity.aborted += 1;
            } else if chain.wave.skipped {
                wave_capacity.skipped += 1;
            }
        }

        let intensity_deltas: Vec<f64> = archive
            .iter()
            .filter(|c| c.wave.locked)
            .filter_map(|c| match (c.wave.start_intensity, c.wave.end_intensity) {
                (Some(start), Some(end)) => {
                    Some(f64::from(start.value()) - f64::from(end.value()))
                }
                _ => None,
            })
            .collect();
        let avg_intensity_delta = mean(&intensity_deltas);

        let mut action_type_distribution: BTreeMap<ActionType, usize> = BTreeMap::new();
        for chain in archive.iter().filter(|c| c.sword.locked) {
            *action_type_distribution
                .entry(chain.sword.action_type)
                .or_insert(0) += 1;
        }

        let completed = archive.iter().filter(|c| c.is_complete()).count();
        let completion_ratio = completed as f64 / archive.len() as f64;

        let recent_start = archive.len().saturating_sub(RECENT_TIMELINE_LEN);
        let recent_chains = archive[recent_start..]
            .iter()
            .map(|chain| TimelineEntry {
                id: chain.id.clone(),
                date: chain.start_date,
                context: chain.mirror.context.category,
                completed: chain.is_complete(),
            })
            .collect();

        Some(Self {
            total_chains: archive.len(),
            context_frequency,
            avg_unsupported_narrative_ratio,
            wave_capacity,
            avg_intensity_delta,
            action_type_distribution,
            completion_ratio,
            recent_chains,
        })
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}
