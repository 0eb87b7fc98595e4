//! Prism mutators — separating fact from narrative.

use chrono::Utc;

use immanence_types::{
    ChainState, Interpretation, InterpretationCategory, InterpretationId, Support,
};

use super::{ChainEngine, MutationOutcome};

/// Partial update merged into one interpretation. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct InterpretationUpdate {
    pub text: Option<String>,
    pub category: Option<InterpretationCategory>,
    pub is_supported: Option<Support>,
    pub evidence_note: Option<String>,
}

impl ChainEngine {
    /// Append a new interpretation and return its id.
    ///
    /// Starts as an uncategorized narrative with an empty evidence note.
    /// Duplicate text is allowed — repetition of a story is itself signal.
    /// `None` when there is no active chain or Prism is already terminal.
    pub fn add_interpretation(&mut self, text: impl Into<String>) -> Option<InterpretationId> {
        let text = text.into();
        let mut new_id = None;
        let _ = self.mutate(|chain| {
            if chain.prism.is_terminal() {
                return MutationOutcome::StageSealed;
            }
            let interpretation = Interpretation::new(text);
            new_id = Some(interpretation.id.clone());
            chain.prism.interpretations.push(interpretation);
            MutationOutcome::Applied
        });
        new_id
    }

    /// Merge a partial update into the matching interpretation.
    ///
    /// An unknown id leaves state untouched.
    pub fn update_interpretation(
        &mut self,
        id: &InterpretationId,
        update: InterpretationUpdate,
    ) -> MutationOutcome {
        self.mutate(|chain| {
            if chain.prism.is_terminal() {
                return MutationOutcome::StageSealed;
            }
            let Some(entry) = chain
                .prism
                .interpretations
                .iter_mut()
                .find(|i| &i.id == id)
            else {
                return MutationOutcome::NotFound;
            };
            if let Some(text) = update.text {
                entry.text = text;
            }
            if let Some(category) = update.category {
                entry.category = category;
            }
            if let Some(is_supported) = update.is_supported {
                entry.is_supported = is_supported;
            }
            if let Some(evidence_note) = update.evidence_note {
                entry.evidence_note = evidence_note;
            }
            MutationOutcome::Applied
        })
    }

    /// Lock the separation and freeze its derived tallies.
    ///
    /// Uncategorized entries count toward neither tally; the supported
    /// ratio is `0` when nothing was categorized.
    pub fn lock_prism(&mut self) -> MutationOutcome {
        self.mutate(|chain| {
            if chain.prism.is_terminal() {
                return MutationOutcome::StageSealed;
            }
            let supported = chain
                .prism
                .interpretations
                .iter()
                .filter(|i| i.is_supported == Support::Supported)
                .count();
            let unsupported = chain
                .prism
                .interpretations
                .iter()
                .filter(|i| i.is_supported == Support::Unsupported)
                .count();
            let total = supported + unsupported;

            chain.state = ChainState::PrismLocked;
            chain.prism.locked = true;
            chain.prism.locked_at = Some(Utc::now());
            chain.prism.supported_count = supported;
            chain.prism.unsupported_count = unsupported;
            chain.prism.supported_ratio = if total > 0 {
                supported as f64 / total as f64
            } else {
                0.0
            };
            MutationOutcome::Applied
        })
    }

    /// Deliberately bypass the separation. No tallies are derived for a
    /// skipped stage.
    pub fn skip_prism(&mut self) -> MutationOutcome {
        self.mutate(|chain| {
            if chain.prism.is_terminal() {
                return MutationOutcome::StageSealed;
            }
            chain.state = ChainState::PrismSkipped;
            chain.prism.skipped = true;
            MutationOutcome::Applied
        })
    }
}
