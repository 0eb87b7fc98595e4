//! Mirror mutators — the observation anchor.

use chrono::Utc;

use immanence_types::{ChainState, ContextCategory, LlmVerdict, ValidationStatus};

use super::{ChainEngine, MutationOutcome};

/// One field write against the unlocked Mirror stage.
///
/// Explicit variants instead of a dynamic `(field, value)` pair: an unknown
/// field name is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorUpdate {
    Actor(String),
    Action(String),
    Recipient(String),
    ContextDate(String),
    ContextTime(String),
    ContextLocation(String),
    ContextCategory(ContextCategory),
}

impl ChainEngine {
    /// Record one Mirror component while the stage is unlocked.
    pub fn update_mirror(&mut self, update: MirrorUpdate) -> MutationOutcome {
        self.mutate(|chain| {
            if chain.mirror.locked {
                return MutationOutcome::StageSealed;
            }
            let mirror = &mut chain.mirror;
            match update {
                MirrorUpdate::Actor(value) => mirror.actor = value,
                MirrorUpdate::Action(value) => mirror.action = value,
                MirrorUpdate::Recipient(value) => mirror.recipient = value,
                MirrorUpdate::ContextDate(value) => mirror.context.date = value,
                MirrorUpdate::ContextTime(value) => mirror.context.time = value,
                MirrorUpdate::ContextLocation(value) => mirror.context.location = value,
                MirrorUpdate::ContextCategory(value) => mirror.context.category = value,
            }
            MutationOutcome::Applied
        })
    }

    /// Lock the observation anchor. Irreversible.
    ///
    /// Stores the user-confirmed sentence and whatever word-list warnings
    /// were outstanding — warnings never block the lock — and advances the
    /// chain to `MirrorLocked`.
    pub fn lock_mirror(
        &mut self,
        neutral_sentence: impl Into<String>,
        warnings: Vec<String>,
    ) -> MutationOutcome {
        let neutral_sentence = neutral_sentence.into();
        self.mutate(|chain| {
            if chain.mirror.locked {
                return MutationOutcome::StageSealed;
            }
            chain.state = ChainState::MirrorLocked;
            chain.mirror.locked = true;
            chain.mirror.locked_at = Some(Utc::now());
            chain.mirror.neutral_sentence = neutral_sentence;
            chain.mirror.validation_warnings = warnings;
            MutationOutcome::Applied
        })
    }

    /// Record the outcome of the externally-performed semantic check.
    ///
    /// Purely a cache write — the engine never performs, blocks on, or
    /// retries the validation itself.
    pub fn set_mirror_llm_validation(
        &mut self,
        status: ValidationStatus,
        result: Option<LlmVerdict>,
    ) -> MutationOutcome {
        self.mutate(|chain| {
            if chain.mirror.locked {
                return MutationOutcome::StageSealed;
            }
            chain.mirror.llm_validation.status = status;
            chain.mirror.llm_validation.result = result;
            chain.mirror.llm_validation.last_attempt = Some(Utc::now());
            MutationOutcome::Applied
        })
    }
}

#[cfg(test)]
mod tests {
    use immanence_types::{
        ChainState, ContextCategory, LlmVerdict, Stage, ValidationStatus,
    };

    use crate::engine::{ChainEngine, MutationOutcome};
    use crate::persistence::MemoryStore;

    use super::MirrorUpdate;

    fn engine_with_chain() -> ChainEngine {
        let mut engine = ChainEngine::new(Box::new(MemoryStore::new()));
        engine.start_new_chain();
        engine
    }

    #[test]
    fn field_updates_land_in_the_record() {
        let mut engine = engine_with_chain();
        assert!(engine.update_mirror(MirrorUpdate::Actor("Alex".into())).applied());
        assert!(
            engine
                .update_mirror(MirrorUpdate::Action("sent the email".into()))
                .applied()
        );
        assert!(
            engine
                .update_mirror(MirrorUpdate::ContextCategory(ContextCategory::Workplace))
                .applied()
        );

        let mirror = &engine.active_chain().expect("active").mirror;
        assert_eq!(mirror.actor, "Alex");
        assert_eq!(mirror.action, "sent the email");
        assert_eq!(mirror.context.category, ContextCategory::Workplace);
    }

    #[test]
    fn lock_stamps_sentence_warnings_and_state() {
        let mut engine = engine_with_chain();
        let outcome = engine.lock_mirror(
            "At 9am, Alex sent the email.",
            vec!["action: \"obviously\" (subjective)".to_owned()],
        );
        assert!(outcome.applied());

        let chain = engine.active_chain().expect("active");
        assert_eq!(chain.state, ChainState::MirrorLocked);
        assert!(chain.mirror.locked);
        assert!(chain.mirror.locked_at.is_some());
        assert_eq!(chain.mirror.neutral_sentence, "At 9am, Alex sent the email.");
        assert_eq!(chain.mirror.validation_warnings.len(), 1);

        assert!(engine.is_stage_accessible(Stage::Prism));
        assert!(!engine.is_stage_accessible(Stage::Mirror));
    }

    #[test]
    fn writes_after_lock_are_sealed() {
        let mut engine = engine_with_chain();
        let _ = engine.lock_mirror("x.", vec![]);

        assert_eq!(
            engine.update_mirror(MirrorUpdate::Actor("late edit".into())),
            MutationOutcome::StageSealed
        );
        assert_eq!(engine.lock_mirror("y.", vec![]), MutationOutcome::StageSealed);
        assert_eq!(
            engine.active_chain().expect("active").mirror.actor,
            "",
            "sealed write must not land"
        );
    }

    #[test]
    fn llm_validation_is_a_cache_write() {
        let mut engine = engine_with_chain();
        let verdict = LlmVerdict {
            verdict: "clean".to_owned(),
            issues: vec![],
            overall_note: "Reads like a camera.".to_owned(),
        };
        assert!(
            engine
                .set_mirror_llm_validation(ValidationStatus::Success, Some(verdict))
                .applied()
        );

        let validation = &engine.active_chain().expect("active").mirror.llm_validation;
        assert_eq!(validation.status, ValidationStatus::Success);
        assert!(validation.result.is_some());
        assert!(validation.last_attempt.is_some());
    }
}
