//! Sword mutators — the values-aligned commitment and chain finalization.

use chrono::Utc;

use immanence_types::{ActionType, ChainState};

use super::{ChainEngine, MutationOutcome};

/// One field write against the unlocked Sword stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwordUpdate {
    /// The principle at stake.
    Value(String),
    ActionType(ActionType),
    Action(String),
    Cost(String),
    Obstacle(String),
    TimeBound(String),
}

impl ChainEngine {
    /// Record one Sword component while the stage is unlocked.
    pub fn update_sword(&mut self, update: SwordUpdate) -> MutationOutcome {
        self.mutate(|chain| {
            if chain.sword.locked {
                return MutationOutcome::StageSealed;
            }
            let sword = &mut chain.sword;
            match update {
                SwordUpdate::Value(value) => sword.value = value,
                SwordUpdate::ActionType(value) => sword.action_type = value,
                SwordUpdate::Action(value) => sword.action = value,
                SwordUpdate::Cost(value) => sword.cost = value,
                SwordUpdate::Obstacle(value) => sword.obstacle = value,
                SwordUpdate::TimeBound(value) => sword.time_bound = value,
            }
            MutationOutcome::Applied
        })
    }

    /// Lock the commitment and complete the chain.
    ///
    /// The only mutator that also finalizes: chain state becomes
    /// `ChainComplete`, the end date is stamped, and the record moves from
    /// the active slot into the archive in one step — there is no
    /// intermediate state where a chain is both complete and active.
    pub fn lock_sword(&mut self) -> MutationOutcome {
        let Some(mut chain) = self.active.take() else {
            return MutationOutcome::NoActiveChain;
        };
        if chain.sword.locked {
            self.active = Some(chain);
            return MutationOutcome::StageSealed;
        }

        let now = Utc::now();
        chain.state = ChainState::ChainComplete;
        chain.end_date = Some(now);
        chain.sword.locked = true;
        chain.sword.locked_at = Some(now);
        tracing::debug!(id = %chain.id, "Chain complete, moving to archive");
        self.archive.push(chain);
        self.autosave();
        MutationOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use immanence_types::{ActionType, ChainState, Stage};

    use crate::engine::{ChainEngine, MutationOutcome};
    use crate::persistence::MemoryStore;

    use super::SwordUpdate;

    fn engine_past_wave() -> ChainEngine {
        let mut engine = ChainEngine::new(Box::new(MemoryStore::new()));
        engine.start_new_chain();
        let _ = engine.lock_mirror("At 9am, Alex sent the email.", vec![]);
        let _ = engine.skip_prism();
        let _ = engine.skip_wave();
        engine
    }

    #[test]
    fn field_updates_land_in_the_record() {
        let mut engine = engine_past_wave();
        let _ = engine.update_sword(SwordUpdate::Value("honesty".into()));
        let _ = engine.update_sword(SwordUpdate::ActionType(ActionType::Restraint));
        let _ = engine.update_sword(SwordUpdate::TimeBound("before Friday".into()));

        let sword = &engine.active_chain().expect("active").sword;
        assert_eq!(sword.value, "honesty");
        assert_eq!(sword.action_type, ActionType::Restraint);
        assert_eq!(sword.time_bound, "before Friday");
    }

    #[test]
    fn lock_finalizes_into_the_archive_atomically() {
        let mut engine = engine_past_wave();
        assert!(engine.lock_sword().applied());

        assert!(!engine.has_active_chain(), "slot cleared");
        assert_eq!(engine.archive().len(), 1);
        let archived = &engine.archive()[0];
        assert_eq!(archived.state, ChainState::ChainComplete);
        assert!(archived.is_complete());
        assert!(archived.sword.locked);
        assert!(archived.sword.locked_at.is_some());
        assert!(archived.end_date.is_some());
        assert!(!archived.abandoned);
    }

    #[test]
    fn lock_without_active_chain_reports_it() {
        let mut engine = ChainEngine::new(Box::new(MemoryStore::new()));
        assert_eq!(engine.lock_sword(), MutationOutcome::NoActiveChain);
    }

    #[test]
    fn archive_grows_monotonically_across_chains() {
        let mut engine = engine_past_wave();
        let _ = engine.lock_sword();
        assert_eq!(engine.archive().len(), 1);

        engine.start_new_chain();
        let _ = engine.lock_mirror("Sam closed the door.", vec![]);
        let _ = engine.skip_prism();
        let _ = engine.skip_wave();
        let _ = engine.lock_sword();
        assert_eq!(engine.archive().len(), 2);

        // Ids never disappear from the archive.
        let first_id = engine.archive()[0].id.clone();
        assert!(engine.archive().iter().any(|c| c.id == first_id));
    }

    #[test]
    fn completed_chain_frees_the_gate_for_a_new_mirror() {
        let mut engine = engine_past_wave();
        let _ = engine.lock_sword();
        assert!(engine.is_stage_accessible(Stage::Mirror));
        assert!(!engine.is_stage_accessible(Stage::Sword));
    }
}
