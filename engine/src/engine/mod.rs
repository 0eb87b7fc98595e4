//! The chain progression engine.
//!
//! [`ChainEngine`] owns the single active-chain slot and the append-only
//! archive, and is the only writer for either. UI layers call the gate
//! queries to decide what to render, the stage mutators to record input,
//! and the lifecycle operations to finalize a chain.
//!
//! Every mutator is synchronous and runs to completion; state transitions
//! are whole-object replacement, so callers never observe a partially
//! updated chain. Persistence is fire-and-forget after each applied
//! mutation — a failed save is logged and never rolls back memory.

mod mirror;
mod prism;
mod sword;
mod wave;

pub use mirror::MirrorUpdate;
pub use prism::InterpretationUpdate;
pub use sword::SwordUpdate;
pub use wave::WaveUpdate;

use chrono::Utc;

use immanence_types::{ChainId, ChainRecord, ChainState, Stage};

use crate::config::ImmanenceConfig;
use crate::gate;
use crate::persistence::{ChainStore, PersistedChains};
use crate::stats::PatternStats;

/// What a mutator did with the call.
///
/// Mutators never fail loudly: with no active chain or a sealed stage they
/// leave state untouched and say so. Invalid calls are expected to be
/// prevented upstream (buttons disabled by the gate queries); the outcome
/// exists so misbehaving callers are observable rather than silently
/// absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "mutators report whether the call changed anything"]
pub enum MutationOutcome {
    /// State changed and a save was scheduled.
    Applied,
    /// No chain is active; nothing to mutate.
    NoActiveChain,
    /// The targeted stage already reached a terminal sub-state.
    StageSealed,
    /// The targeted entry id does not exist in the active chain.
    NotFound,
}

impl MutationOutcome {
    #[must_use]
    pub const fn applied(self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

/// Tunables injected at construction.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    /// Ride-timer duration seeded into new Wave stage records, in seconds.
    pub default_timer_secs: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            default_timer_secs: immanence_types::WaveStage::DEFAULT_TIMER_SECS,
        }
    }
}

impl From<&ImmanenceConfig> for EngineOptions {
    fn from(config: &ImmanenceConfig) -> Self {
        Self {
            default_timer_secs: config.default_timer_secs(),
        }
    }
}

/// Owner of the chain lifecycle: the one mutable in-progress chain and the
/// archive of finished ones.
pub struct ChainEngine {
    store: Box<dyn ChainStore>,
    options: EngineOptions,
    active: Option<ChainRecord>,
    archive: Vec<ChainRecord>,
}

impl ChainEngine {
    /// Build an engine over the injected store with default options.
    ///
    /// Loads persisted state eagerly. A snapshot with an unknown version or
    /// an unreadable file is logged and treated as empty — the engine never
    /// guesses at a foreign schema.
    pub fn new(store: Box<dyn ChainStore>) -> Self {
        Self::with_options(store, EngineOptions::default())
    }

    pub fn with_options(mut store: Box<dyn ChainStore>, options: EngineOptions) -> Self {
        let (active, archive) = match store.load() {
            Ok(Some(state)) if state.is_compatible() => {
                (state.active_chain, state.completed_chains)
            }
            Ok(Some(state)) => {
                tracing::warn!(
                    version = state.version,
                    "Persisted chain state has an unsupported version; starting fresh"
                );
                (None, Vec::new())
            }
            Ok(None) => (None, Vec::new()),
            Err(e) => {
                tracing::warn!("Failed to load persisted chain state: {e}");
                (None, Vec::new())
            }
        };

        Self {
            store,
            options,
            active,
            archive,
        }
    }

    // ── Lifecycle ────────────────────────────────────────────

    /// Start a fresh chain and install it as the active one.
    ///
    /// Calling this while a chain is already active silently replaces it —
    /// the at-most-one-active-chain policy, not an error. The replaced
    /// chain is discarded without archival.
    pub fn start_new_chain(&mut self) -> ChainId {
        let id = ChainId::generate();
        let mut chain = ChainRecord::new(id.clone(), Utc::now());
        chain.state = ChainState::MirrorActive;
        chain.wave.timer_duration = self.options.default_timer_secs;

        if self.active.is_some() {
            tracing::debug!(id = %id, "Replacing active chain with a fresh one");
        }
        self.active = Some(chain);
        self.autosave();
        id
    }

    /// Drop the active chain.
    ///
    /// A chain with a locked Mirror carries real data: it is archived with
    /// `end_date` stamped and the abandoned marker set. An un-anchored
    /// chain is discarded outright.
    pub fn abandon_chain(&mut self) {
        let Some(mut chain) = self.active.take() else {
            return;
        };
        if chain.mirror.locked {
            chain.end_date = Some(Utc::now());
            chain.abandoned = true;
            tracing::debug!(id = %chain.id, "Archiving abandoned chain");
            self.archive.push(chain);
        } else {
            tracing::debug!(id = %chain.id, "Discarding un-anchored chain");
        }
        self.autosave();
    }

    /// Destructive reset: archive and active slot both cleared. Test/dev
    /// use only.
    pub fn clear_all_chains(&mut self) {
        self.active = None;
        self.archive.clear();
        self.autosave();
    }

    // ── Queries ──────────────────────────────────────────────

    /// Whether a chain is currently in progress. Collaborators (the
    /// Harmony mode-check) read this instead of reaching into engine
    /// state.
    #[must_use]
    pub fn has_active_chain(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn active_chain(&self) -> Option<&ChainRecord> {
        self.active.as_ref()
    }

    /// The append-only archive, oldest first.
    #[must_use]
    pub fn archive(&self) -> &[ChainRecord] {
        &self.archive
    }

    /// Whether `stage` may be entered right now. See [`gate`].
    #[must_use]
    pub fn is_stage_accessible(&self, stage: Stage) -> bool {
        gate::stage_accessible(self.active.as_ref(), stage)
    }

    /// Whether `stage` may be deliberately bypassed right now.
    #[must_use]
    pub fn can_skip_stage(&self, stage: Stage) -> bool {
        gate::stage_skippable(self.active.as_ref(), stage)
    }

    /// Aggregate statistics over the archive; `None` while it is empty.
    #[must_use]
    pub fn pattern_stats(&self) -> Option<PatternStats> {
        PatternStats::compute(&self.archive)
    }

    // ── Internals ────────────────────────────────────────────

    /// Run a mutation against the active chain, persisting on success.
    fn mutate<F>(&mut self, f: F) -> MutationOutcome
    where
        F: FnOnce(&mut ChainRecord) -> MutationOutcome,
    {
        let outcome = match self.active.as_mut() {
            None => MutationOutcome::NoActiveChain,
            Some(chain) => f(chain),
        };
        if outcome.applied() {
            self.autosave();
        }
        outcome
    }

    /// Fire-and-forget persistence. Failures are logged; in-memory state is
    /// never rolled back.
    fn autosave(&mut self) {
        let snapshot = PersistedChains::new(self.active.clone(), self.archive.clone());
        if let Err(e) = self.store.save(&snapshot) {
            tracing::warn!("Failed to persist chain state: {e}");
        }
    }
}

impl std::fmt::Debug for ChainEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainEngine")
            .field("active", &self.active.as_ref().map(|c| c.id.as_str()))
            .field("archive_len", &self.archive.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use immanence_types::{ChainState, Stage};

    use crate::persistence::{ChainStore, MemoryStore, PersistedChains};

    use super::{ChainEngine, EngineOptions, MutationOutcome};

    fn engine() -> ChainEngine {
        ChainEngine::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn starts_empty_without_persisted_state() {
        let engine = engine();
        assert!(!engine.has_active_chain());
        assert!(engine.archive().is_empty());
        assert!(engine.pattern_stats().is_none());
    }

    #[test]
    fn start_new_chain_installs_active_mirror() {
        let mut engine = engine();
        let id = engine.start_new_chain();
        let chain = engine.active_chain().expect("active");
        assert_eq!(chain.id, id);
        assert_eq!(chain.state, ChainState::MirrorActive);
        assert!(engine.has_active_chain());
    }

    #[test]
    fn starting_again_replaces_without_archiving() {
        let mut engine = engine();
        let first = engine.start_new_chain();
        let second = engine.start_new_chain();
        assert_ne!(first, second);
        assert_eq!(engine.active_chain().map(|c| c.id.clone()), Some(second));
        assert!(engine.archive().is_empty());
    }

    #[test]
    fn abandon_before_mirror_lock_discards() {
        let mut engine = engine();
        engine.start_new_chain();
        engine.abandon_chain();
        assert!(!engine.has_active_chain());
        assert!(engine.archive().is_empty());
    }

    #[test]
    fn abandon_after_mirror_lock_archives_with_marker() {
        let mut engine = engine();
        engine.start_new_chain();
        assert!(engine.lock_mirror("Alex sent the email.", vec![]).applied());
        engine.abandon_chain();

        assert!(!engine.has_active_chain());
        let archived = &engine.archive()[0];
        assert!(archived.abandoned);
        assert!(archived.end_date.is_some());
        assert!(!archived.is_complete());
    }

    #[test]
    fn abandon_with_no_active_chain_is_a_noop() {
        let mut engine = engine();
        engine.abandon_chain();
        assert!(engine.archive().is_empty());
    }

    #[test]
    fn clear_all_chains_wipes_everything() {
        let mut engine = engine();
        engine.start_new_chain();
        let _ = engine.lock_mirror("x.", vec![]);
        engine.abandon_chain();
        engine.start_new_chain();

        engine.clear_all_chains();
        assert!(!engine.has_active_chain());
        assert!(engine.archive().is_empty());
    }

    #[test]
    fn mutators_noop_without_active_chain() {
        let mut engine = engine();
        assert_eq!(
            engine.lock_mirror("x.", vec![]),
            MutationOutcome::NoActiveChain
        );
        assert_eq!(engine.lock_prism(), MutationOutcome::NoActiveChain);
        assert_eq!(engine.lock_wave(), MutationOutcome::NoActiveChain);
        assert_eq!(engine.lock_sword(), MutationOutcome::NoActiveChain);
    }

    #[test]
    fn engine_restores_state_from_seeded_store() {
        let mut seed_engine = ChainEngine::new(Box::new(MemoryStore::new()));
        seed_engine.start_new_chain();
        let _ = seed_engine.lock_mirror("Alex sent the email.", vec![]);

        // Rebuild from what the first engine persisted.
        let mut carrier = MemoryStore::new();
        let snapshot = PersistedChains::new(
            seed_engine.active_chain().cloned(),
            seed_engine.archive().to_vec(),
        );
        carrier.save(&snapshot).expect("save");

        let restored = ChainEngine::new(Box::new(carrier));
        assert!(restored.has_active_chain());
        assert!(restored.is_stage_accessible(Stage::Prism));
        assert!(!restored.is_stage_accessible(Stage::Mirror));
    }

    #[test]
    fn incompatible_version_starts_fresh() {
        let stale = PersistedChains {
            version: 7,
            ..Default::default()
        };
        let engine = ChainEngine::new(Box::new(MemoryStore::seeded(stale)));
        assert!(!engine.has_active_chain());
        assert!(engine.archive().is_empty());
    }

    #[test]
    fn options_seed_wave_timer() {
        let mut engine = ChainEngine::with_options(
            Box::new(MemoryStore::new()),
            EngineOptions {
                default_timer_secs: 120,
            },
        );
        engine.start_new_chain();
        assert_eq!(engine.active_chain().expect("active").wave.timer_duration, 120);
    }
}
