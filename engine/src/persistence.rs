//! Durable store for the active chain and the archive.
//!
//! The persisted state is a single keyed, versioned record:
//!
//! ```json
//! { "version": 1, "activeChain": null, "completedChains": [] }
//! ```
//!
//! The engine writes through a [`ChainStore`] adapter injected at
//! construction, so the store can be a JSON file in production and an
//! in-memory slot in tests. Persistence is fire-and-forget: the engine never
//! waits on a save and never rolls back in-memory state when one fails.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use immanence_types::ChainRecord;

/// The durable snapshot of engine state.
///
/// # Version Compatibility
///
/// The `version` field enables forward migration. A snapshot with an
/// unknown version is treated as requiring migration: the engine refuses to
/// interpret it and starts fresh rather than guessing at the schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedChains {
    /// Schema version for forward compatibility.
    #[serde(default)]
    pub version: u32,
    /// The single mutable in-progress chain, if any.
    #[serde(default)]
    pub active_chain: Option<ChainRecord>,
    /// Append-only archive of completed and abandoned chains.
    #[serde(default)]
    pub completed_chains: Vec<ChainRecord>,
}

impl PersistedChains {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    /// Storage key; also the file stem used by [`JsonFileStore`].
    pub const STORE_KEY: &'static str = "immanence-chains";

    #[must_use]
    pub fn new(active_chain: Option<ChainRecord>, completed_chains: Vec<ChainRecord>) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            active_chain,
            completed_chains,
        }
    }

    /// Check if this snapshot is readable by the current schema.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        self.version == Self::CURRENT_VERSION
    }
}

/// Persistence adapter owned by the engine.
///
/// `load` is called once at engine construction; `save` after every applied
/// mutation. Implementations must be synchronous — the engine's concurrency
/// model has no suspension points.
pub trait ChainStore {
    /// Read the persisted snapshot, `None` when nothing was ever saved.
    fn load(&mut self) -> anyhow::Result<Option<PersistedChains>>;

    /// Replace the persisted snapshot.
    fn save(&mut self, state: &PersistedChains) -> anyhow::Result<()>;
}

// ── JSON file store ──────────────────────────────────────────

/// File-backed store: `immanence-chains.json` under a data directory,
/// written atomically so a crash mid-save never corrupts the archive.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Store rooted at `dir`. Creates the directory lazily on first save.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir
                .as_ref()
                .join(format!("{}.json", PersistedChains::STORE_KEY)),
        }
    }

    /// The file this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChainStore for JsonFileStore {
    fn load(&mut self) -> anyhow::Result<Option<PersistedChains>> {
        immanence_utils::recover_bak_file(&self.path);
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)?;
        let state = serde_json::from_str(&raw)?;
        Ok(Some(state))
    }

    fn save(&mut self, state: &PersistedChains) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_vec_pretty(state)?;
        immanence_utils::atomic_write(&self.path, &raw)?;
        Ok(())
    }
}

// ── In-memory store ──────────────────────────────────────────

/// In-memory adapter for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Option<PersistedChains>,
    save_count: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing snapshot, as if it had been saved by
    /// a previous session.
    #[must_use]
    pub fn seeded(state: PersistedChains) -> Self {
        Self {
            state: Some(state),
            save_count: 0,
        }
    }

    /// Number of saves observed; lets tests assert fire-and-forget
    /// persistence actually fired.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl ChainStore for MemoryStore {
    fn load(&mut self) -> anyhow::Result<Option<PersistedChains>> {
        Ok(self.state.clone())
    }

    fn save(&mut self, state: &PersistedChains) -> anyhow::Result<()> {
        self.state = Some(state.clone());
        self.save_count += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::Utc;
    use immanence_types::{ChainId, ChainRecord};

    use super::{ChainStore, JsonFileStore, MemoryStore, PersistedChains};

    #[test]
    fn empty_dir_loads_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::new(dir.path());
        assert!(store.load().expect("load").is_none());
    }

    #[test]
    fn file_store_roundtrips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::new(dir.path());

        let chain = ChainRecord::new(ChainId::generate(), Utc::now());
        let state = PersistedChains::new(Some(chain.clone()), vec![]);
        store.save(&state).expect("save");

        let loaded = store.load().expect("load").expect("some");
        assert!(loaded.is_compatible());
        assert_eq!(loaded.active_chain.as_ref().map(|c| &c.id), Some(&chain.id));
        assert!(loaded.completed_chains.is_empty());
    }

    #[test]
    fn file_store_writes_wire_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::new(dir.path());
        store
            .save(&PersistedChains::new(None, vec![]))
            .expect("save");

        let raw = fs::read_to_string(store.path()).expect("read");
        assert!(raw.contains("\"activeChain\""));
        assert!(raw.contains("\"completedChains\""));
        assert!(raw.contains("\"version\": 1"));
    }

    #[test]
    fn corrupt_file_is_an_error_not_a_panic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = JsonFileStore::new(dir.path());
        fs::write(store.path(), b"not json").expect("write");
        assert!(store.load().is_err());
    }

    #[test]
    fn version_mismatch_is_detected() {
        let state = PersistedChains {
            version: 99,
            ..Default::default()
        };
        assert!(!state.is_compatible());
    }

    #[test]
    fn memory_store_counts_saves() {
        let mut store = MemoryStore::new();
        assert!(store.load().expect("load").is_none());

        store
            .save(&PersistedChains::new(None, vec![]))
            .expect("save");
        store
            .save(&PersistedChains::new(None, vec![]))
            .expect("save");
        assert_eq!(store.save_count(), 2);
        assert!(store.load().expect("load").is_some());
    }
}
