//! Chain progression engine for Immanence.
//!
//! Owns the lifecycle of a single reflection chain — Mirror → Prism → Wave
//! → Sword — enforcing strict linear stage-gating, and produces
//! longitudinal pattern statistics over the archive of finished chains.
//!
//! The engine is synchronous and single-threaded. It performs no network
//! calls and no semantic validation of its own: external validation (LLM
//! checks of the Mirror sentence) happens in collaborators, and only the
//! outcome is recorded here. Persistence goes through an injected
//! [`persistence::ChainStore`] adapter and is fire-and-forget.

mod engine;

pub mod config;
pub mod gate;
pub mod persistence;
pub mod stats;

pub use engine::{
    ChainEngine, EngineOptions, InterpretationUpdate, MirrorUpdate, MutationOutcome, SwordUpdate,
    WaveUpdate,
};
