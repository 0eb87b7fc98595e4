//! Core domain types for Immanence.
//!
//! This crate contains pure domain types with no IO and no async: the chain
//! record and its four stage records, identifier newtypes, and the
//! neutral-observation text helpers. Lifecycle rules live in
//! `immanence-engine`; everything here can be used from any layer.

mod chain;
mod ids;
pub mod observation;

pub use chain::{
    ActionType, ChainRecord, ChainState, ContextCategory, Impulse, Intensity, IntensityError,
    Interpretation, InterpretationCategory, LlmIssue, LlmValidation, LlmVerdict, MirrorContext,
    MirrorStage, PrismStage, Stage, Support, SwordStage, ValidationStatus, WaveStage,
};
pub use ids::{ChainId, ImpulseId, InterpretationId};
