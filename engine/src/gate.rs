//! Stage gate — linear progression enforcement.
//!
//! Pure queries over the current active chain record. These functions are
//! the entire enforcement mechanism for the chain's design contract: ground
//! before you interpret, interpret (or consciously skip) before you feel,
//! metabolize (or abort/skip) before you commit.
//!
//! Accessibility is re-derived exclusively from stage terminal flags, never
//! from navigation history, so reloading persisted state reconstructs the
//! same permitted stage deterministically.

use immanence_types::{ChainRecord, Stage};

/// Whether `stage` may be entered given the current active chain.
///
/// With no active chain only Mirror is enterable (entering it starts a new
/// chain upstream).
#[must_use]
pub fn stage_accessible(chain: Option<&ChainRecord>, stage: Stage) -> bool {
    let Some(chain) = chain else {
        return stage == Stage::Mirror;
    };

    match stage {
        Stage::Mirror => !chain.mirror.locked,
        Stage::Prism => chain.mirror.locked && !chain.prism.is_terminal(),
        Stage::Wave => chain.prism.is_terminal() && !chain.wave.is_terminal(),
        Stage::Sword => chain.wave.is_terminal() && !chain.sword.locked,
    }
}

/// Whether `stage` may be deliberately bypassed.
///
/// Only Prism and Wave are skippable, and only once Mirror is locked.
/// Mirror is the mandatory anchor; Sword is the mandatory terminal
/// commitment.
#[must_use]
pub fn stage_skippable(chain: Option<&ChainRecord>, stage: Stage) -> bool {
    let Some(chain) = chain else {
        return false;
    };
    chain.mirror.locked && matches!(stage, Stage::Prism | Stage::Wave)
}
