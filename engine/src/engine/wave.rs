//! Wave mutators — riding intensity without discharge.

use chrono::Utc;

use immanence_types::{ChainState, Impulse, ImpulseId, Intensity};

use super::{ChainEngine, MutationOutcome};

/// One field write against the unsealed Wave stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaveUpdate {
    SomaticLocation(String),
    /// Ride-timer duration in seconds.
    TimerDuration(u32),
    StartIntensity(Option<Intensity>),
    EndIntensity(Option<Intensity>),
}

impl ChainEngine {
    /// Record one Wave field while the stage is unsealed.
    pub fn update_wave(&mut self, update: WaveUpdate) -> MutationOutcome {
        self.mutate(|chain| {
            if chain.wave.is_terminal() {
                return MutationOutcome::StageSealed;
            }
            let wave = &mut chain.wave;
            match update {
                WaveUpdate::SomaticLocation(value) => wave.somatic_location = value,
                WaveUpdate::TimerDuration(value) => wave.timer_duration = value,
                WaveUpdate::StartIntensity(value) => wave.start_intensity = value,
                WaveUpdate::EndIntensity(value) => wave.end_intensity = value,
            }
            MutationOutcome::Applied
        })
    }

    /// Append an emotion label.
    ///
    /// Append-only and deliberately without engine-level dedupe — callers
    /// that want unique labels filter before calling.
    pub fn add_wave_emotion(&mut self, label: impl Into<String>) -> MutationOutcome {
        let label = label.into();
        self.mutate(|chain| {
            if chain.wave.is_terminal() {
                return MutationOutcome::StageSealed;
            }
            chain.wave.emotions.push(label);
            MutationOutcome::Applied
        })
    }

    /// Append an impulse and return its id. New impulses start not acted
    /// on. `None` when there is no active chain or Wave is terminal.
    pub fn add_wave_impulse(&mut self, text: impl Into<String>) -> Option<ImpulseId> {
        let text = text.into();
        let mut new_id = None;
        let _ = self.mutate(|chain| {
            if chain.wave.is_terminal() {
                return MutationOutcome::StageSealed;
            }
            let impulse = Impulse::new(text);
            new_id = Some(impulse.id.clone());
            chain.wave.impulses.push(impulse);
            MutationOutcome::Applied
        });
        new_id
    }

    /// Mark whether an impulse was acted on during the ride.
    pub fn set_impulse_acted_on(&mut self, id: &ImpulseId, acted_on: bool) -> MutationOutcome {
        self.mutate(|chain| {
            if chain.wave.is_terminal() {
                return MutationOutcome::StageSealed;
            }
            let Some(impulse) = chain.wave.impulses.iter_mut().find(|i| &i.id == id) else {
                return MutationOutcome::NotFound;
            };
            impulse.acted_on = acted_on;
            MutationOutcome::Applied
        })
    }

    /// Lock the ride: derives whether any impulse was acted on, stamps the
    /// timestamp, and advances the chain to `WaveLocked`.
    pub fn lock_wave(&mut self) -> MutationOutcome {
        self.mutate(|chain| {
            if chain.wave.is_terminal() {
                return MutationOutcome::StageSealed;
            }
            chain.state = ChainState::WaveLocked;
            chain.wave.locked = true;
            chain.wave.locked_at = Some(Utc::now());
            chain.wave.impulses_acted_on = chain.wave.impulses.iter().any(|i| i.acted_on);
            MutationOutcome::Applied
        })
    }

    /// Deliberate bypass of the ride.
    pub fn skip_wave(&mut self) -> MutationOutcome {
        self.mutate(|chain| {
            if chain.wave.is_terminal() {
                return MutationOutcome::StageSealed;
            }
            chain.state = ChainState::WaveSkipped;
            chain.wave.skipped = true;
            MutationOutcome::Applied
        })
    }

    /// Capacity-driven early termination. Distinct from skip semantically;
    /// both are equally terminal for gating.
    pub fn abort_wave(&mut self) -> MutationOutcome {
        self.mutate(|chain| {
            if chain.wave.is_terminal() {
                return MutationOutcome::StageSealed;
            }
            chain.state = ChainState::WaveAborted;
            chain.wave.aborted = true;
            chain.wave.locked_at = Some(Utc::now());
            MutationOutcome::Applied
        })
    }
}
