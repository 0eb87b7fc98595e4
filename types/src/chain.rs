//! Chain and stage records.
//!
//! A chain is one pass through the four-stage reflection workflow:
//! Mirror (observation) → Prism (separation) → Wave (capacity) → Sword
//! (commitment). Each stage record starts empty when its chain is created,
//! is mutated field-by-field while active, and becomes immutable once it
//! reaches a terminal sub-state (locked, skipped, or aborted).
//!
//! These are pure data types. Lifecycle rules — who may mutate what, and
//! when — are enforced by the engine crate, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{ChainId, ImpulseId, InterpretationId};

// ── Stage tags ───────────────────────────────────────────────

/// One of the four modes, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Mirror,
    Prism,
    Wave,
    Sword,
}

impl Stage {
    /// The linear sequence the chain enforces.
    pub const SEQUENCE: [Stage; 4] = [Stage::Mirror, Stage::Prism, Stage::Wave, Stage::Sword];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Mirror => "mirror",
            Stage::Prism => "prism",
            Stage::Wave => "wave",
            Stage::Sword => "sword",
        }
    }

    /// Parse a stage tag. Unknown tags yield `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mirror" => Some(Stage::Mirror),
            "prism" => Some(Stage::Prism),
            "wave" => Some(Stage::Wave),
            "sword" => Some(Stage::Sword),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Chain-level lifecycle tag.
///
/// Progression is strictly forward:
/// `NotStarted → MirrorActive → MirrorLocked → (PrismLocked | PrismSkipped)
/// → (WaveLocked | WaveSkipped | WaveAborted) → ChainComplete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainState {
    #[default]
    NotStarted,
    MirrorActive,
    MirrorLocked,
    PrismLocked,
    PrismSkipped,
    WaveLocked,
    WaveSkipped,
    WaveAborted,
    ChainComplete,
}

impl ChainState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ChainState::NotStarted => "not_started",
            ChainState::MirrorActive => "mirror_active",
            ChainState::MirrorLocked => "mirror_locked",
            ChainState::PrismLocked => "prism_locked",
            ChainState::PrismSkipped => "prism_skipped",
            ChainState::WaveLocked => "wave_locked",
            ChainState::WaveSkipped => "wave_skipped",
            ChainState::WaveAborted => "wave_aborted",
            ChainState::ChainComplete => "chain_complete",
        }
    }
}

// ── Shared vocabulary ────────────────────────────────────────

/// Context bucket recorded in Mirror and aggregated by pattern review.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContextCategory {
    Workplace,
    Home,
    Relationship,
    Family,
    Digital,
    Public,
    /// Self-directed.
    Internal,
    #[default]
    Other,
}

impl ContextCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ContextCategory::Workplace => "workplace",
            ContextCategory::Home => "home",
            ContextCategory::Relationship => "relationship",
            ContextCategory::Family => "family",
            ContextCategory::Digital => "digital",
            ContextCategory::Public => "public",
            ContextCategory::Internal => "internal",
            ContextCategory::Other => "other",
        }
    }
}

/// The shape of a Sword commitment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// "I will do X."
    #[default]
    Action,
    /// "I will not do X."
    Restraint,
    /// Conscious non-action.
    NonAction,
}

impl ActionType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ActionType::Action => "action",
            ActionType::Restraint => "restraint",
            ActionType::NonAction => "non_action",
        }
    }
}

/// Category assigned to a Prism interpretation.
///
/// `Narrative` is the tag every new interpretation starts with; the finer
/// buckets are assigned during categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpretationCategory {
    #[default]
    Narrative,
    FuturePrediction,
    Causality,
    NarrativeSelf,
    NarrativeOther,
    Judgment,
    Other,
}

/// Whether the locked Mirror sentence supports an interpretation.
///
/// Replaces a nullable boolean: `Uncategorized` entries count toward
/// neither tally when the Prism ratio is derived at lock time. The wire
/// format stays `true | false | null` for compatibility with persisted
/// records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Support {
    Supported,
    Unsupported,
    #[default]
    Uncategorized,
}

impl Support {
    #[must_use]
    pub const fn from_flag(flag: Option<bool>) -> Self {
        match flag {
            Some(true) => Support::Supported,
            Some(false) => Support::Unsupported,
            None => Support::Uncategorized,
        }
    }

    #[must_use]
    pub const fn as_flag(self) -> Option<bool> {
        match self {
            Support::Supported => Some(true),
            Support::Unsupported => Some(false),
            Support::Uncategorized => None,
        }
    }
}

impl Serialize for Support {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.as_flag().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Support {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Ok(Self::from_flag(Option::<bool>::deserialize(deserializer)?))
    }
}

/// Emotional intensity on the 1–10 scale. Out-of-range values are
/// unrepresentable; deserialization validates on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Intensity(u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("intensity must be between 1 and 10 (got {0})")]
pub struct IntensityError(pub u8);

impl Intensity {
    pub fn try_new(value: u8) -> Result<Self, IntensityError> {
        if (1..=10).contains(&value) {
            Ok(Self(value))
        } else {
            Err(IntensityError(value))
        }
    }

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Intensity {
    type Error = IntensityError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Intensity> for u8 {
    fn from(value: Intensity) -> Self {
        value.0
    }
}

// ── Mirror ───────────────────────────────────────────────────

/// Where and when the observed event took place. Free-text except the
/// category bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorContext {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub category: ContextCategory,
}

/// Status of the externally-performed semantic validation of the Mirror
/// sentence. The engine records outcomes; it never performs the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    #[default]
    Idle,
    Validating,
    Success,
    Error,
    Skipped,
}

/// One issue surfaced by the external validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmIssue {
    pub quote: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub suggestion: String,
}

/// The external validator's last result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmVerdict {
    pub verdict: String,
    #[serde(default)]
    pub issues: Vec<LlmIssue>,
    #[serde(default)]
    pub overall_note: String,
}

/// Cache of the most recent external validation attempt. Never consulted
/// by gating — purely informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmValidation {
    #[serde(default)]
    pub status: ValidationStatus,
    #[serde(default)]
    pub result: Option<LlmVerdict>,
    #[serde(default)]
    pub last_attempt: Option<DateTime<Utc>>,
}

/// The observation anchor. Mirror has no skip or abort path: the chain
/// either locks a neutral sentence here or never accrues data at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MirrorStage {
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub context: MirrorContext,
    #[serde(default)]
    pub actor: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub neutral_sentence: String,
    #[serde(default)]
    pub validation_warnings: Vec<String>,
    #[serde(default)]
    pub llm_validation: LlmValidation,
}

impl MirrorStage {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.locked
    }
}

// ── Prism ────────────────────────────────────────────────────

/// One thought recorded during separation, categorized against the locked
/// Mirror sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interpretation {
    pub id: InterpretationId,
    pub text: String,
    #[serde(default)]
    pub category: InterpretationCategory,
    #[serde(default)]
    pub is_supported: Support,
    #[serde(default)]
    pub evidence_note: String,
}

impl Interpretation {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: InterpretationId::generate(),
            text: text.into(),
            category: InterpretationCategory::Narrative,
            is_supported: Support::Uncategorized,
            evidence_note: String::new(),
        }
    }
}

/// Fact/narrative separation. The counts and ratio are derived once, at
/// lock time, and frozen thereafter; a skipped Prism carries none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrismStage {
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub interpretations: Vec<Interpretation>,
    #[serde(default)]
    pub supported_count: usize,
    #[serde(default)]
    pub unsupported_count: usize,
    #[serde(default)]
    pub supported_ratio: f64,
}

impl PrismStage {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.locked || self.skipped
    }
}

// ── Wave ─────────────────────────────────────────────────────

/// An urge noted while riding the intensity, and whether it was acted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Impulse {
    pub id: ImpulseId,
    pub text: String,
    #[serde(default)]
    pub acted_on: bool,
}

impl Impulse {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: ImpulseId::generate(),
            text: text.into(),
            acted_on: false,
        }
    }
}

const fn default_timer_secs() -> u32 {
    WaveStage::DEFAULT_TIMER_SECS
}

/// Emotional-capacity timing. Three terminal outcomes: locked (rode it
/// out), skipped (deliberate bypass), aborted (capacity exceeded).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaveStage {
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub aborted: bool,
    #[serde(default)]
    pub locked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub emotions: Vec<String>,
    #[serde(default)]
    pub somatic_location: String,
    #[serde(default)]
    pub impulses: Vec<Impulse>,
    #[serde(default = "default_timer_secs")]
    pub timer_duration: u32,
    #[serde(default)]
    pub start_intensity: Option<Intensity>,
    #[serde(default)]
    pub end_intensity: Option<Intensity>,
    #[serde(default)]
    pub impulses_acted_on: bool,
}

impl WaveStage {
    /// Default ride-timer duration in seconds.
    pub const DEFAULT_TIMER_SECS: u32 = 90;

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.locked || self.skipped || self.aborted
    }
}

impl Default for WaveStage {
    fn default() -> Self {
        Self {
            locked: false,
            skipped: false,
            aborted: false,
            locked_at: None,
            emotions: Vec::new(),
            somatic_location: String::new(),
            impulses: Vec::new(),
            timer_duration: Self::DEFAULT_TIMER_SECS,
            start_intensity: None,
            end_intensity: None,
            impulses_acted_on: false,
        }
    }
}

// ── Sword ────────────────────────────────────────────────────

/// The values-aligned commitment. Locking Sword completes the chain; it
/// can never be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwordStage {
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub locked_at: Option<DateTime<Utc>>,
    /// The principle at stake.
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub action_type: ActionType,
    #[serde(default)]
    pub action: String,
    /// What the commitment costs to keep.
    #[serde(default)]
    pub cost: String,
    #[serde(default)]
    pub obstacle: String,
    /// Deadline or duration.
    #[serde(default)]
    pub time_bound: String,
}

impl SwordStage {
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.locked
    }
}

// ── Chain record ─────────────────────────────────────────────

/// One complete reflection cycle: the four stage records plus chain-level
/// metadata. At most one record is active (mutable) at a time,
/// process-wide; everything else is an immutable archive entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainRecord {
    pub id: ChainId,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub state: ChainState,
    /// Set when the chain was archived via abandonment rather than a Sword
    /// lock.
    #[serde(default)]
    pub abandoned: bool,
    #[serde(default)]
    pub mirror: MirrorStage,
    #[serde(default)]
    pub prism: PrismStage,
    #[serde(default)]
    pub wave: WaveStage,
    #[serde(default)]
    pub sword: SwordStage,
}

impl ChainRecord {
    /// A fresh record with all four stages empty.
    #[must_use]
    pub fn new(id: ChainId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            start_date: started_at,
            end_date: None,
            state: ChainState::NotStarted,
            abandoned: false,
            mirror: MirrorStage::default(),
            prism: PrismStage::default(),
            wave: WaveStage::default(),
            sword: SwordStage::default(),
        }
    }

    /// Whether the chain reached full completion (Sword locked).
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.state == ChainState::ChainComplete
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{
        ChainId, ChainRecord, ChainState, Intensity, Interpretation, Stage, Support, WaveStage,
    };

    #[test]
    fn fresh_record_starts_empty() {
        let record = ChainRecord::new(ChainId::generate(), Utc::now());
        assert_eq!(record.state, ChainState::NotStarted);
        assert!(record.end_date.is_none());
        assert!(!record.abandoned);
        assert!(!record.mirror.locked);
        assert!(record.prism.interpretations.is_empty());
        assert_eq!(record.wave.timer_duration, WaveStage::DEFAULT_TIMER_SECS);
        assert!(!record.sword.locked);
    }

    #[test]
    fn intensity_bounds() {
        assert!(Intensity::try_new(0).is_err());
        assert!(Intensity::try_new(1).is_ok());
        assert!(Intensity::try_new(10).is_ok());
        assert!(Intensity::try_new(11).is_err());
    }

    #[test]
    fn intensity_deserialize_rejects_out_of_range() {
        let parsed: Result<Intensity, _> = serde_json::from_str("11");
        assert!(parsed.is_err());
        let parsed: Intensity = serde_json::from_str("7").unwrap();
        assert_eq!(parsed.value(), 7);
    }

    #[test]
    fn support_wire_format_is_nullable_bool() {
        assert_eq!(serde_json::to_string(&Support::Supported).unwrap(), "true");
        assert_eq!(
            serde_json::to_string(&Support::Unsupported).unwrap(),
            "false"
        );
        assert_eq!(
            serde_json::to_string(&Support::Uncategorized).unwrap(),
            "null"
        );
    }

    #[test]
    fn interpretation_starts_uncategorized_narrative() {
        let interp = Interpretation::new("they must be angry with me");
        assert_eq!(interp.is_supported, Support::Uncategorized);
        assert_eq!(
            interp.category,
            super::InterpretationCategory::Narrative
        );
        assert!(interp.evidence_note.is_empty());
    }

    #[test]
    fn chain_state_tags_match_wire_format() {
        assert_eq!(
            serde_json::to_string(&ChainState::MirrorActive).unwrap(),
            "\"mirror_active\""
        );
        assert_eq!(
            serde_json::to_string(&ChainState::ChainComplete).unwrap(),
            "\"chain_complete\""
        );
    }

    #[test]
    fn stage_parse_roundtrips() {
        for stage in Stage::SEQUENCE {
            assert_eq!(Stage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::parse("harmony"), None);
    }

    #[test]
    fn record_wire_keys_are_camel_case() {
        let record = ChainRecord::new(ChainId::generate(), Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("startDate").is_some());
        assert!(json.get("endDate").is_some());
        let wave = json.get("wave").unwrap();
        assert!(wave.get("timerDuration").is_some());
        assert!(wave.get("impulsesActedOn").is_some());
        let mirror = json.get("mirror").unwrap();
        assert!(mirror.get("neutralSentence").is_some());
        assert!(mirror.get("validationWarnings").is_some());
    }

    #[test]
    fn record_roundtrips_through_json() {
        let mut record = ChainRecord::new(ChainId::generate(), Utc::now());
        record.state = ChainState::MirrorLocked;
        record.mirror.locked = true;
        record.mirror.neutral_sentence = "At 9am, Alex sent the email.".to_owned();
        record.prism.interpretations.push(Interpretation::new("x"));
        record.wave.start_intensity = Some(Intensity::try_new(8).unwrap());

        let json = serde_json::to_string(&record).unwrap();
        let restored: ChainRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, restored);
    }
}
