//! Neutral-observation text helpers for the Mirror stage.
//!
//! Pure functions: word-list scanning for non-neutral language and the
//! neutral-sentence composition used at review time. Nothing here gates the
//! engine — a Mirror lock with outstanding warnings is permitted, and the
//! warnings travel with the lock.

use crate::chain::MirrorContext;

/// Forms of "to be" that invite identity statements ("he is selfish").
const E_PRIME_VIOLATIONS: &[&str] = &[
    "is", "am", "are", "was", "were", "be", "been", "being", "isn't", "aren't", "wasn't",
    "weren't", "i'm", "you're", "he's", "she's", "it's", "we're", "they're",
];

/// Subjective modifiers worth a soft warning, never a rejection.
const SUBJECTIVE_MODIFIERS: &[&str] = &[
    "angrily",
    "rudely",
    "aggressively",
    "purposefully",
    "deliberately",
    "clearly",
    "obviously",
    "apparently",
    "probably",
    "definitely",
    "always",
    "never",
    "constantly",
    "completely",
    "totally",
    "good",
    "bad",
    "wrong",
    "right",
    "stupid",
    "smart",
    "crazy",
];

/// Intent-attribution verbs. A camera cannot capture intent.
const INTENT_WORDS: &[&str] = &[
    "ignored",
    "dismissed",
    "rejected",
    "attacked",
    "manipulated",
    "pretended",
    "lied",
    "betrayed",
    "abandoned",
    "threatened",
    "insulted",
    "mocked",
    "sabotaged",
    "undermined",
];

/// Which Mirror component a scan targets. E-Prime and intent hits are hard
/// in the `Action` field (the core observation) and soft elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorField {
    Actor,
    Action,
    Recipient,
}

impl MirrorField {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MirrorField::Actor => "actor",
            MirrorField::Action => "action",
            MirrorField::Recipient => "recipient",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    EPrime,
    Intent,
    Subjective,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Blocks the lock button upstream.
    Hard,
    /// Surfaced as a warning; lock proceeds.
    Soft,
}

/// One flagged word in a Mirror component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub word: String,
    pub kind: ViolationKind,
    pub severity: Severity,
}

impl Violation {
    /// The warning line stored with a Mirror lock.
    #[must_use]
    pub fn describe(&self, field: MirrorField) -> String {
        let kind = match self.kind {
            ViolationKind::EPrime => "e_prime",
            ViolationKind::Intent => "intent",
            ViolationKind::Subjective => "subjective",
        };
        format!("{}: \"{}\" ({kind})", field.as_str(), self.word)
    }
}

/// Scan one Mirror component for non-neutral language.
///
/// Matching is whole-word against the lowercased text, mirroring the word
/// lists above; punctuation-attached words pass unflagged.
#[must_use]
pub fn scan_field(text: &str, field: MirrorField) -> Vec<Violation> {
    // E-Prime and intent hits only block in the core observation field.
    let field_severity = if field == MirrorField::Action {
        Severity::Hard
    } else {
        Severity::Soft
    };

    let lowered = text.to_lowercase();
    let mut violations = Vec::new();
    for word in lowered.split_whitespace() {
        if E_PRIME_VIOLATIONS.contains(&word) {
            violations.push(Violation {
                word: word.to_owned(),
                kind: ViolationKind::EPrime,
                severity: field_severity,
            });
        }
        if INTENT_WORDS.contains(&word) {
            violations.push(Violation {
                word: word.to_owned(),
                kind: ViolationKind::Intent,
                severity: field_severity,
            });
        }
        if SUBJECTIVE_MODIFIERS.contains(&word) {
            violations.push(Violation {
                word: word.to_owned(),
                kind: ViolationKind::Subjective,
                severity: Severity::Soft,
            });
        }
    }
    violations
}

/// Whether any violation in the set blocks a lock upstream.
#[must_use]
pub fn has_hard_violation(violations: &[Violation]) -> bool {
    violations.iter().any(|v| v.severity == Severity::Hard)
}

/// Compose the neutral sentence from its recorded components.
///
/// Missing actor or action are rendered as bracketed placeholders so a
/// partially-filled review screen still reads as a sentence.
#[must_use]
pub fn build_neutral_sentence(
    context: &MirrorContext,
    actor: &str,
    action: &str,
    recipient: &str,
) -> String {
    let mut parts = Vec::new();
    if !context.time.is_empty() {
        parts.push(format!("At {}", context.time));
    }
    if !context.date.is_empty() {
        parts.push(format!("on {}", context.date));
    }
    if !context.location.is_empty() {
        parts.push(format!("at {}", context.location));
    }

    let context_str = parts.join(", ");
    let actor_str = if actor.is_empty() { "[Actor]" } else { actor };
    let action_str = if action.is_empty() { "[Action]" } else { action };
    let recipient_str = if recipient.is_empty() {
        String::new()
    } else {
        format!(" {recipient}")
    };

    if context_str.is_empty() {
        format!("{actor_str} {action_str}{recipient_str}.")
    } else {
        format!("{context_str}, {actor_str} {action_str}{recipient_str}.")
    }
}
