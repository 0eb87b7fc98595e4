use std::fmt;

use uuid::Uuid;

/// Unique identifier for a chain. Assigned at creation, never reused.
///
/// Opaque string with no ordering contract beyond uniqueness. The `chain_`
/// prefix keeps persisted records greppable next to interpretation and
/// impulse ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("chain_{}", Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a Prism interpretation within a chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct InterpretationId(String);

impl InterpretationId {
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("interp_{}", Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterpretationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a Wave impulse within a chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ImpulseId(String);

impl ImpulseId {
    #[must_use]
    pub fn generate() -> Self {
        Self(format!("impulse_{}", Uuid::new_v4().simple()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImpulseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChainId, ImpulseId, InterpretationId};

    #[test]
    fn generated_ids_are_unique() {
        assert_ne!(ChainId::generate(), ChainId::generate());
        assert_ne!(InterpretationId::generate(), InterpretationId::generate());
        assert_ne!(ImpulseId::generate(), ImpulseId::generate());
    }

    #[test]
    fn id_prefixes_distinguish_kinds() {
        assert!(ChainId::generate().as_str().starts_with("chain_"));
        assert!(InterpretationId::generate().as_str().starts_with("interp_"));
        assert!(ImpulseId::generate().as_str().starts_with("impulse_"));
    }

    #[test]
    fn chain_id_serializes_transparently() {
        let id = ChainId::generate();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }
}
