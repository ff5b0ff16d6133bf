// tutelle-core/src/domain/access/decision.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

use crate::domain::access::masking::MaskingStrategy;

/// Fields to remove and fields to mask for one redacted view.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RedactionPlan {
    /// Every sensitive field, masked ones included.
    pub strip: BTreeSet<String>,
    /// Subset of `strip` replaced by a masked value instead of removed.
    pub mask: BTreeMap<String, MaskingStrategy>,
}

impl RedactionPlan {
    pub fn strips(&self, field: &str) -> bool {
        self.strip.contains(field)
    }

    pub fn masking_for(&self, field: &str) -> Option<MaskingStrategy> {
        self.mask.get(field).copied()
    }
}

/// Outcome of evaluating one (principal, record) pair. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "plan", rename_all = "snake_case")]
pub enum AccessDecision {
    Denied,
    Redacted(RedactionPlan),
    FullAccess,
}

impl AccessDecision {
    pub fn kind(&self) -> DecisionKind {
        match self {
            Self::Denied => DecisionKind::Denied,
            Self::Redacted(_) => DecisionKind::Redacted,
            Self::FullAccess => DecisionKind::FullAccess,
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    FullAccess,
    Redacted,
    Denied,
}

impl DecisionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullAccess => "full_access",
            Self::Redacted => "redacted",
            Self::Denied => "denied",
        }
    }
}

impl fmt::Display for DecisionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub const NOT_AUTHORIZED: &str = "not_authorized";

/// Uniform denial payload. Carries nothing about which rule fired, whether
/// the record exists, or whether it is confidential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct AccessError {
    pub error: String,
    pub message: String,
}

impl AccessError {
    pub fn not_authorized() -> Self {
        Self {
            error: NOT_AUTHORIZED.to_string(),
            message: "Accès non autorisé.".to_string(),
        }
    }
}

impl Default for AccessError {
    fn default() -> Self {
        Self::not_authorized()
    }
}
