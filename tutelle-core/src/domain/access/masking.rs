// tutelle-core/src/domain/access/masking.rs

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskingStrategy {
    /// Replaced by the configured mask token.
    Redact,
    Nullify,
    /// First two characters kept.
    Partial,
    MaskEmail,
}

impl MaskingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Redact => "redact",
            Self::Nullify => "nullify",
            Self::Partial => "partial",
            Self::MaskEmail => "mask_email",
        }
    }
}

impl FromStr for MaskingStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "redact" => Ok(Self::Redact),
            "nullify" => Ok(Self::Nullify),
            "partial" => Ok(Self::Partial),
            "mask_email" => Ok(Self::MaskEmail),
            _ => Err(format!("Unknown masking strategy: {}", s)),
        }
    }
}

impl std::fmt::Display for MaskingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
