// tutelle-core/src/domain/access/sensitivity.rs

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::access::configuration::SensitivityEntry;
use crate::domain::access::decision::RedactionPlan;
use crate::domain::access::entity::EntityType;
use crate::domain::access::masking::MaskingStrategy;
use crate::domain::access::record::OutputMapping;
use crate::domain::access::role::Role;
use crate::domain::error::DomainError;

/// A field name, or a `*` wildcard pattern compiled once at startup.
#[derive(Debug, Clone)]
pub enum FieldPattern {
    Exact(String),
    Wildcard { source: String, regex: Regex },
}

impl FieldPattern {
    pub fn parse(pattern: &str) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidFieldPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        };

        if pattern.is_empty() {
            return Err(invalid("empty pattern"));
        }
        if !pattern
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '*')
        {
            return Err(invalid("only lowercase letters, digits, '_' and '*' are allowed"));
        }
        if !pattern.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(invalid("pattern must name at least one letter"));
        }

        if !pattern.contains('*') {
            return Ok(Self::Exact(pattern.to_string()));
        }

        let regex = Regex::new(&format!("^{}$", pattern.replace('*', "[a-z0-9_]*")))
            .map_err(|e| invalid(&e.to_string()))?;
        Ok(Self::Wildcard {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, field: &str) -> bool {
        match self {
            Self::Exact(name) => name == field,
            Self::Wildcard { regex, .. } => regex.is_match(field),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact(name) => name,
            Self::Wildcard { source, .. } => source,
        }
    }
}

/// Compiled strip and mask rules for one (entity, role) pair.
#[derive(Debug, Clone, Default)]
pub struct FieldRules {
    strip: Vec<FieldPattern>,
    mask: BTreeMap<String, MaskingStrategy>,
}

impl FieldRules {
    pub fn compile(entry: &SensitivityEntry) -> Result<Self, DomainError> {
        let strip = entry
            .strip
            .iter()
            .map(|p| FieldPattern::parse(p))
            .collect::<Result<Vec<_>, _>>()?;

        for field in entry.mask.keys() {
            if !matches!(FieldPattern::parse(field)?, FieldPattern::Exact(_)) {
                return Err(DomainError::InvalidFieldPattern {
                    pattern: field.clone(),
                    reason: "masked fields must be exact names".to_string(),
                });
            }
        }

        Ok(Self {
            strip,
            mask: entry.mask.clone(),
        })
    }

    /// Resolves the patterns against the fields actually present. Exact names
    /// and masked fields are always part of the strip set.
    pub fn plan_for(&self, fields: &OutputMapping) -> RedactionPlan {
        let mut strip: BTreeSet<String> = BTreeSet::new();

        for pattern in &self.strip {
            match pattern {
                FieldPattern::Exact(name) => {
                    strip.insert(name.clone());
                }
                FieldPattern::Wildcard { .. } => {
                    strip.extend(fields.keys().filter(|k| pattern.matches(k)).cloned());
                }
            }
        }
        strip.extend(self.mask.keys().cloned());

        RedactionPlan {
            strip,
            mask: self.mask.clone(),
        }
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.strip.iter().map(FieldPattern::as_str)
    }
}

/// `(entity, role) -> FieldRules`. Adding a sensitive field is a map change
/// only; policy code never names fields.
#[derive(Debug, Clone, Default)]
pub struct FieldSensitivityMap {
    entries: BTreeMap<(EntityType, Role), FieldRules>,
}

impl FieldSensitivityMap {
    pub fn insert_entries(
        &mut self,
        entity: EntityType,
        entries: &[SensitivityEntry],
    ) -> Result<(), DomainError> {
        for entry in entries {
            let rules = FieldRules::compile(entry)?;
            for role in &entry.roles {
                if self.entries.contains_key(&(entity, *role)) {
                    return Err(DomainError::InvalidPolicy(format!(
                        "duplicate sensitivity entry for entity '{}' and role '{}'",
                        entity, role
                    )));
                }
                self.entries.insert((entity, *role), rules.clone());
            }
        }
        Ok(())
    }

    pub fn get(&self, entity: EntityType, role: Role) -> Option<&FieldRules> {
        self.entries.get(&(entity, role))
    }

    pub fn contains(&self, entity: EntityType, role: Role) -> bool {
        self.entries.contains_key(&(entity, role))
    }
}
