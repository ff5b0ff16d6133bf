// tutelle-core/src/domain/access/configuration.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use validator::Validate;

use crate::domain::access::entity::EntityType;
use crate::domain::access::masking::MaskingStrategy;
use crate::domain::access::record::ProtectedRecord;
use crate::domain::access::role::{Capability, Role};
use crate::domain::error::DomainError;

pub const DEFAULT_MASK_TOKEN: &str = "***";

// --- CONFIGURATION STRUCTS ---

#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
pub struct PolicyConfig {
    #[serde(default = "default_mask_token")]
    #[validate(length(min = 1, message = "mask_token cannot be empty"))]
    pub mask_token: String,

    /// Role -> capabilities. Admin holds every capability regardless.
    #[serde(default)]
    pub roles: BTreeMap<Role, BTreeSet<Capability>>,

    #[serde(default)]
    pub entities: BTreeMap<EntityType, EntityPolicy>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, Validate, PartialEq)]
pub struct EntityPolicy {
    /// Roles granted full access to non-confidential records.
    #[serde(default)]
    pub privileged_viewers: BTreeSet<Role>,

    /// Roles granted a redacted view of publicly eligible records.
    #[serde(default)]
    pub public_roles: BTreeSet<Role>,

    /// All conditions must hold for a record to be publicly eligible.
    #[validate(nested)]
    #[serde(default)]
    pub public_when: Vec<FieldCondition>,

    #[validate(nested)]
    #[serde(default)]
    pub sensitivity: Vec<SensitivityEntry>,

    /// Sub-records only: the owner of the parent record (a child's sponsor)
    /// fully sees the non-confidential ones.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parent_owner_access: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
pub struct FieldCondition {
    #[validate(length(min = 1, message = "condition field cannot be empty"))]
    pub field: String,

    #[validate(length(min = 1, message = "condition needs at least one accepted value"))]
    pub one_of: Vec<Value>,
}

/// Fields to strip or mask when one of `roles` gets a redacted view.
#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
pub struct SensitivityEntry {
    #[validate(length(min = 1, message = "sensitivity entry needs at least one role"))]
    pub roles: Vec<Role>,

    /// Exact names or `*` wildcard patterns.
    #[serde(default)]
    pub strip: Vec<String>,

    #[serde(default)]
    pub mask: BTreeMap<String, MaskingStrategy>,
}

fn default_mask_token() -> String {
    DEFAULT_MASK_TOKEN.to_string()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            mask_token: default_mask_token(),
            roles: BTreeMap::new(),
            entities: BTreeMap::new(),
        }
    }
}

impl PolicyConfig {
    /// Layers `other` on top of `self`: role mappings and entity policies are
    /// replaced per key, never merged field by field.
    pub fn overlay(&mut self, other: PolicyConfig) {
        if other.mask_token != DEFAULT_MASK_TOKEN {
            self.mask_token = other.mask_token;
        }
        self.roles.extend(other.roles);
        self.entities.extend(other.entities);
    }

    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::InvalidPolicy(e.to_string()))?;
        for (entity, policy) in &self.entities {
            policy
                .validate()
                .map_err(|e| DomainError::InvalidPolicy(format!("{}: {}", entity, e)))?;
        }
        Ok(())
    }
}

impl FieldCondition {
    pub fn holds_for(&self, record: &ProtectedRecord) -> bool {
        record
            .field(&self.field)
            .is_some_and(|value| self.one_of.contains(value))
    }
}
