// tutelle-core/src/domain/access/record.rs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::access::entity::{EntityType, OwnershipRelation};
use crate::domain::access::principal::{Principal, PrincipalId};

/// Output of the redactor; also the raw field set of a record.
pub type OutputMapping = Map<String, Value>;

/// Snapshot of one stored entity, with its relation keys already resolved by
/// the persistence layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectedRecord {
    pub entity: EntityType,
    pub id: String,
    #[serde(default)]
    pub is_confidential: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_worker: Option<PrincipalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsor: Option<PrincipalId>,
    /// Owning account (donor user, organizer, author).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<PrincipalId>,
    /// Parent record id for sub-records (notes, documents, medical records).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub fields: OutputMapping,
}

/// A relation key of a record that can be compared to a principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKey {
    CaseWorker,
    Sponsor,
    Owner,
}

impl RelationKey {
    pub fn column(&self) -> &'static str {
        match self {
            Self::CaseWorker => "case_worker_id",
            Self::Sponsor => "sponsor_id",
            Self::Owner => "owner_id",
        }
    }
}

impl OwnershipRelation {
    pub fn key(&self) -> Option<RelationKey> {
        match self {
            Self::OwnedByUser => Some(RelationKey::Owner),
            Self::OwnedByCaseWorker => Some(RelationKey::CaseWorker),
            Self::OwnedBySponsor => Some(RelationKey::Sponsor),
            Self::Unowned => None,
        }
    }
}

impl ProtectedRecord {
    pub fn new(entity: EntityType, id: impl Into<String>) -> Self {
        Self {
            entity,
            id: id.into(),
            is_confidential: false,
            case_worker: None,
            sponsor: None,
            owner: None,
            parent: None,
            fields: Map::new(),
        }
    }

    pub fn confidential(mut self, flag: bool) -> Self {
        self.is_confidential = flag;
        self
    }

    pub fn with_case_worker(mut self, id: impl Into<PrincipalId>) -> Self {
        self.case_worker = Some(id.into());
        self
    }

    pub fn with_sponsor(mut self, id: impl Into<PrincipalId>) -> Self {
        self.sponsor = Some(id.into());
        self
    }

    pub fn with_owner(mut self, id: impl Into<PrincipalId>) -> Self {
        self.owner = Some(id.into());
        self
    }

    pub fn with_parent(mut self, id: impl Into<String>) -> Self {
        self.parent = Some(id.into());
        self
    }

    pub fn with_field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn relation(&self, key: RelationKey) -> Option<&PrincipalId> {
        match key {
            RelationKey::CaseWorker => self.case_worker.as_ref(),
            RelationKey::Sponsor => self.sponsor.as_ref(),
            RelationKey::Owner => self.owner.as_ref(),
        }
    }

    pub fn is_held_by(&self, key: RelationKey, principal: &Principal) -> bool {
        self.relation(key).is_some_and(|id| id == principal.id())
    }

    pub fn is_case_worker(&self, principal: &Principal) -> bool {
        self.is_held_by(RelationKey::CaseWorker, principal)
    }

    /// Ownership as declared statically by the entity type.
    pub fn is_owned_by(&self, principal: &Principal) -> bool {
        self.entity
            .ownership()
            .key()
            .is_some_and(|key| self.is_held_by(key, principal))
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_ownership_follows_entity_declaration() -> Result<()> {
        let sponsor = Principal::new("u-sp", "parrain")?;
        let child = ProtectedRecord::new(EntityType::Child, "c-1")
            .with_sponsor("u-sp")
            .with_owner("u-other");
        assert!(child.is_owned_by(&sponsor));

        // A family is unowned, whatever relation keys it carries.
        let family = ProtectedRecord::new(EntityType::Family, "f-1").with_owner("u-sp");
        assert!(!family.is_owned_by(&sponsor));
        Ok(())
    }

    #[test]
    fn test_record_from_json() -> Result<()> {
        let json = r#"{
            "entity": "child",
            "id": "c-9",
            "is_confidential": true,
            "case_worker": "u-as",
            "fields": {"first_name": "Lina", "status": "a_parrainer"}
        }"#;
        let record: ProtectedRecord = serde_json::from_str(json)?;
        assert!(record.is_confidential);
        assert_eq!(record.case_worker, Some(PrincipalId::from("u-as")));
        assert_eq!(record.field("status"), Some(&Value::from("a_parrainer")));
        assert!(record.sponsor.is_none());
        Ok(())
    }
}
