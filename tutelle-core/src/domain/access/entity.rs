// tutelle-core/src/domain/access/entity.rs

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Child,
    ChildNote,
    ChildDocument,
    MedicalRecord,
    Donor,
    Donation,
    Family,
    InventoryItem,
    Event,
}

/// Which relation of a record makes the requester its owner. Declared per
/// entity type, never read off the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipRelation {
    OwnedByUser,
    OwnedByCaseWorker,
    OwnedBySponsor,
    Unowned,
}

impl EntityType {
    pub const ALL: [EntityType; 9] = [
        EntityType::Child,
        EntityType::ChildNote,
        EntityType::ChildDocument,
        EntityType::MedicalRecord,
        EntityType::Donor,
        EntityType::Donation,
        EntityType::Family,
        EntityType::InventoryItem,
        EntityType::Event,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::ChildNote => "child_note",
            Self::ChildDocument => "child_document",
            Self::MedicalRecord => "medical_record",
            Self::Donor => "donor",
            Self::Donation => "donation",
            Self::Family => "family",
            Self::InventoryItem => "inventory_item",
            Self::Event => "event",
        }
    }

    pub fn ownership(&self) -> OwnershipRelation {
        match self {
            Self::Child => OwnershipRelation::OwnedBySponsor,
            Self::Donor | Self::Donation | Self::Event => OwnershipRelation::OwnedByUser,
            Self::ChildNote
            | Self::ChildDocument
            | Self::MedicalRecord
            | Self::Family
            | Self::InventoryItem => OwnershipRelation::Unowned,
        }
    }

    /// Sub-records only reachable through a visible child record.
    pub fn parent(&self) -> Option<EntityType> {
        match self {
            Self::ChildNote | Self::ChildDocument | Self::MedicalRecord => Some(Self::Child),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        EntityType::ALL
            .into_iter()
            .find(|e| e.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownEntity(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_is_owned_by_sponsor() {
        assert_eq!(
            EntityType::Child.ownership(),
            OwnershipRelation::OwnedBySponsor
        );
        assert_eq!(EntityType::Family.ownership(), OwnershipRelation::Unowned);
    }

    #[test]
    fn test_sub_records_hang_off_child() {
        assert_eq!(EntityType::MedicalRecord.parent(), Some(EntityType::Child));
        assert_eq!(EntityType::Donation.parent(), None);
    }

    #[test]
    fn test_every_entity_round_trips_through_its_name() {
        for entity in EntityType::ALL {
            assert_eq!(EntityType::from_str(entity.as_str()), Ok(entity));
        }
        assert!(EntityType::from_str("spaceship").is_err());
    }
}
