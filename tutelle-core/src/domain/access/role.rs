// tutelle-core/src/domain/access/role.rs

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::domain::access::decision::AccessError;
use crate::domain::access::principal::Principal;
use crate::domain::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Medecin,
    Soignant,
    AssistantSocial,
    Logisticien,
    Donateur,
    Parrain,
    Visiteur,
}

impl Role {
    pub const ALL: [Role; 8] = [
        Role::Admin,
        Role::Medecin,
        Role::Soignant,
        Role::AssistantSocial,
        Role::Logisticien,
        Role::Donateur,
        Role::Parrain,
        Role::Visiteur,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Medecin => "medecin",
            Self::Soignant => "soignant",
            Self::AssistantSocial => "assistant_social",
            Self::Logisticien => "logisticien",
            Self::Donateur => "donateur",
            Self::Parrain => "parrain",
            Self::Visiteur => "visiteur",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Role::ALL
            .into_iter()
            .find(|r| r.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownRole(s.to_string()))
    }
}

/// Operation-level permissions. A role grants a set of them; a principal can
/// also hold individual grants on top of its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Bypasses the confidentiality gate.
    ViewConfidential,
    ManageChildren,
    CreateChildRecords,
    UploadChildDocuments,
    ViewMedicalRecords,
    CreateMedicalRecords,
    ManageInventory,
    ViewFinancialData,
    ManageFamilies,
    GenerateReports,
    ApproveUsers,
    ExportData,
}

impl Capability {
    pub const ALL: [Capability; 12] = [
        Capability::ViewConfidential,
        Capability::ManageChildren,
        Capability::CreateChildRecords,
        Capability::UploadChildDocuments,
        Capability::ViewMedicalRecords,
        Capability::CreateMedicalRecords,
        Capability::ManageInventory,
        Capability::ViewFinancialData,
        Capability::ManageFamilies,
        Capability::GenerateReports,
        Capability::ApproveUsers,
        Capability::ExportData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewConfidential => "view_confidential",
            Self::ManageChildren => "manage_children",
            Self::CreateChildRecords => "create_child_records",
            Self::UploadChildDocuments => "upload_child_documents",
            Self::ViewMedicalRecords => "view_medical_records",
            Self::CreateMedicalRecords => "create_medical_records",
            Self::ManageInventory => "manage_inventory",
            Self::ViewFinancialData => "view_financial_data",
            Self::ManageFamilies => "manage_families",
            Self::GenerateReports => "generate_reports",
            Self::ApproveUsers => "approve_users",
            Self::ExportData => "export_data",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Capability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| DomainError::UnknownCapability(s.to_string()))
    }
}

/// Single place where role comparisons happen, so the admin override is
/// applied exactly once.
#[derive(Debug, Clone, Default)]
pub struct RoleCatalog {
    capabilities: BTreeMap<Role, BTreeSet<Capability>>,
}

impl RoleCatalog {
    pub fn new(capabilities: BTreeMap<Role, BTreeSet<Capability>>) -> Self {
        Self { capabilities }
    }

    pub fn has_role(&self, principal: &Principal, role: Role) -> bool {
        principal.role() == role || principal.role() == Role::Admin
    }

    /// True when the principal's role is one of `roles`, admin included.
    pub fn has_any_role(&self, principal: &Principal, roles: &BTreeSet<Role>) -> bool {
        principal.role() == Role::Admin || roles.contains(&principal.role())
    }

    /// Exact membership, no admin override. Used for public-role sets, where
    /// admin is already served by its own rule.
    pub fn is_one_of(&self, principal: &Principal, roles: &BTreeSet<Role>) -> bool {
        roles.contains(&principal.role())
    }

    pub fn has_capability(&self, principal: &Principal, capability: Capability) -> bool {
        if principal.role() == Role::Admin || principal.grants().contains(&capability) {
            return true;
        }
        self.capabilities
            .get(&principal.role())
            .is_some_and(|caps| caps.contains(&capability))
    }

    /// Operation-level check, answered with the uniform denial.
    pub fn authorize(
        &self,
        principal: &Principal,
        capability: Capability,
    ) -> Result<(), AccessError> {
        if self.has_capability(principal, capability) {
            Ok(())
        } else {
            Err(AccessError::not_authorized())
        }
    }

    pub fn capabilities_of(&self, role: Role) -> BTreeSet<Capability> {
        if role == Role::Admin {
            return Capability::ALL.into_iter().collect();
        }
        self.capabilities.get(&role).cloned().unwrap_or_default()
    }
}
