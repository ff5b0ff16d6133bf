// tutelle-core/src/domain/access/principal.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::access::role::{Capability, Role};
use crate::domain::error::DomainError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PrincipalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PrincipalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Account lifecycle of the requesting user. New accounts wait for approval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Suspended,
}

impl AccountStatus {
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved)
    }
}

/// The authenticated actor behind a request. Always holds exactly one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PrincipalSpec", into = "PrincipalSpec")]
pub struct Principal {
    id: PrincipalId,
    role: Role,
    grants: BTreeSet<Capability>,
    status: AccountStatus,
}

impl Principal {
    /// Fails on an unknown role string instead of degrading to "no access".
    pub fn new(id: impl Into<PrincipalId>, role: &str) -> Result<Self, DomainError> {
        Ok(Self::with_role(id, Role::from_str(role)?))
    }

    /// An approved principal, as an authenticated session would carry it.
    pub fn with_role(id: impl Into<PrincipalId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            grants: BTreeSet::new(),
            status: AccountStatus::Approved,
        }
    }

    pub fn with_grant(mut self, capability: Capability) -> Self {
        self.grants.insert(capability);
        self
    }

    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> &PrincipalId {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn grants(&self) -> &BTreeSet<Capability> {
        &self.grants
    }

    pub fn status(&self) -> AccountStatus {
        self.status
    }
}

/// Wire shape of a principal (fixtures, CLI). Role and grants stay strings
/// until validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrincipalSpec {
    pub id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grants: Vec<String>,
    /// Missing means `pending`.
    #[serde(default)]
    pub status: AccountStatus,
}

impl TryFrom<PrincipalSpec> for Principal {
    type Error = DomainError;

    fn try_from(spec: PrincipalSpec) -> Result<Self, Self::Error> {
        let mut principal = Principal::new(spec.id, &spec.role)?.with_status(spec.status);
        for grant in &spec.grants {
            principal = principal.with_grant(Capability::from_str(grant)?);
        }
        Ok(principal)
    }
}

impl From<Principal> for PrincipalSpec {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id.0,
            role: p.role.to_string(),
            grants: p.grants.iter().map(|c| c.to_string()).collect(),
            status: p.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    #[test]
    fn test_unknown_role_fails_fast() {
        let result = Principal::new("u-1", "superviseur");
        assert_eq!(
            result,
            Err(DomainError::UnknownRole("superviseur".to_string()))
        );
    }

    #[test]
    fn test_yaml_principal_with_grants() -> Result<()> {
        let yaml = "id: u-7\nrole: soignant\ngrants: [view_confidential]\nstatus: suspended";
        let p: Principal = serde_yaml::from_str(yaml)?;
        assert_eq!(p.role(), Role::Soignant);
        assert!(p.grants().contains(&Capability::ViewConfidential));
        assert_eq!(p.status(), AccountStatus::Suspended);
        assert!(!p.status().is_approved());
        Ok(())
    }

    #[test]
    fn test_yaml_principal_without_status_is_pending() -> Result<()> {
        let p: Principal = serde_yaml::from_str("id: u-1\nrole: assistant_social\n")?;
        assert_eq!(p.status(), AccountStatus::Pending);
        assert!(!p.status().is_approved());

        let p: Principal = serde_yaml::from_str("id: u-1\nrole: assistant_social\nstatus: approved\n")?;
        assert!(p.status().is_approved());
        Ok(())
    }

    #[test]
    fn test_yaml_principal_unknown_grant_rejected() {
        let yaml = "id: u-7\nrole: soignant\ngrants: [teleport]";
        let parsed: Result<Principal, _> = serde_yaml::from_str(yaml);
        assert!(parsed.is_err());
    }
}
