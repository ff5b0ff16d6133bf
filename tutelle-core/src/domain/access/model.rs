// tutelle-core/src/domain/access/model.rs
//
// Compiled, read-only form of a PolicyConfig. Built once at startup and
// shared by the policy, the redactor and the query scope.

use std::collections::{BTreeMap, BTreeSet};
use tracing::{error, info};

use crate::domain::access::configuration::{FieldCondition, PolicyConfig};
use crate::domain::access::entity::EntityType;
use crate::domain::access::record::ProtectedRecord;
use crate::domain::access::role::{RoleCatalog, Role};
use crate::domain::access::sensitivity::{FieldPattern, FieldSensitivityMap};
use crate::domain::error::DomainError;
use crate::domain::project::Environment;

#[derive(Debug, Clone)]
pub struct EntityAccess {
    pub entity: EntityType,
    pub privileged: BTreeSet<Role>,
    pub public_roles: BTreeSet<Role>,
    pub eligibility: Vec<FieldCondition>,
    pub parent_owner_access: bool,
}

impl EntityAccess {
    /// Eligibility conditions only; confidentiality is checked separately.
    pub fn is_publicly_eligible(&self, record: &ProtectedRecord) -> bool {
        self.eligibility.iter().all(|c| c.holds_for(record))
    }
}

#[derive(Debug, Clone)]
pub struct AccessModel {
    pub catalog: RoleCatalog,
    pub entities: BTreeMap<EntityType, EntityAccess>,
    pub sensitivity: FieldSensitivityMap,
    pub mask_token: String,
    pub environment: Environment,
}

impl AccessModel {
    /// Validates and compiles the configuration.
    ///
    /// Outside production the first problem is returned as an error. In
    /// production every problem is logged and the offending entry is left
    /// out, which makes the affected lookups deny.
    pub fn compile(config: &PolicyConfig, environment: Environment) -> Result<Self, DomainError> {
        let mut issues: Vec<DomainError> = Vec::new();

        if let Err(e) = config.check() {
            issues.push(e);
        }

        let catalog = RoleCatalog::new(config.roles.clone());
        let mut entities = BTreeMap::new();
        let mut sensitivity = FieldSensitivityMap::default();

        for entity in EntityType::ALL {
            let Some(policy) = config.entities.get(&entity) else {
                issues.push(DomainError::MissingEntityPolicy {
                    entity: entity.to_string(),
                });
                continue;
            };

            if let Err(e) = sensitivity.insert_entries(entity, &policy.sensitivity) {
                issues.push(e);
            }

            // A public rule with a bad condition field is dropped whole, so
            // the field name never reaches a rendered predicate.
            let mut public_roles = policy.public_roles.clone();
            let mut eligibility = policy.public_when.clone();
            let mut bad_condition = false;
            for cond in &policy.public_when {
                match FieldPattern::parse(&cond.field) {
                    Ok(FieldPattern::Exact(_)) => {}
                    Ok(FieldPattern::Wildcard { .. }) => {
                        bad_condition = true;
                        issues.push(DomainError::InvalidFieldPattern {
                            pattern: cond.field.clone(),
                            reason: "eligibility conditions need an exact field name".to_string(),
                        });
                    }
                    Err(e) => {
                        bad_condition = true;
                        issues.push(e);
                    }
                }
            }
            if bad_condition {
                public_roles.clear();
                eligibility.clear();
            }

            let mut parent_owner_access = policy.parent_owner_access;
            if parent_owner_access && entity.parent().is_none() {
                parent_owner_access = false;
                issues.push(DomainError::InvalidPolicy(format!(
                    "parent_owner_access only applies to sub-records, not '{}'",
                    entity
                )));
            }

            for role in &public_roles {
                if !sensitivity.contains(entity, *role) {
                    issues.push(DomainError::MissingSensitivityEntry {
                        entity: entity.to_string(),
                        role: role.to_string(),
                    });
                }
            }

            entities.insert(
                entity,
                EntityAccess {
                    entity,
                    privileged: policy.privileged_viewers.clone(),
                    public_roles,
                    eligibility,
                    parent_owner_access,
                },
            );
        }

        if let Some(first) = issues.first() {
            if environment.fails_loud() {
                return Err(first.clone());
            }
            for issue in &issues {
                error!(%issue, "Access policy problem (degraded to deny)");
            }
        }

        info!(
            entities = entities.len(),
            environment = %environment,
            "Access model compiled"
        );

        Ok(Self {
            catalog,
            entities,
            sensitivity,
            mask_token: config.mask_token.clone(),
            environment,
        })
    }

    pub fn entity(&self, entity: EntityType) -> Option<&EntityAccess> {
        self.entities.get(&entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::policy::VisibilityPolicy;
    use crate::domain::access::configuration::EntityPolicy;
    use crate::domain::access::principal::Principal;
    use anyhow::Result;
    use std::sync::Arc;

    /// Inventory is public for two roles but only one has a sensitivity entry.
    fn incomplete_policy() -> Result<PolicyConfig> {
        let mut yaml = String::from(
            "entities:\n  inventory_item:\n    public_roles: [logisticien, soignant]\n    \
             public_when:\n      - field: is_active\n        one_of: [true]\n    \
             sensitivity:\n      - roles: [logisticien]\n",
        );
        for entity in EntityType::ALL {
            if entity != EntityType::InventoryItem {
                yaml.push_str(&format!("  {}: {{}}\n", entity));
            }
        }
        Ok(serde_yaml::from_str(&yaml)?)
    }

    #[test]
    fn test_missing_sensitivity_entry_fails_loud() -> Result<()> {
        let err = AccessModel::compile(&incomplete_policy()?, Environment::Development)
            .err()
            .ok_or_else(|| anyhow::anyhow!("compile should fail outside production"))?;
        assert_eq!(
            err,
            DomainError::MissingSensitivityEntry {
                entity: "inventory_item".to_string(),
                role: "soignant".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_production_degrades_to_deny() -> Result<()> {
        let model = AccessModel::compile(&incomplete_policy()?, Environment::Production)?;
        let policy = VisibilityPolicy::new(Arc::new(model));
        let item = ProtectedRecord::new(EntityType::InventoryItem, "item-1")
            .with_field("is_active", true)
            .with_field("name", "riz");

        let nurse = Principal::with_role("soignant-1", Role::Soignant);
        assert!(policy.evaluate(&nurse, &item).is_denied());
        assert!(policy.try_evaluate(&nurse, &item).is_err());

        // the configured role is unaffected
        let keeper = Principal::with_role("logisticien-1", Role::Logisticien);
        assert!(!policy.evaluate(&keeper, &item).is_denied());
        Ok(())
    }

    #[test]
    fn test_bad_condition_field_drops_the_public_rule() -> Result<()> {
        let mut config = incomplete_policy()?;
        let child: EntityPolicy = serde_yaml::from_str(
            "public_roles: [visiteur]\n\
             public_when:\n  - field: \"x IS NULL OR TRUE OR status\"\n    one_of: [a_parrainer]\n\
             sensitivity:\n  - roles: [visiteur]\n",
        )?;
        config.entities.insert(EntityType::Child, child);

        assert!(matches!(
            AccessModel::compile(&config, Environment::Test),
            Err(DomainError::InvalidFieldPattern { .. })
        ));

        let model = AccessModel::compile(&config, Environment::Production)?;
        let access = model
            .entity(EntityType::Child)
            .ok_or_else(|| anyhow::anyhow!("child policy kept"))?;
        assert!(access.public_roles.is_empty());
        assert!(access.eligibility.is_empty());

        let policy = VisibilityPolicy::new(Arc::new(model));
        let visitor = Principal::with_role("v-1", Role::Visiteur);
        let open = ProtectedRecord::new(EntityType::Child, "c-1").with_field("status", "a_parrainer");
        assert!(policy.evaluate(&visitor, &open).is_denied());
        Ok(())
    }

    #[test]
    fn test_parent_owner_access_needs_a_sub_record() -> Result<()> {
        let mut config = incomplete_policy()?;
        let donor: EntityPolicy = serde_yaml::from_str("parent_owner_access: true\n")?;
        config.entities.insert(EntityType::Donor, donor);
        config.entities.insert(EntityType::InventoryItem, EntityPolicy::default());

        assert!(matches!(
            AccessModel::compile(&config, Environment::Development),
            Err(DomainError::InvalidPolicy(_))
        ));
        let model = AccessModel::compile(&config, Environment::Production)?;
        assert!(model.entity(EntityType::Donor).is_some_and(|a| !a.parent_owner_access));
        Ok(())
    }

    #[test]
    fn test_missing_entity_policy_is_reported() -> Result<()> {
        let config: PolicyConfig = serde_yaml::from_str("entities:\n  child: {}\n")?;
        let err = AccessModel::compile(&config, Environment::Test).err();
        assert!(matches!(err, Some(DomainError::MissingEntityPolicy { .. })));

        let model = AccessModel::compile(&config, Environment::Production)?;
        assert!(model.entity(EntityType::Child).is_some());
        assert!(model.entity(EntityType::Donor).is_none());
        Ok(())
    }
}
