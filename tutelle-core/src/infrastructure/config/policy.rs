// tutelle-core/src/infrastructure/config/policy.rs

use crate::domain::access::configuration::PolicyConfig;
use crate::infrastructure::error::InfrastructureError;

const DEFAULT_POLICY: &str = include_str!("default_policy.yaml");

/// The orphanage policy shipped with the binary.
pub fn builtin_policy() -> Result<PolicyConfig, InfrastructureError> {
    serde_yaml::from_str(DEFAULT_POLICY).map_err(InfrastructureError::YamlError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::model::AccessModel;
    use crate::domain::access::{Capability, EntityType, Role};
    use crate::domain::project::Environment;
    use anyhow::Result;

    #[test]
    fn test_builtin_policy_covers_every_entity() -> Result<()> {
        let policy = builtin_policy()?;
        for entity in EntityType::ALL {
            assert!(policy.entities.contains_key(&entity), "missing {}", entity);
        }
        Ok(())
    }

    #[test]
    fn test_builtin_policy_compiles_strictly() -> Result<()> {
        let policy = builtin_policy()?;
        let model = AccessModel::compile(&policy, Environment::Test)?;
        assert_eq!(model.mask_token, "***");
        Ok(())
    }

    #[test]
    fn test_only_social_workers_bypass_confidentiality() -> Result<()> {
        let policy = builtin_policy()?;
        let holders: Vec<Role> = policy
            .roles
            .iter()
            .filter(|(_, caps)| caps.contains(&Capability::ViewConfidential))
            .map(|(role, _)| *role)
            .collect();
        assert_eq!(holders, vec![Role::AssistantSocial]);
        Ok(())
    }
}
