// tutelle-core/src/infrastructure/config/project.rs

use serde::{Deserialize, de::DeserializeOwned};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::domain::access::configuration::{EntityPolicy, PolicyConfig};
use crate::domain::access::entity::EntityType;
use crate::domain::access::role::{Capability, Role};
use crate::domain::project::configuration::{Environment, ProjectConfig};
use crate::infrastructure::config::policy::builtin_policy;
use crate::infrastructure::error::InfrastructureError;

pub const MAIN_CONFIG_CANDIDATES: [&str; 2] = ["tutelle_project_conf.yaml", "tutelle.yaml"];

// --- LOADER ---

#[instrument(skip(project_dir))]
pub fn load_project_config(project_dir: &Path) -> Result<ProjectConfig, InfrastructureError> {
    load_project_config_with(project_dir, |key| std::env::var(key).ok())
}

/// Same as [`load_project_config`] with an explicit variable lookup, so the
/// environment layering can be exercised without touching the process env.
pub fn load_project_config_with<F>(
    project_dir: &Path,
    lookup: F,
) -> Result<ProjectConfig, InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    // 1. Découverte du fichier principal
    let config_path = find_main_config(project_dir)?;
    info!(path = ?config_path, "Loading project manifest");

    // 2. Chargement YAML Base
    let mut config: ProjectConfig = load_fragment(&config_path)?;

    // 3. Politique : défaut embarqué puis satellites (fail-secure)
    let mut policy = builtin_policy()?;
    if let Some(config_folder) = config.config_paths.first() {
        let config_dir = project_dir.join(config_folder);
        if config_dir.exists() {
            load_satellite_configs(&mut policy, &config_dir)?;
        }
    }
    if let Some(token) = &config.mask_token {
        policy.mask_token = token.clone();
    }
    config.policy = policy;

    // 4. Override via variables d'environnement
    apply_env_overrides(&mut config, lookup)?;

    Ok(config)
}

pub fn find_main_config(root: &Path) -> Result<PathBuf, InfrastructureError> {
    for filename in MAIN_CONFIG_CANDIDATES {
        let p = root.join(filename);
        if p.exists() {
            return Ok(p);
        }
    }
    Err(InfrastructureError::ConfigNotFound(format!(
        "No configuration file found in {:?}. Checked: {:?}",
        root, MAIN_CONFIG_CANDIDATES
    )))
}

// --- LOGIQUE GÉNÉRIQUE ---

/// Loads a typed configuration fragment. A corrupt file stops the load.
pub(crate) fn load_fragment<T: DeserializeOwned>(path: &Path) -> Result<T, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| {
        InfrastructureError::ConfigError(format!("Failed to parse {:?}: {}", path, e))
    })
}

fn load_satellite_configs(
    policy: &mut PolicyConfig,
    config_dir: &Path,
) -> Result<(), InfrastructureError> {
    // A. Role -> capabilities
    let roles_path = config_dir.join("roles.yml");
    if roles_path.exists() {
        #[derive(Deserialize)]
        struct RolesWrapper {
            roles: BTreeMap<Role, BTreeSet<Capability>>,
        }

        let wrapper: RolesWrapper = load_fragment(&roles_path)?;
        info!(count = wrapper.roles.len(), "  🔑 Role capabilities loaded");
        policy.overlay(PolicyConfig {
            roles: wrapper.roles,
            ..Default::default()
        });
    }

    // B. Entity policies
    let entities_path = config_dir.join("entities.yml");
    if entities_path.exists() {
        #[derive(Deserialize)]
        struct EntitiesWrapper {
            mask_token: Option<String>,
            #[serde(default)]
            entities: BTreeMap<EntityType, EntityPolicy>,
        }

        let wrapper: EntitiesWrapper = load_fragment(&entities_path)?;
        info!(count = wrapper.entities.len(), "  🔒 Entity policies loaded");
        if let Some(token) = wrapper.mask_token {
            policy.mask_token = token;
        }
        policy.overlay(PolicyConfig {
            entities: wrapper.entities,
            ..Default::default()
        });
    }

    Ok(())
}

fn apply_env_overrides<F>(config: &mut ProjectConfig, lookup: F) -> Result<(), InfrastructureError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("TUTELLE_ENVIRONMENT") {
        let environment: Environment = val.parse().map_err(InfrastructureError::ConfigError)?;
        info!(old = %config.environment, new = %environment, "Overriding environment via ENV");
        config.environment = environment;
    }
    if let Some(val) = lookup("TUTELLE_TARGET_PATH") {
        info!(old = ?config.target_path, new = ?val, "Overriding target path via ENV");
        config.target_path = val;
    }
    Ok(())
}
