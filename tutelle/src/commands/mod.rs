// tutelle/src/commands/mod.rs

pub mod authorize;
pub mod check;
pub mod evaluate;
pub mod init;
pub mod list;
pub mod matrix;
pub mod scope;

use anyhow::{Context, bail};
use std::path::Path;
use tracing::debug;

use tutelle_core::AccessEngine;
use tutelle_core::domain::access::{AccessError, Principal};
use tutelle_core::domain::project::ProjectConfig;
use tutelle_core::infrastructure::config::load_project_config;
use tutelle_core::infrastructure::fixtures::{FixtureSet, load_fixtures};

use crate::cli::PrincipalArgs;

/// Everything a command needs: config, compiled engine and fixtures.
pub struct Workspace {
    pub config: ProjectConfig,
    pub engine: AccessEngine,
    pub fixtures: FixtureSet,
}

impl Workspace {
    pub fn load(project_dir: &Path) -> anyhow::Result<Self> {
        let config = load_project_config(project_dir).with_context(|| {
            format!(
                "Failed to load project configuration from {:?}",
                project_dir
            )
        })?;
        let engine = AccessEngine::from_config(&config)
            .with_context(|| format!("Invalid access policy in project '{}'", config.name))?;
        let fixtures = load_fixtures(project_dir, &config)
            .with_context(|| format!("Failed to load fixtures of project '{}'", config.name))?;
        debug!(
            project = %config.name,
            principals = fixtures.principals.len(),
            records = fixtures.records.len(),
            "Workspace loaded"
        );
        Ok(Self {
            config,
            engine,
            fixtures,
        })
    }

    pub fn principal(&self, who: &PrincipalArgs) -> anyhow::Result<Principal> {
        match (&who.principal, &who.role) {
            (Some(id), _) => self
                .fixtures
                .principal(id)
                .cloned()
                .with_context(|| format!("Unknown principal '{}'", id)),
            (None, Some(role)) => Ok(Principal::new(format!("adhoc-{}", role), role)?),
            (None, None) => bail!("Either --principal or --role is required"),
        }
    }
}

pub fn print_denial(error: &AccessError) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(error)?);
    Ok(())
}
