// tutelle-core/src/application/init.rs

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::access::{Capability, EntityPolicy, EntityType, Role};
use crate::domain::project::Environment;
use crate::error::TutelleError;
use crate::infrastructure::config::builtin_policy;
use crate::infrastructure::fs::{WriteOutcome, write_scaffold};

const PRINCIPALS: &str = "\
principals:
  - id: admin-1
    role: admin
    status: approved
  - id: assistant-1
    role: assistant_social
    status: approved
  - id: soignant-1
    role: soignant
    status: approved
  - id: visiteur-1
    role: visiteur
    status: approved
";

const CHILD_RECORD: &str = r#"[
  {
    "entity": "child",
    "id": "child-1",
    "case_worker": "assistant-1",
    "fields": {
      "first_name": "Awa",
      "last_name": "Diallo",
      "status": "a_parrainer",
      "allergies": "pénicilline"
    }
  }
]
"#;

#[derive(Debug, Default)]
pub struct InitReport {
    pub created: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
}

#[derive(Serialize)]
struct Manifest<'a> {
    name: &'a str,
    version: &'a str,
    environment: Environment,
    strict: bool,
    #[serde(rename = "config-paths")]
    config_paths: [&'a str; 1],
    #[serde(rename = "fixture-paths")]
    fixture_paths: [&'a str; 1],
    #[serde(rename = "target-path")]
    target_path: &'a str,
}

#[derive(Serialize)]
struct RolesFile {
    roles: BTreeMap<Role, BTreeSet<Capability>>,
}

#[derive(Serialize)]
struct EntitiesFile {
    entities: BTreeMap<EntityType, EntityPolicy>,
}

/// Scaffolds a project with the built-in policy split into editable
/// satellite files. Existing files are kept unless `force` is set.
pub fn init_project(project_dir: &Path, name: &str, force: bool) -> Result<InitReport, TutelleError> {
    let policy = builtin_policy()?;

    let manifest = serde_yaml::to_string(&Manifest {
        name,
        version: "0.1.0",
        environment: Environment::Development,
        strict: true,
        config_paths: ["config"],
        fixture_paths: ["fixtures"],
        target_path: "target",
    })
    .map_err(|e| TutelleError::InternalError(e.to_string()))?;
    let roles = serde_yaml::to_string(&RolesFile {
        roles: policy.roles,
    })
    .map_err(|e| TutelleError::InternalError(e.to_string()))?;
    let entities = serde_yaml::to_string(&EntitiesFile {
        entities: policy.entities,
    })
    .map_err(|e| TutelleError::InternalError(e.to_string()))?;

    let files: [(&str, String); 5] = [
        ("tutelle.yaml", manifest),
        ("config/roles.yml", roles),
        ("config/entities.yml", entities),
        ("fixtures/principals.yaml", PRINCIPALS.to_string()),
        ("fixtures/records/children.json", CHILD_RECORD.to_string()),
    ];

    let mut report = InitReport::default();
    for (relative, content) in files {
        let path = project_dir.join(relative);
        match write_scaffold(&path, content, force)? {
            WriteOutcome::Kept => report.kept.push(path),
            WriteOutcome::Created | WriteOutcome::Overwritten => report.created.push(path),
        }
    }

    info!(
        created = report.created.len(),
        kept = report.kept.len(),
        "Project scaffolded"
    );
    Ok(report)
}
