// tutelle/src/commands/list.rs
//
// USE CASE: Scoped, evaluated and redacted listing over the fixtures.

use std::path::PathBuf;
use std::str::FromStr;

use tutelle_core::domain::access::EntityType;
use tutelle_core::infrastructure::InMemoryRecordSource;

use super::Workspace;
use crate::cli::PrincipalArgs;

pub async fn execute(project_dir: PathBuf, who: PrincipalArgs, entity: String) -> anyhow::Result<()> {
    let ws = Workspace::load(&project_dir)?;
    let principal = ws.principal(&who)?;
    let entity = EntityType::from_str(&entity)?;

    let source = InMemoryRecordSource::from(&ws.fixtures);
    let views = ws.engine.list(&source, &principal, entity).await?;

    println!("{}", serde_json::to_string_pretty(&views)?);
    Ok(())
}
