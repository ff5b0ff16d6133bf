// tutelle/src/commands/scope.rs
//
// USE CASE: Listing filter for the persistence layer.

use std::path::PathBuf;
use std::str::FromStr;

use tutelle_core::domain::access::EntityType;

use super::Workspace;
use crate::cli::PrincipalArgs;

pub fn execute(
    project_dir: PathBuf,
    who: PrincipalArgs,
    entity: String,
    format: String,
) -> anyhow::Result<()> {
    let ws = Workspace::load(&project_dir)?;
    let principal = ws.principal(&who)?;
    let entity = EntityType::from_str(&entity)?;

    let predicate = ws.engine.scope(&principal, entity);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&predicate)?),
        _ => println!("{}", predicate),
    }
    Ok(())
}
