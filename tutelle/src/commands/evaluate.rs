// tutelle/src/commands/evaluate.rs
//
// USE CASE: One record, seen through one principal.

use std::path::PathBuf;
use std::str::FromStr;

use tutelle_core::TutelleError;
use tutelle_core::domain::access::{AccessError, EntityType};

use super::{Workspace, print_denial};
use crate::cli::PrincipalArgs;

pub fn execute(
    project_dir: PathBuf,
    who: PrincipalArgs,
    record_id: String,
    entity: Option<String>,
) -> anyhow::Result<()> {
    let ws = Workspace::load(&project_dir)?;
    let principal = ws.principal(&who)?;
    let entity = entity.as_deref().map(EntityType::from_str).transpose()?;

    // An unknown id answers exactly like a denied one
    let Some(record) = ws.fixtures.record(entity, &record_id)? else {
        return print_denial(&AccessError::not_authorized());
    };

    let view = match record.entity.parent() {
        Some(_) => match ws.fixtures.parent_of(record) {
            Some(parent) => ws.engine.view_nested(&principal, parent, record),
            None => Err(AccessError::not_authorized().into()),
        },
        None => ws.engine.view(&principal, record),
    };

    match view {
        Ok(view) => println!("{}", serde_json::to_string_pretty(&view)?),
        Err(TutelleError::Access(denial)) => print_denial(&denial)?,
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
