// tutelle/src/commands/authorize.rs
//
// USE CASE: Operation-level capability gate. Exit code 1 on denial.

use std::path::PathBuf;
use std::str::FromStr;

use tutelle_core::TutelleError;
use tutelle_core::domain::access::Capability;

use super::{Workspace, print_denial};
use crate::cli::PrincipalArgs;

pub fn execute(project_dir: PathBuf, who: PrincipalArgs, capability: String) -> anyhow::Result<()> {
    let ws = Workspace::load(&project_dir)?;
    let principal = ws.principal(&who)?;
    let capability = Capability::from_str(&capability)?;

    match ws.engine.authorize(&principal, capability) {
        Ok(()) => {
            println!("✅ {} may {}", principal.id(), capability);
            Ok(())
        }
        Err(TutelleError::Access(denial)) => {
            print_denial(&denial)?;
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
