// tutelle/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "tutelle")]
#[command(about = "Role-based visibility and field redaction for case records", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Who is asking: a principal from the fixtures, or an ad-hoc one by role.
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct PrincipalArgs {
    /// Principal id from fixtures/principals.yaml
    #[arg(long)]
    pub principal: Option<String>,

    /// Ad-hoc approved principal with this role
    #[arg(long)]
    pub role: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ✅ Validates the access policy and the fixtures
    Check {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,
    },

    /// 🔎 Shows one record as a principal would see it
    Evaluate {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[command(flatten)]
        who: PrincipalArgs,

        /// Record id
        #[arg(long)]
        record: String,

        /// Entity type, needed when the id exists for several types
        #[arg(long)]
        entity: Option<String>,
    },

    /// 🧭 Prints the listing filter of a principal for one entity type
    Scope {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[command(flatten)]
        who: PrincipalArgs,

        /// Entity type (child, donor, family, ...)
        #[arg(long)]
        entity: String,

        /// Output format: sql | json
        #[arg(long, default_value = "sql")]
        format: String,
    },

    /// 📋 Lists the records of one entity type visible to a principal
    List {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[command(flatten)]
        who: PrincipalArgs,

        #[arg(long)]
        entity: String,
    },

    /// 🗺️ Builds the decision matrix of every principal against every record
    Matrix {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Output format: table | json | markdown
        #[arg(long, default_value = "table")]
        format: String,

        /// Exit with error if the listing scope hides a visible record
        #[arg(long)]
        check: bool,
    },

    /// 🔑 Checks whether a principal holds a capability
    Authorize {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        #[command(flatten)]
        who: PrincipalArgs,

        /// Capability (view_confidential, manage_inventory, ...)
        #[arg(long)]
        capability: String,
    },

    /// 🏗️ Scaffolds a project with the built-in policy
    Init {
        #[arg(long, default_value = ".")]
        project_dir: PathBuf,

        /// Project name
        #[arg(long, default_value = "orphanage")]
        name: String,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_check_defaults() -> Result<()> {
        let args = Cli::parse_from(["tutelle", "check"]);
        match args.command {
            Commands::Check { project_dir } => {
                assert_eq!(project_dir.to_string_lossy(), ".");
                Ok(())
            }
            _ => bail!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_parse_evaluate_by_role() -> Result<()> {
        let args = Cli::parse_from([
            "tutelle",
            "evaluate",
            "--role",
            "visiteur",
            "--record",
            "child-1",
            "--project-dir",
            "/tmp",
        ]);
        match args.command {
            Commands::Evaluate {
                project_dir,
                who,
                record,
                entity,
            } => {
                assert_eq!(project_dir.to_string_lossy(), "/tmp");
                assert_eq!(who.role.as_deref(), Some("visiteur"));
                assert_eq!(who.principal, None);
                assert_eq!(record, "child-1");
                assert_eq!(entity, None);
                Ok(())
            }
            _ => bail!("Expected Evaluate command"),
        }
    }

    #[test]
    fn test_cli_principal_and_role_are_exclusive() {
        let both = Cli::try_parse_from([
            "tutelle", "scope", "--role", "parrain", "--principal", "p-1", "--entity", "child",
        ]);
        assert!(both.is_err());

        let neither = Cli::try_parse_from(["tutelle", "scope", "--entity", "child"]);
        assert!(neither.is_err());
    }

    #[test]
    fn test_cli_parse_matrix_check() -> Result<()> {
        let args = Cli::parse_from(["tutelle", "matrix", "--check", "--format", "json"]);
        match args.command {
            Commands::Matrix { check, format, .. } => {
                assert!(check);
                assert_eq!(format, "json");
                Ok(())
            }
            _ => bail!("Expected Matrix command"),
        }
    }
}
