// tutelle/src/commands/check.rs
//
// USE CASE: Validate the policy (fail loud outside production) and fixtures.

use std::path::PathBuf;

use tutelle_core::domain::access::{EntityType, Role};

use super::Workspace;

pub fn execute(project_dir: PathBuf) -> anyhow::Result<()> {
    println!("⚙️  Checking access policy...");

    let ws = Workspace::load(&project_dir)?;
    let model = ws.engine.model();

    println!(
        "   Project: {} (v{}) · environment: {} · strict: {}",
        ws.config.name,
        ws.config.version,
        ws.config.environment,
        ws.engine.is_strict()
    );
    println!("   Mask token: {}", model.mask_token);

    for role in Role::ALL {
        let caps: Vec<String> = model
            .catalog
            .capabilities_of(role)
            .iter()
            .map(|c| c.to_string())
            .collect();
        println!("   👤 {:<16} {}", role.as_str(), caps.join(", "));
    }

    let mut unconfigured = Vec::new();
    for entity in EntityType::ALL {
        match model.entity(entity) {
            Some(access) => {
                let privileged: Vec<String> =
                    access.privileged.iter().map(|r| r.to_string()).collect();
                let public: Vec<String> =
                    access.public_roles.iter().map(|r| r.to_string()).collect();
                println!(
                    "   🔐 {:<15} privileged [{}] · public [{}] · rules {}",
                    entity.as_str(),
                    privileged.join(", "),
                    public.join(", "),
                    ws.engine.policy().rule_names(entity).join(" → ")
                );
                for role in &access.public_roles {
                    if let Some(rules) = model.sensitivity.get(entity, *role) {
                        let strip: Vec<&str> = rules.patterns().collect();
                        println!("      {} strips [{}]", role, strip.join(", "));
                    }
                }
            }
            None => unconfigured.push(entity),
        }
    }

    println!(
        "   👥 {} principal(s), 📄 {} record(s) in fixtures",
        ws.fixtures.principals.len(),
        ws.fixtures.records.len()
    );

    if !unconfigured.is_empty() {
        // Only reachable in production, where compilation degrades instead of failing
        eprintln!(
            "\n⚠️  {} entity type(s) without a policy are denied to everyone but admin:",
            unconfigured.len()
        );
        for entity in &unconfigured {
            eprintln!("   ❌ {}", entity);
        }
        std::process::exit(1);
    }

    println!("✨ Access policy is valid.");
    Ok(())
}
