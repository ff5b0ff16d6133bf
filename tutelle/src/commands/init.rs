// tutelle/src/commands/init.rs
//
// USE CASE: Scaffold a new project.

use std::path::PathBuf;

use tutelle_core::application::init_project;

pub fn execute(project_dir: PathBuf, name: String, force: bool) -> anyhow::Result<()> {
    println!("🏗️  Scaffolding project '{}' in {}...", name, project_dir.display());

    let report = init_project(&project_dir, &name, force)?;

    for path in &report.created {
        println!("   📝 {}", path.display());
    }
    for path in &report.kept {
        println!("   ⏭️  kept existing {}", path.display());
    }

    println!("✨ Done. Try: tutelle matrix --project-dir {}", project_dir.display());
    Ok(())
}
