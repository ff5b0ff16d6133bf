// tutelle/src/commands/matrix.rs
//
// USE CASE: Decision matrix and listing-scope soundness check.

use std::path::PathBuf;

use tutelle_core::application::build_matrix;
use tutelle_core::infrastructure::report::JinjaRenderer;

use super::Workspace;

pub fn execute(project_dir: PathBuf, format: String, check: bool) -> anyhow::Result<()> {
    let ws = Workspace::load(&project_dir)?;
    let report = build_matrix(&ws.engine, &ws.fixtures, &ws.config)?;

    // The JSON report is always saved to target/
    let out_path = report.write_to(&project_dir, &ws.config)?;

    match format.as_str() {
        "json" => println!("{}", report.to_json()?),
        "markdown" | "md" => println!("{}", report.to_markdown(&JinjaRenderer::new())?),
        _ => {
            println!("{}", report.to_table());
            let summary = report.summary();
            println!(
                "📊 {} full · {} redacted · {} denied",
                summary.full_access, summary.redacted, summary.denied
            );
            println!("📄 JSON report saved to {}", out_path.display());
        }
    }

    if report.has_violations() {
        eprintln!(
            "\n⚠️  {} scope violation(s) detected:",
            report.scope_violations.len()
        );
        for v in &report.scope_violations {
            eprintln!(
                "   ❌ {} sees {}/{} ({}) outside scope `{}`",
                v.principal, v.entity, v.record, v.decision, v.predicate
            );
        }

        if check {
            eprintln!("\n💥 --check mode: Failing due to scope violations.");
            std::process::exit(1);
        }
    } else if format == "table" {
        println!("   ✅ Listing scope is sound for every principal.");
    }

    Ok(())
}
