use anyhow::{Context, Result};
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

/// Copy of the demo orphanage project in a scratch directory.
struct TutelleTestEnv {
    _tmp: TempDir,
    root: PathBuf,
}

impl TutelleTestEnv {
    fn new() -> Result<Self> {
        let tmp = tempfile::tempdir()?;
        let project_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .context("Workspace root not found")?
            .join("demos/orphanage");

        let dest = tmp.path().join("orphanage");
        Self::copy_dir(&project_root, &dest)?;

        Ok(Self {
            _tmp: tmp,
            root: dest,
        })
    }

    fn copy_dir(src: &PathBuf, dst: &PathBuf) -> std::io::Result<()> {
        let mut options = fs_extra::dir::CopyOptions::new();
        options.skip_exist = true;
        options.content_only = true;

        std::fs::create_dir_all(dst)?;
        fs_extra::dir::copy(src, dst, &options)
            .map(|_| ())
            .map_err(|e| std::io::Error::other(e.to_string()))
    }

    fn tutelle(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tutelle"));
        cmd.current_dir(&self.root);
        cmd
    }

    fn json(&self, args: &[&str]) -> Result<serde_json::Value> {
        let output = self.tutelle().args(args).output()?;
        anyhow::ensure!(output.status.success(), "tutelle {:?} failed", args);
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[test]
fn test_check_accepts_demo_project() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    env.tutelle()
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("Access policy is valid"))
        .stdout(predicate::str::contains("10 principal(s)"))
        .stdout(predicate::str::contains("emergency_contact_*"))
        .stdout(predicate::str::contains("generate_reports"));
    Ok(())
}

#[test]
fn test_check_fails_loud_on_missing_sensitivity_entry() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    std::fs::write(
        env.root.join("config/entities.yml"),
        "entities:\n  family:\n    public_roles: [visiteur]\n",
    )?;
    env.tutelle()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("family"));
    Ok(())
}

#[test]
fn test_visitor_sees_masked_child() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    let view = env.json(&["evaluate", "--role", "visiteur", "--record", "child-open"])?;

    assert_eq!(view["decision"], "redacted");
    assert_eq!(view["fields"]["last_name"], "***");
    assert_eq!(view["fields"]["first_name"], "Awa");
    assert!(view["fields"].get("allergies").is_none());
    assert!(view["fields"].get("emergency_contact_phone").is_none());
    Ok(())
}

#[test]
fn test_sponsor_of_confidential_child_is_denied() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    let denial = env.json(&["evaluate", "--principal", "parrain-1", "--record", "child-secret"])?;
    assert_eq!(denial["error"], "not_authorized");
    assert!(denial.get("fields").is_none());

    // the case worker still sees it
    let view = env.json(&["evaluate", "--principal", "soignant-1", "--record", "child-secret"])?;
    assert_eq!(view["decision"], "full_access");
    Ok(())
}

#[test]
fn test_unknown_record_looks_like_a_denial() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    let missing = env
        .tutelle()
        .args(["evaluate", "--principal", "visiteur-1", "--record", "child-nope"])
        .output()?;
    let denied = env
        .tutelle()
        .args(["evaluate", "--principal", "visiteur-1", "--record", "child-secret"])
        .output()?;
    assert!(missing.status.success());
    assert_eq!(missing.stdout, denied.stdout);
    Ok(())
}

#[test]
fn test_sponsor_scope_snapshot() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    let output = env
        .tutelle()
        .args(["scope", "--principal", "parrain-1", "--entity", "child"])
        .output()?;
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout)?;

    insta::assert_snapshot!("sponsor_child_scope", stdout.trim_end());
    Ok(())
}

#[test]
fn test_list_applies_nested_gate() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    let notes = env.json(&["list", "--principal", "soignant-1", "--entity", "child_note"])?;
    let ids: Vec<&str> = notes
        .as_array()
        .context("list output is not an array")?
        .iter()
        .filter_map(|v| v["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["note-open", "note-sponsored"]);

    let notes = env.json(&["list", "--principal", "assistant-1", "--entity", "child_note"])?;
    assert_eq!(notes.as_array().map(Vec::len), Some(3));
    Ok(())
}

#[test]
fn test_sponsor_follows_notes_of_sponsored_child() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    let notes = env.json(&["list", "--principal", "parrain-1", "--entity", "child_note"])?;
    let ids: Vec<&str> = notes
        .as_array()
        .context("list output is not an array")?
        .iter()
        .filter_map(|v| v["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["note-sponsored"]);

    let view = env.json(&["evaluate", "--principal", "parrain-1", "--record", "note-sponsored"])?;
    assert_eq!(view["decision"], "full_access");

    // medical records stay with the staff
    let records = env.json(&["list", "--principal", "parrain-1", "--entity", "medical_record"])?;
    assert_eq!(records, serde_json::json!([]));
    Ok(())
}

#[test]
fn test_evaluate_with_entity_type() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    let view = env.json(&[
        "evaluate",
        "--principal",
        "soignant-1",
        "--record",
        "med-open",
        "--entity",
        "medical_record",
    ])?;
    assert_eq!(view["decision"], "full_access");

    // wrong entity type: same payload as a denial
    let denial = env.json(&[
        "evaluate",
        "--principal",
        "soignant-1",
        "--record",
        "med-open",
        "--entity",
        "child",
    ])?;
    assert_eq!(denial["error"], "not_authorized");
    Ok(())
}

#[test]
fn test_pending_account_lists_nothing() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    let children = env.json(&["list", "--principal", "soignant-pending", "--entity", "child"])?;
    assert_eq!(children, serde_json::json!([]));
    Ok(())
}

#[test]
fn test_matrix_check_is_sound_and_saved() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    let report = env.json(&["matrix", "--format", "json", "--check"])?;

    assert_eq!(report["scope_violations"], serde_json::json!([]));
    assert_eq!(report["project_name"], "orphanage");
    assert!(env.root.join("target/access_matrix.json").exists());

    env.tutelle()
        .args(["matrix", "--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Access matrix: orphanage"));
    Ok(())
}

#[test]
fn test_authorize_exit_codes() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    env.tutelle()
        .args(["authorize", "--role", "logisticien", "--capability", "manage_inventory"])
        .assert()
        .success();
    env.tutelle()
        .args(["authorize", "--role", "logisticien", "--capability", "manage_children"])
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("not_authorized"));
    // individual grant on top of the role
    env.tutelle()
        .args(["authorize", "--principal", "donateur-2", "--capability", "view_financial_data"])
        .assert()
        .success();
    // satellite override from config/roles.yml
    env.tutelle()
        .args(["authorize", "--role", "medecin", "--capability", "generate_reports"])
        .assert()
        .success();
    Ok(())
}

#[test]
fn test_unknown_role_is_an_error() -> Result<()> {
    let env = TutelleTestEnv::new()?;
    env.tutelle()
        .args(["scope", "--role", "gardien", "--entity", "child"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("gardien"));
    Ok(())
}

#[test]
fn test_init_then_check() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let mut init = Command::new(assert_cmd::cargo::cargo_bin!("tutelle"));
    init.args(["init", "--name", "foyer", "--project-dir"])
        .arg(tmp.path())
        .assert()
        .success();

    let mut check = Command::new(assert_cmd::cargo::cargo_bin!("tutelle"));
    check
        .args(["check", "--project-dir"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("foyer"));
    Ok(())
}
