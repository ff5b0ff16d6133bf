// tutelle-core/src/application/matrix.rs
//
// Access matrix: every fixture principal against every fixture record, with
// a soundness check of the listing scope. Any record the scope would hide
// from a principal who may see it is reported as a violation.

use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

use crate::application::engine::AccessEngine;
use crate::application::ports::TemplateEngine;
use crate::domain::access::{AccessDecision, DecisionKind, EntityType};
use crate::domain::project::ProjectConfig;
use crate::error::TutelleError;
use crate::infrastructure::fixtures::FixtureSet;
use crate::infrastructure::fs::atomic_write;

const MATRIX_TEMPLATE: &str = include_str!("templates/matrix.md.j2");

pub const REPORT_FILE: &str = "access_matrix.json";

// ── Report Structures ────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct MatrixReport {
    pub project_name: String,
    pub environment: String,
    pub generated_at: DateTime<Utc>,
    /// Column order of every row's `cells`.
    pub principals: Vec<MatrixPrincipal>,
    pub rows: Vec<MatrixRow>,
    pub scope_violations: Vec<ScopeViolation>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatrixPrincipal {
    pub id: String,
    pub role: String,
    pub approved: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatrixRow {
    pub entity: EntityType,
    pub record: String,
    pub confidential: bool,
    pub cells: Vec<DecisionKind>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScopeViolation {
    pub principal: String,
    pub entity: EntityType,
    pub record: String,
    pub decision: DecisionKind,
    pub predicate: String,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MatrixSummary {
    pub full_access: usize,
    pub redacted: usize,
    pub denied: usize,
}

impl MatrixReport {
    pub fn has_violations(&self) -> bool {
        !self.scope_violations.is_empty()
    }

    pub fn summary(&self) -> MatrixSummary {
        let mut summary = MatrixSummary::default();
        for kind in self.rows.iter().flat_map(|r| r.cells.iter()) {
            match kind {
                DecisionKind::FullAccess => summary.full_access += 1,
                DecisionKind::Redacted => summary.redacted += 1,
                DecisionKind::Denied => summary.denied += 1,
            }
        }
        summary
    }

    pub fn cell(&self, principal: &str, record: &str) -> Option<DecisionKind> {
        let column = self.principals.iter().position(|p| p.id == principal)?;
        let row = self.rows.iter().find(|r| r.record == record)?;
        row.cells.get(column).copied()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_table(&self) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let mut header = vec!["entity".to_string(), "record".to_string()];
        header.extend(
            self.principals
                .iter()
                .map(|p| format!("{}\n({})", p.id, p.role)),
        );
        table.set_header(header);

        for row in &self.rows {
            let mut cells = vec![
                row.entity.to_string(),
                if row.confidential {
                    format!("🔒 {}", row.record)
                } else {
                    row.record.clone()
                },
            ];
            cells.extend(row.cells.iter().map(|k| k.to_string()));
            table.add_row(cells);
        }

        table.to_string()
    }

    pub fn to_markdown(&self, engine: &dyn TemplateEngine) -> Result<String, TutelleError> {
        let mut context = serde_json::to_value(self)
            .map_err(|e| TutelleError::InternalError(format!("report serialization: {}", e)))?;
        if let Some(map) = context.as_object_mut() {
            let summary = serde_json::to_value(self.summary())
                .map_err(|e| TutelleError::InternalError(e.to_string()))?;
            map.insert("summary".to_string(), summary);
        }
        engine.render(MATRIX_TEMPLATE, &context)
    }

    /// Writes the JSON report under the project's target path.
    pub fn write_to(
        &self,
        project_dir: &Path,
        config: &ProjectConfig,
    ) -> Result<PathBuf, TutelleError> {
        let target_dir = project_dir.join(&config.target_path);

        // Zero-Trust Path Traversal Guard
        if config.target_path.split(['/', '\\']).any(|part| part == "..") {
            return Err(TutelleError::UnsafePath(config.target_path.clone()));
        }

        let path = target_dir.join(REPORT_FILE);
        let json = self
            .to_json()
            .map_err(|e| TutelleError::InternalError(e.to_string()))?;
        atomic_write(&path, json)?;
        Ok(path)
    }
}

// ── Builder ──────────────────────────────────────────────────────────

#[instrument(skip_all, fields(project = %config.name))]
pub fn build_matrix(
    engine: &AccessEngine,
    fixtures: &FixtureSet,
    config: &ProjectConfig,
) -> Result<MatrixReport, TutelleError> {
    let principals: Vec<MatrixPrincipal> = fixtures
        .principals
        .iter()
        .map(|p| MatrixPrincipal {
            id: p.id().to_string(),
            role: p.role().to_string(),
            approved: p.status().is_approved(),
        })
        .collect();

    let mut records: Vec<_> = fixtures.records.iter().collect();
    records.sort_by(|a, b| (a.entity, &a.id).cmp(&(b.entity, &b.id)));

    let mut rows = Vec::with_capacity(records.len());
    let mut scope_violations = Vec::new();

    for record in records {
        let mut cells = Vec::with_capacity(principals.len());
        for principal in &fixtures.principals {
            let decision = match record.entity.parent() {
                Some(_) => match fixtures.parent_of(record) {
                    Some(parent) => engine.decide_nested(principal, parent, record)?,
                    None => AccessDecision::Denied,
                },
                None => engine.decide(principal, record)?,
            };

            let predicate = engine.scope(principal, record.entity);
            if !decision.is_denied() && !predicate.matches(record) {
                warn!(
                    principal = %principal.id(),
                    record = %record.id,
                    "Scope hides a visible record"
                );
                scope_violations.push(ScopeViolation {
                    principal: principal.id().to_string(),
                    entity: record.entity,
                    record: record.id.clone(),
                    decision: decision.kind(),
                    predicate: predicate.to_string(),
                });
            }
            cells.push(decision.kind());
        }
        rows.push(MatrixRow {
            entity: record.entity,
            record: record.id.clone(),
            confidential: record.is_confidential,
            cells,
        });
    }

    info!(
        rows = rows.len(),
        principals = principals.len(),
        violations = scope_violations.len(),
        "Access matrix built"
    );

    Ok(MatrixReport {
        project_name: config.name.clone(),
        environment: config.environment.to_string(),
        generated_at: Utc::now(),
        principals,
        rows,
        scope_violations,
    })
}
