// tutelle-core/src/infrastructure/fixtures.rs

// File-backed record snapshots: JSON records under the fixture paths and the
// principals that query them. Stands in for the persistence layer.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use crate::domain::access::entity::EntityType;
use crate::domain::access::principal::Principal;
use crate::domain::access::record::ProtectedRecord;
use crate::domain::access::scope::FilterPredicate;
use crate::domain::project::ProjectConfig;
use crate::error::TutelleError;
use crate::infrastructure::config::project::load_fragment;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::RecordSource;

const PRINCIPAL_FILES: [&str; 2] = ["principals.yaml", "principals.yml"];

#[derive(Debug, Clone, Default)]
pub struct FixtureSet {
    pub principals: Vec<Principal>,
    pub records: Vec<ProtectedRecord>,
}

impl FixtureSet {
    pub fn principal(&self, id: &str) -> Option<&Principal> {
        self.principals.iter().find(|p| p.id().as_str() == id)
    }

    /// Ids are unique per entity type only: without `entity`, an id held by
    /// several types is an error rather than a guess.
    pub fn record(
        &self,
        entity: Option<EntityType>,
        id: &str,
    ) -> Result<Option<&ProtectedRecord>, InfrastructureError> {
        let mut found = self
            .records
            .iter()
            .filter(|r| r.id == id && entity.is_none_or(|e| r.entity == e));
        let first = found.next();
        if first.is_some() && found.next().is_some() {
            return Err(InfrastructureError::ConfigError(format!(
                "Record id '{}' exists for several entity types, pass the entity",
                id
            )));
        }
        Ok(first)
    }

    pub fn records_of(&self, entity: EntityType) -> impl Iterator<Item = &ProtectedRecord> {
        self.records.iter().filter(move |r| r.entity == entity)
    }

    /// The parent record of a sub-record, if it is present in the set.
    pub fn parent_of(&self, record: &ProtectedRecord) -> Option<&ProtectedRecord> {
        let parent_entity = record.entity.parent()?;
        let parent_id = record.parent.as_deref()?;
        self.records
            .iter()
            .find(|r| r.entity == parent_entity && r.id == parent_id)
    }
}

#[instrument(skip(project_dir, config))]
pub fn load_fixtures(
    project_dir: &Path,
    config: &ProjectConfig,
) -> Result<FixtureSet, InfrastructureError> {
    let mut set = FixtureSet::default();

    for folder in &config.fixture_paths {
        let root = project_dir.join(folder);
        if !root.exists() {
            debug!(path = ?root, "Fixture path missing, skipped");
            continue;
        }

        for name in PRINCIPAL_FILES {
            let path = root.join(name);
            if path.exists() {
                #[derive(Deserialize)]
                struct PrincipalsWrapper {
                    principals: Vec<Principal>,
                }
                let wrapper: PrincipalsWrapper = load_fragment(&path)?;
                set.principals.extend(wrapper.principals);
            }
        }

        let walker = WalkDir::new(&root).follow_links(true).sort_by_file_name();
        for entry in walker.into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                set.records.extend(parse_record_file(path)?);
            }
        }
    }

    check_unique_ids(&set)?;

    info!(
        principals = set.principals.len(),
        records = set.records.len(),
        "Fixtures loaded"
    );
    Ok(set)
}

/// A record file holds one record object or an array of them.
fn parse_record_file(path: &Path) -> Result<Vec<ProtectedRecord>, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)?;
    let records = match value {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<ProtectedRecord>, _>>()?,
        other => vec![serde_json::from_value(other)?],
    };
    debug!(path = ?path, count = records.len(), "Record file parsed");
    Ok(records)
}

fn check_unique_ids(set: &FixtureSet) -> Result<(), InfrastructureError> {
    let mut seen = std::collections::BTreeSet::new();
    for p in &set.principals {
        if !seen.insert(p.id().clone()) {
            return Err(InfrastructureError::ConfigError(format!(
                "Duplicate principal id '{}'",
                p.id()
            )));
        }
    }
    let mut seen = std::collections::BTreeSet::new();
    for r in &set.records {
        if !seen.insert((r.entity, r.id.as_str())) {
            return Err(InfrastructureError::ConfigError(format!(
                "Duplicate {} record id '{}'",
                r.entity, r.id
            )));
        }
    }
    Ok(())
}

/// In-memory `RecordSource` over loaded fixtures. Applies the predicate
/// exactly, as a database would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordSource {
    records: Vec<ProtectedRecord>,
}

impl InMemoryRecordSource {
    pub fn new(records: Vec<ProtectedRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<&FixtureSet> for InMemoryRecordSource {
    fn from(set: &FixtureSet) -> Self {
        Self::new(set.records.clone())
    }
}

#[async_trait]
impl RecordSource for InMemoryRecordSource {
    async fn fetch(
        &self,
        entity: EntityType,
        predicate: &FilterPredicate,
    ) -> Result<Vec<ProtectedRecord>, TutelleError> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.entity == entity && predicate.matches(r))
            .cloned()
            .collect())
    }

    async fn get(
        &self,
        entity: EntityType,
        id: &str,
    ) -> Result<Option<ProtectedRecord>, TutelleError> {
        Ok(self
            .records
            .iter()
            .find(|r| r.entity == entity && r.id == id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::access::role::Role;
    use anyhow::Result;
    use tempfile::tempdir;

    fn project() -> Result<ProjectConfig> {
        Ok(serde_yaml::from_str("name: demo\nversion: '1.0'")?)
    }

    #[test]
    fn test_loads_objects_arrays_and_principals() -> Result<()> {
        let dir = tempdir()?;
        let fixtures = dir.path().join("fixtures");
        fs::create_dir_all(fixtures.join("records"))?;
        fs::write(
            fixtures.join("principals.yaml"),
            "principals:\n  - id: u-1\n    role: parrain\n  - id: u-2\n    role: assistant_social\n    status: pending\n",
        )?;
        fs::write(
            fixtures.join("records/children.json"),
            r#"[{"entity": "child", "id": "c-1", "sponsor": "u-1", "fields": {"status": "parraine"}},
                {"entity": "child", "id": "c-2", "is_confidential": true}]"#,
        )?;
        fs::write(
            fixtures.join("records/donor.json"),
            r#"{"entity": "donor", "id": "d-1", "owner": "u-1"}"#,
        )?;

        let set = load_fixtures(dir.path(), &project()?)?;
        assert_eq!(set.principals.len(), 2);
        assert_eq!(set.records.len(), 3);
        assert_eq!(set.principal("u-1").map(|p| p.role()), Some(Role::Parrain));
        assert!(set.principal("u-2").is_some_and(|p| !p.status().is_approved()));
        assert!(set.record(None, "c-2")?.is_some_and(|r| r.is_confidential));
        assert_eq!(set.records_of(EntityType::Child).count(), 2);
        Ok(())
    }

    #[test]
    fn test_unknown_role_in_principals_is_fatal() -> Result<()> {
        let dir = tempdir()?;
        let fixtures = dir.path().join("fixtures");
        fs::create_dir_all(&fixtures)?;
        fs::write(
            fixtures.join("principals.yaml"),
            "principals:\n  - id: u-1\n    role: gardien\n",
        )?;
        assert!(load_fixtures(dir.path(), &project()?).is_err());
        Ok(())
    }

    #[test]
    fn test_duplicate_record_ids_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        let fixtures = dir.path().join("fixtures");
        fs::create_dir_all(&fixtures)?;
        fs::write(
            fixtures.join("a.json"),
            r#"[{"entity": "family", "id": "f-1"}, {"entity": "family", "id": "f-1"}]"#,
        )?;
        let err = load_fixtures(dir.path(), &project()?);
        assert!(matches!(err, Err(InfrastructureError::ConfigError(_))));
        Ok(())
    }

    #[test]
    fn test_record_lookup_needs_entity_when_ambiguous() -> Result<()> {
        let set = FixtureSet {
            principals: vec![],
            records: vec![
                ProtectedRecord::new(EntityType::Family, "x-1"),
                ProtectedRecord::new(EntityType::Donor, "x-1"),
                ProtectedRecord::new(EntityType::Donor, "d-1"),
            ],
        };
        assert!(matches!(
            set.record(None, "x-1"),
            Err(InfrastructureError::ConfigError(_))
        ));
        let donor = set.record(Some(EntityType::Donor), "x-1")?;
        assert_eq!(donor.map(|r| r.entity), Some(EntityType::Donor));
        assert!(set.record(None, "d-1")?.is_some());
        assert!(set.record(Some(EntityType::Family), "d-1")?.is_none());
        Ok(())
    }

    #[test]
    fn test_parent_lookup() {
        let child = ProtectedRecord::new(EntityType::Child, "c-1");
        let note = ProtectedRecord::new(EntityType::ChildNote, "n-1").with_parent("c-1");
        let orphan = ProtectedRecord::new(EntityType::ChildNote, "n-2").with_parent("c-9");
        let set = FixtureSet {
            principals: vec![],
            records: vec![child.clone(), note.clone(), orphan.clone()],
        };
        assert_eq!(set.parent_of(&note), Some(&child));
        assert_eq!(set.parent_of(&orphan), None);
        assert_eq!(set.parent_of(&child), None);
    }

    #[tokio::test]
    async fn test_in_memory_source_applies_predicate() -> Result<()> {
        let source = InMemoryRecordSource::new(vec![
            ProtectedRecord::new(EntityType::Child, "c-1"),
            ProtectedRecord::new(EntityType::Child, "c-2").confidential(true),
            ProtectedRecord::new(EntityType::Family, "f-1"),
        ]);
        let open = source
            .fetch(EntityType::Child, &FilterPredicate::NotConfidential)
            .await?;
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].id, "c-1");
        assert!(source.get(EntityType::Family, "c-1").await?.is_none());
        Ok(())
    }
}
