// tutelle-core/src/infrastructure/fs.rs

use crate::infrastructure::error::InfrastructureError;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes through a temporary sibling file that is renamed over `path`, so a
/// reader sees either the old content or the new one. Missing parent
/// directories are created.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
) -> Result<(), InfrastructureError> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // same directory, so the rename never crosses filesystems
    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_ref())?;
    temp_file
        .persist(path)
        .map_err(|e| InfrastructureError::Io(e.error))?;

    Ok(())
}

/// Outcome of a scaffolding write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    Overwritten,
    Kept,
}

/// Writes `content` unless the file already exists and `force` is off.
pub fn write_scaffold<P: AsRef<Path>, C: AsRef<[u8]>>(
    path: P,
    content: C,
    force: bool,
) -> Result<WriteOutcome, InfrastructureError> {
    let path = path.as_ref();
    let existed = path.exists();
    if existed && !force {
        return Ok(WriteOutcome::Kept);
    }
    atomic_write(path, content)?;
    Ok(if existed {
        WriteOutcome::Overwritten
    } else {
        WriteOutcome::Created
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write_creates_parents() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("target/reports/matrix.json");

        atomic_write(&file_path, "{}")?;

        assert_eq!(fs::read_to_string(file_path)?, "{}");
        Ok(())
    }

    #[test]
    fn test_scaffold_keeps_existing_unless_forced() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("tutelle.yaml");

        assert_eq!(write_scaffold(&file_path, "a", false)?, WriteOutcome::Created);
        assert_eq!(write_scaffold(&file_path, "b", false)?, WriteOutcome::Kept);
        assert_eq!(fs::read_to_string(&file_path)?, "a");

        assert_eq!(write_scaffold(&file_path, "c", true)?, WriteOutcome::Overwritten);
        assert_eq!(fs::read_to_string(&file_path)?, "c");
        Ok(())
    }
}
