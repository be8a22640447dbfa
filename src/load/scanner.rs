//! Record directory scanner

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use super::yaml;
use crate::error::{TallyError, TallyResult};
use crate::models::BudgetBuilder;

/// Load every file under `dir` whose name ends with `suffix`
///
/// Directories are walked recursively and files are loaded in sorted path
/// order. Returns the number of files loaded.
pub fn scan_dir(dir: &Path, suffix: &str, builder: &mut BudgetBuilder) -> TallyResult<usize> {
    if !dir.is_dir() {
        return Err(TallyError::Load(format!(
            "Record directory {} does not exist",
            dir.display()
        )));
    }

    let mut files = Vec::new();
    collect_files(dir, suffix, &mut files)?;
    files.sort();
    debug!(dir = %dir.display(), files = files.len(), "Scanning records");

    for path in &files {
        load_file(path, builder)?;
    }
    Ok(files.len())
}

/// Load a single record file
pub fn load_file(path: &Path, builder: &mut BudgetBuilder) -> TallyResult<()> {
    let started = Instant::now();
    let content = fs::read_to_string(path)
        .map_err(|e| TallyError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
    yaml::load_str(&content, builder)
        .map_err(|e| TallyError::Load(format!("{}: {}", path.display(), e)))?;
    info!(
        "Loaded {} in {} ms",
        path.display(),
        started.elapsed().as_millis()
    );
    Ok(())
}

fn collect_files(dir: &Path, suffix: &str, files: &mut Vec<PathBuf>) -> TallyResult<()> {
    let entries = fs::read_dir(dir)
        .map_err(|e| TallyError::Io(format!("Failed to list {}: {}", dir.display(), e)))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, suffix, files)?;
        } else if path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(suffix))
        {
            files.push(path);
        }
    }
    Ok(())
}
