//! Newline-delimited identifier list

use std::path::Path;

use indexmap::IndexSet;
use tracing::warn;

use crate::version::error::StoreError;
use crate::version::store::write_replacing;

/// Reads identifiers in file order, skipping blank lines
fn read_lines(path: &Path) -> Result<Vec<String>, StoreError> {
    let content = std::fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Loads the identifiers to check. Duplicates keep their first position.
pub fn load(path: &Path) -> Result<Vec<String>, StoreError> {
    let lines = read_lines(path)?;
    let total = lines.len();
    let unique: IndexSet<String> = lines.into_iter().collect();

    if unique.len() != total {
        warn!(
            "Ignoring {} duplicate identifiers in {:?}",
            total - unique.len(),
            path
        );
    }

    Ok(unique.into_iter().collect())
}

/// Rewrites the list without the `removed` identifiers, keeping the order of the rest.
///
/// Returns how many distinct identifiers were present and got removed.
pub fn prune(path: &Path, removed: &IndexSet<String>) -> Result<usize, StoreError> {
    let lines = read_lines(path)?;
    let pruned = removed
        .iter()
        .filter(|identifier| lines.contains(identifier))
        .count();
    let kept: Vec<String> = lines
        .into_iter()
        .filter(|line| !removed.contains(line))
        .collect();

    let mut content = String::new();
    for identifier in &kept {
        content.push_str(identifier);
        content.push('\n');
    }
    write_replacing(path, content.as_bytes())?;

    Ok(pruned)
}
