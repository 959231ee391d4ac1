//! Command implementations.

mod extract;
mod match_cmd;
mod normalize;
mod show;
mod verify;

pub use extract::execute_extract;
pub use match_cmd::execute_match;
pub use normalize::execute_normalize;
pub use show::execute_show;
pub use verify::execute_verify;

use crate::error::{CliError, Result};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use voucher_store::SqliteStore;

/// Read a JSON array of records from a file.
pub(crate) fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| CliError::InvalidInput(format!("Cannot read {}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&contents)?)
}

/// Keep the records whose id is listed, or all of them when no list is given.
///
/// Every listed id must name at least one record.
pub(crate) fn select_by_id<T, F>(records: Vec<T>, ids: Option<&[String]>, id_of: F) -> Result<Vec<T>>
where
    F: Fn(&T) -> &str,
{
    let Some(ids) = ids else {
        return Ok(records);
    };

    let wanted: BTreeSet<&str> = ids.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    let present: BTreeSet<&str> = records.iter().map(&id_of).collect();
    let unknown: Vec<&str> = wanted.difference(&present).copied().collect();
    if !unknown.is_empty() {
        return Err(CliError::InvalidInput(format!(
            "Unknown ledger id(s): {}",
            unknown.join(", ")
        )));
    }

    let wanted: BTreeSet<String> = wanted.into_iter().map(str::to_string).collect();
    Ok(records.into_iter().filter(|r| wanted.contains(id_of(r))).collect())
}

/// Open the result database, creating its directory if needed.
pub(crate) fn open_store(path: &Path) -> Result<SqliteStore> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(SqliteStore::new(path)?)
}
