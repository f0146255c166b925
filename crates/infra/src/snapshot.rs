//! JSON snapshot persistence.
//!
//! A snapshot holds the complete state. Writes go to a sibling temp file that
//! is then renamed over the target, so readers never see a torn file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use stockroom_inventory::Warehouse;

use crate::{StoreError, UserDirectory};

/// Everything the store persists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub warehouse: Warehouse,
    #[serde(default)]
    pub users: UserDirectory,
}

/// Load a snapshot; `Ok(None)` when the file does not exist yet.
pub fn load(path: &Path) -> Result<Option<Snapshot>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Atomically replace the snapshot at `path`.
pub fn save(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(snapshot)?;
    let tmp = temp_path(path);

    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
