//! Atomic file writes
//!
//! Write to a temp sibling, flush, then rename over the target so readers
//! see either the previous file or the complete new one.

use crate::error::{ComposerError, ComposerResult};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

fn temp_path(path: &Path) -> PathBuf {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    path.with_file_name(temp_name)
}

/// Write content atomically, creating parent directories as needed
pub async fn write_atomic(path: &Path, content: &[u8]) -> ComposerResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ComposerError::io(format!("creating directory {}", parent.display()), e))?;
    }

    let temp = temp_path(path);

    let result = write_and_rename(&temp, path, content).await;
    if result.is_err() {
        let _ = fs::remove_file(&temp).await;
    }
    result
}

async fn write_and_rename(temp: &Path, path: &Path, content: &[u8]) -> ComposerResult<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp)
        .await
        .map_err(|e| ComposerError::io(format!("creating {}", temp.display()), e))?;

    file.write_all(content)
        .await
        .map_err(|e| ComposerError::io(format!("writing {}", temp.display()), e))?;

    file.sync_all()
        .await
        .map_err(|e| ComposerError::io(format!("syncing {}", temp.display()), e))?;
    drop(file);

    fs::rename(temp, path)
        .await
        .map_err(|e| ComposerError::io(format!("replacing {}", path.display()), e))
}
