use super::ScanOutput;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize collection: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write a collection as pretty-printed JSON, creating parent directories.
pub fn write_collection(path: &Path, output: &ScanOutput) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(output)?;
    let io_err = |source| OutputError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, json).map_err(io_err)
}

/// Read back a collection written by [`write_collection`]
pub fn read_collection(path: &Path) -> Result<ScanOutput, OutputError> {
    let content = fs::read_to_string(path).map_err(|source| OutputError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
