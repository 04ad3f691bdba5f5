//! Data directory layout.

use std::path::{Path, PathBuf};

/// Resolve the Amora data directory.
///
/// `AMORA_DATA_DIR` wins; otherwise `~/.amora`, or `.amora` in the current
/// directory when there is no home directory.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AMORA_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".amora");
    }

    PathBuf::from(".amora")
}

/// Where the local media store keeps uploaded files.
pub fn media_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("media")
}
