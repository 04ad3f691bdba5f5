//! File-backed notification permission.
//!
//! On a desktop session the permission is whatever the user last chose; it
//! is kept in `{data_dir}/notification_permission` as a single word. A
//! missing file means the user was never asked.

use std::path::{Path, PathBuf};

use amora_core::notification::PermissionProbe;
use amora_types::error::NotificationError;
use amora_types::notification::PermissionState;

const PERMISSION_FILE: &str = "notification_permission";

/// Reads and writes the stored permission.
#[derive(Debug, Clone)]
pub struct FilePermissionProbe {
    path: PathBuf,
}

impl FilePermissionProbe {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(PERMISSION_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record the user's choice.
    pub async fn set(&self, state: PermissionState) -> Result<(), NotificationError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| NotificationError::ProbeFailed(e.to_string()))?;
        }
        tokio::fs::write(&self.path, format!("{state}\n"))
            .await
            .map_err(|e| NotificationError::ProbeFailed(e.to_string()))
    }
}

impl PermissionProbe for FilePermissionProbe {
    async fn permission(&self) -> Result<PermissionState, NotificationError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content
                .trim()
                .parse::<PermissionState>()
                .map_err(NotificationError::ProbeFailed),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(PermissionState::Default),
            Err(err) => Err(NotificationError::ProbeFailed(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_means_default() {
        let tmp = TempDir::new().unwrap();
        let probe = FilePermissionProbe::new(tmp.path());
        assert_eq!(probe.permission().await.unwrap(), PermissionState::Default);
    }

    #[tokio::test]
    async fn set_then_read() {
        let tmp = TempDir::new().unwrap();
        let probe = FilePermissionProbe::new(tmp.path());

        probe.set(PermissionState::Granted).await.unwrap();
        assert_eq!(probe.permission().await.unwrap(), PermissionState::Granted);

        probe.set(PermissionState::Denied).await.unwrap();
        assert_eq!(probe.permission().await.unwrap(), PermissionState::Denied);
    }

    #[tokio::test]
    async fn garbage_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let probe = FilePermissionProbe::new(tmp.path());
        tokio::fs::write(probe.path(), "perhaps").await.unwrap();

        assert!(matches!(
            probe.permission().await,
            Err(NotificationError::ProbeFailed(_))
        ));
    }
}
