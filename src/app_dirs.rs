use directories::ProjectDirs;
use std::path::PathBuf;

use crate::config::StorageBackend;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/paceline`, falling back to the platform data dir
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("paceline"),
            )
        } else {
            ProjectDirs::from("", "", "paceline")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn sessions_path(data_dir: Option<PathBuf>, backend: StorageBackend) -> PathBuf {
        let dir = data_dir
            .or_else(Self::state_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        match backend {
            StorageBackend::Json => dir.join("sessions.json"),
            StorageBackend::Sqlite => dir.join("sessions.db"),
        }
    }

    pub fn log_path() -> PathBuf {
        Self::state_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("paceline.log")
    }

    /// Exports go to the platform download dir when there is one
    pub fn export_dir(configured: Option<PathBuf>) -> PathBuf {
        configured
            .or_else(|| {
                directories::UserDirs::new()
                    .and_then(|dirs| dirs.download_dir().map(|d| d.to_path_buf()))
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sessions_path_uses_configured_dir() {
        let dir = PathBuf::from("/tmp/paceline-test");
        assert_eq!(
            AppDirs::sessions_path(Some(dir.clone()), StorageBackend::Json),
            dir.join("sessions.json")
        );
        assert_eq!(
            AppDirs::sessions_path(Some(dir.clone()), StorageBackend::Sqlite),
            dir.join("sessions.db")
        );
    }

    #[test]
    fn export_dir_prefers_configured() {
        let dir = PathBuf::from("/tmp/exports");
        assert_eq!(AppDirs::export_dir(Some(dir.clone())), dir);
    }
}
