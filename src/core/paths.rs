//! Per-user directory layout

use std::path::{Path, PathBuf};

use directories::{BaseDirs, UserDirs};

use super::error::{OrganizerError, Result};

const APP_DIR_NAME: &str = "DesktopOrganizer";
const CONFIG_FILE_NAME: &str = "config.json";
const STORAGE_DIR_NAME: &str = "Storage";

/// Locations the organizer reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Application data root holding the config file and storage folder
    pub app_data: PathBuf,
    /// Folder that physically holds organized files
    pub storage: PathBuf,
    /// The user's desktop
    pub desktop: PathBuf,
}

impl AppPaths {
    /// Resolve the layout from the operating system
    pub fn resolve() -> Result<Self> {
        let base = BaseDirs::new().ok_or(OrganizerError::NoAppDataDir)?;
        let desktop = UserDirs::new()
            .and_then(|dirs| dirs.desktop_dir().map(Path::to_path_buf))
            .unwrap_or_else(|| base.home_dir().join("Desktop"));

        if desktop.as_os_str().is_empty() {
            return Err(OrganizerError::NoDesktopDir);
        }

        Ok(Self::with_root(base.config_dir().join(APP_DIR_NAME), desktop))
    }

    /// Build the layout under an explicit application data root
    pub fn with_root(app_data: PathBuf, desktop: PathBuf) -> Self {
        let storage = app_data.join(STORAGE_DIR_NAME);
        Self {
            app_data,
            storage,
            desktop,
        }
    }

    /// Path of the persisted config document
    pub fn config_file(&self) -> PathBuf {
        self.app_data.join(CONFIG_FILE_NAME)
    }

    /// Create the application data and storage folders if missing
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.app_data, &self.storage] {
            std::fs::create_dir_all(dir)
                .map_err(|e| OrganizerError::io("failed to create", dir.as_path(), e))?;
        }
        Ok(())
    }
}
