//! Error types for the organizer core

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by core operations that the UI needs to surface
#[derive(Debug, Error)]
pub enum OrganizerError {
    #[error("could not determine the application data directory")]
    NoAppDataDir,

    #[error("could not determine the desktop directory")]
    NoDesktopDir,

    #[error("{action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to watch {}: {source}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
}

impl OrganizerError {
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, OrganizerError>;
