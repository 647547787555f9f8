use crate::config::default_file_prefix;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use directories::{ProjectDirs, UserDirs};

/// Where finished recordings go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Recordings directory.
    #[serde(default = "default_directory")]
    pub directory: PathBuf,

    /// File name prefix for saved recordings.
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_directory(),
            file_prefix: default_file_prefix(),
        }
    }
}

/// The user's video directory, else the app data directory.
fn default_directory() -> PathBuf {
    let videos = UserDirs::new().and_then(|dirs| dirs.video_dir().map(|d| d.join("Capture Relay")));
    if let Some(videos) = videos {
        return videos;
    }
    ProjectDirs::from("com", "capture-relay", "Capture-Relay")
        .map(|dirs| dirs.data_dir().join("recordings"))
        .unwrap_or_else(|| PathBuf::from("recordings"))
}
