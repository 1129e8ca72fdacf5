//! Application paths for persisted usage stats.

use directories::ProjectDirs;
use std::path::PathBuf;

/// Application paths.
pub struct AppPaths {
    /// Data directory.
    pub data: PathBuf,
}

impl AppPaths {
    /// Create paths for llmkit.
    #[must_use]
    pub fn new() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("dev", "llmkit", "llmkit") {
            Self {
                data: proj_dirs.data_dir().to_path_buf(),
            }
        } else {
            // Fallback to home directory
            let home = home_dir().unwrap_or_else(|| PathBuf::from("."));
            Self {
                data: home.join(".local/share/llmkit"),
            }
        }
    }

    /// Directory holding usage-stats files.
    #[must_use]
    pub fn usage_dir(&self) -> PathBuf {
        self.data.join("usage")
    }

    /// Ensure all directories exist.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.usage_dir())?;
        Ok(())
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf())
}
