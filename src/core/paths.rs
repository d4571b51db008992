//! Centralized path helpers for config, cache, and data directories.

use std::path::PathBuf;

use crate::core::app;

/// Project directories (config, cache, data) from the standard platform locations.
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("io", app::VENDOR, app::NAME)
}

/// Override a directory for tests via env var.
#[cfg(test)]
fn test_dir_override(var: &str) -> Option<PathBuf> {
    std::env::var(var).ok().map(PathBuf::from)
}

/// Config directory (~/.config/prompt-booster/).
/// In tests, set `TEST_CONFIG_DIR` env var to override.
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(test)]
    if let Some(p) = test_dir_override("TEST_CONFIG_DIR") {
        return Some(p);
    }
    project_dirs().map(|d| d.config_dir().to_path_buf())
}

/// Cache directory (~/.cache/prompt-booster/), used for HTML exports.
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|d| d.cache_dir().to_path_buf())
}

/// Data directory holding the history slot (~/.local/share/prompt-booster/).
/// In tests, set `TEST_DATA_DIR` env var to override.
pub fn data_dir() -> Option<PathBuf> {
    #[cfg(test)]
    if let Some(p) = test_dir_override("TEST_DATA_DIR") {
        return Some(p);
    }
    project_dirs().map(|d| d.data_dir().to_path_buf())
}
