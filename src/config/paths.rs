use crate::config::ConfigError;
use std::path::{Path, PathBuf};

pub const STATE_DIR: &str = ".appseed";
pub const SETTINGS_FILE_NAME: &str = "settings.yaml";
pub const WORKDIRS_DIR: &str = "workdirs";

pub fn resolve_state_root() -> Result<PathBuf, ConfigError> {
    if let Some(root) = std::env::var_os("APPSEED_STATE_ROOT") {
        let root = PathBuf::from(root);
        if !root.as_os_str().is_empty() {
            return Ok(root);
        }
    }
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home).join(STATE_DIR))
}

pub fn settings_path(state_root: &Path) -> PathBuf {
    state_root.join(SETTINGS_FILE_NAME)
}
