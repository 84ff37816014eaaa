use super::{settings_path, ConfigError, Settings};
use std::path::Path;

pub fn load_settings(state_root: &Path) -> Result<Settings, ConfigError> {
    let path = settings_path(state_root);
    let settings = Settings::from_path(&path)?;
    settings.validate()?;
    Ok(settings)
}

pub fn settings_file_exists(state_root: &Path) -> bool {
    settings_path(state_root).is_file()
}
