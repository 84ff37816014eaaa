mod error;
mod load;
mod paths;
mod save;
mod settings;
mod validate;

pub use error::ConfigError;
pub use load::{load_settings, settings_file_exists};
pub use paths::{resolve_state_root, settings_path, SETTINGS_FILE_NAME, STATE_DIR, WORKDIRS_DIR};
pub use save::save_settings;
pub use settings::{
    Settings, DEFAULT_API_BASE, DEFAULT_ARCHITECT_MODEL, DEFAULT_GENERATOR_MODEL,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT_SECONDS,
};
pub use validate::validate_settings;
