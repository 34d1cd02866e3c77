//! User preferences, application metadata and API credentials

mod merge;
mod store;
mod types;

pub use store::{
    API_KEY_ENV, CONFIG_DIR_NAME, CONFIG_FILE, CREDENTIALS_FILE, ConfigStore,
};
pub use types::{
    AppConfig, ConfigFile, Credentials, ImageQuality, LOG_LEVELS, MaxImageSize, UserConfig,
    UserConfigUpdate,
};
