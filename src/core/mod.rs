//! Ambient pieces shared by every component: configuration and
//! crash-safe file writes.

mod config;
mod fs;

pub use config::{
    redact_url, Config, DatabaseConfig, PathsConfig, ENV_DB_URL, ENV_DB_URL_LEGACY, ENV_SNAPSHOT,
    LOCAL_CONFIG_FILE,
};
pub use fs::{write_file_atomic, write_json_atomic};
