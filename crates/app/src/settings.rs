use std::path::PathBuf;

use serde::Deserialize;

use crate::{cli::Overrides, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/corrida.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding one file per storage key.
    pub data_dir: PathBuf,
    /// IANA timezone used for day and month windows; empty means the
    /// process local timezone.
    pub timezone: String,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            timezone: String::new(),
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// File, then `CORRIDA_*` environment variables, then command line.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut builder = config::Config::builder();
        builder = builder.add_source(config::File::with_name(config_path).required(false));
        builder = builder.add_source(config::Environment::with_prefix("CORRIDA"));
        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if let Some(data_dir) = &overrides.data_dir {
            settings.data_dir = data_dir.clone();
        }
        if let Some(timezone) = &overrides.timezone {
            settings.timezone = timezone.clone();
        }
        if let Some(level) = &overrides.log_level {
            settings.log_level = level.clone();
        }

        Ok(settings)
    }
}
