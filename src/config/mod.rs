use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::{currency::MoneyAmount, errors::ConfigError};

const CONFIG_DIR: &str = "config";
const CONFIG_FILE: &str = "config.json";
const APP_DIR: &str = "box_office";
const TMP_SUFFIX: &str = "tmp";

/// Overrides the base directory used for configuration.
pub const HOME_ENV: &str = "BOX_OFFICE_HOME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_symbol")]
    pub currency_symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_price: Option<MoneyAmount>,
    #[serde(default)]
    pub screen_reader_mode: bool,
    #[serde(default)]
    pub high_contrast_mode: bool,
    #[serde(default)]
    pub quiet_mode: bool,
}

fn default_symbol() -> String {
    "€".into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            currency_symbol: default_symbol(),
            default_price: None,
            screen_reader_mode: false,
            high_contrast_mode: false,
            quiet_mode: false,
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Resolves the base directory from `BOX_OFFICE_HOME`, falling back to
    /// the platform configuration directory.
    pub fn new() -> Result<Self, ConfigError> {
        let base = match env::var_os(HOME_ENV) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(ConfigError::MissingBaseDir)?,
        };
        Ok(Self::with_base_dir(base))
    }

    pub fn with_base_dir(base: impl AsRef<Path>) -> Self {
        Self {
            path: base.as_ref().join(CONFIG_DIR).join(CONFIG_FILE),
        }
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        if self.path.exists() {
            debug!(path = %self.path.display(), "loading configuration");
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            debug!(path = %self.path.display(), "no configuration file, using defaults");
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "configuration saved");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), ConfigError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
