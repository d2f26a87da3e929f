use std::{collections::HashMap, path::PathBuf};

pub use config::ConfigError;
pub use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub static CONFIG_FILE_ENV_VAR: &str = "OVAL_CONFIG";
pub static CONFIG_ENV_PREFIX: &str = "OVAL";
pub static CONFIG_ENV_SEPARATOR: &str = "__";

/// A configuration section.
///
/// Sources are layered in increasing priority: the serialized `Default`,
/// the TOML file named by `OVAL_CONFIG` (`config.toml` if unset), and
/// environment variables such as `OVAL__LOG__CONSOLE_LEVEL`.
pub trait Config: DeserializeOwned + Serialize + Default {
    fn section_name() -> &'static str;

    fn load() -> Result<Self, ConfigError> {
        ConfigLoader::load_cfg(Self::section_name())
    }

    fn load_or_default() -> Result<Self, ConfigError> {
        ConfigLoader::load_cfg_or_default(Self::section_name(), Self::default())
    }
}

pub struct ConfigLoader {}

impl ConfigLoader {
    fn config_file() -> String {
        std::env::var(CONFIG_FILE_ENV_VAR).unwrap_or_else(|_| "config.toml".to_string())
    }

    fn env_source() -> config::Environment {
        config::Environment::with_prefix(CONFIG_ENV_PREFIX)
            .separator(CONFIG_ENV_SEPARATOR)
            .try_parsing(true)
    }

    pub fn load_cfg_or_default<T: Config>(section: &str, default: T) -> Result<T, ConfigError> {
        // defaults are nested under the section so that partial overrides merge
        let nested = HashMap::from([(section, &default)]);
        let default_source = config::Config::try_from(&nested)?;
        let cfg = config::Config::builder()
            .add_source(default_source)
            .add_source(
                config::File::new(&Self::config_file(), config::FileFormat::Toml).required(false),
            )
            .add_source(Self::env_source())
            .build()?;
        match cfg.get(section) {
            Ok(c) => Ok(c),
            Err(ConfigError::NotFound(_)) => Ok(default),
            Err(e) => Err(e),
        }
    }

    pub fn load_cfg<T: Config>(section: &str) -> Result<T, ConfigError> {
        let cfg = config::Config::builder()
            .add_source(
                config::File::new(&Self::config_file(), config::FileFormat::Toml).required(false),
            )
            .add_source(Self::env_source())
            .build()?;
        cfg.get(section)
    }
}

/// Loads `.env` from the working directory (or a parent) into the process
/// environment. A missing file is not an error.
pub fn load_dotenv() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}
