use std::{collections::HashMap, env, path::Path};

use super::env::{
    AppConfig, ConfigError, DEFAULT_OPENAI_BASE_URL, DirectoryConfig, LoggingConfig, OpenAiConfig,
};

/// Loads the settings file (if present) and lets real environment variables
/// override it.
pub fn load_config(settings_path: &Path) -> Result<AppConfig, ConfigError> {
    let file_values = read_settings_file(settings_path)?;
    Ok(AppConfig::from_sources(&file_values, |key| env::var(key).ok()))
}

fn read_settings_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(err) if err.not_found() => {
            tracing::warn!(target: "config", path = %path.display(), "settings file not found");
            return Ok(HashMap::new());
        }
        Err(source) => {
            return Err(ConfigError::Settings {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    iter.collect::<Result<HashMap<_, _>, _>>()
        .map_err(|source| ConfigError::Settings {
            path: path.to_path_buf(),
            source,
        })
}

impl AppConfig {
    fn from_sources<F>(file: &HashMap<String, String>, env_lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| {
            env_lookup(key)
                .filter(|v| !v.is_empty())
                .or_else(|| file.get(key).cloned().filter(|v| !v.is_empty()))
        };

        let openai = OpenAiConfig {
            api_key: lookup("OPENAI_API_KEY"),
            base_url: lookup("OPENAI_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
        };

        let directories = DirectoryConfig {
            logs_dir: lookup("LOGS_DIR").unwrap_or_else(|| "logs".to_string()),
        };

        let logging = LoggingConfig {
            level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        };

        Self {
            openai,
            directories,
            logging,
        }
    }
}
