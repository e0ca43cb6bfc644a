//! Configuration loading.
//!
//! Settings come from `vue2san.config.json` (in the working directory, or the
//! file given by `--config`) and are then overridden by CLI flags.

use crate::cli::Args;
use camino::{Utf8Path, Utf8PathBuf};
use san_transformer::ConvertOptions;
use serde::Deserialize;
use std::fs;
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "vue2san.config.json";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid.
    #[error("invalid config {path}: {source}")]
    Parse {
        path: Utf8PathBuf,
        source: serde_json::Error,
    },
}

/// The contents of a `vue2san.config.json` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FileConfig {
    /// Constructor identifiers recognized as components.
    pub constructors: Option<Vec<String>>,
    /// Component factory expression.
    pub factory: Option<String>,
    /// Data store accessor name.
    pub data_accessor: Option<String>,
    /// Initializer field name.
    pub initializer: Option<String>,
    /// Glob patterns to ignore.
    pub ignore: Vec<String>,
}

impl FileConfig {
    /// Parses a config file.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }
}

/// Effective settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub options: ConvertOptions,
    pub ignore: Vec<String>,
}

impl Settings {
    /// Resolves settings from the config file (if any) and CLI flags.
    pub fn resolve(args: &Args, cwd: &Utf8Path) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => {
                let default_path = cwd.join(CONFIG_FILE_NAME);
                if default_path.is_file() {
                    FileConfig::load(&default_path)?
                } else {
                    FileConfig::default()
                }
            }
        };

        let mut options = ConvertOptions::default();
        if let Some(constructors) = file.constructors {
            options.constructors = constructors;
        }
        if let Some(factory) = file.factory {
            options.component_factory = factory;
        }
        if let Some(accessor) = file.data_accessor {
            options.data_accessor = accessor;
        }
        if let Some(initializer) = file.initializer {
            options.initializer = initializer;
        }

        if !args.constructors.is_empty() {
            options.constructors = args.constructors.clone();
        }
        if let Some(factory) = &args.factory {
            options.component_factory = factory.clone();
        }

        let mut ignore = file.ignore;
        ignore.extend(args.ignore.iter().cloned());

        Ok(Self { options, ignore })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn temp_dir() -> (TempDir, Utf8PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_defaults_without_config_file() {
        let (_dir, cwd) = temp_dir();
        let args = Args::parse_from(["vue2san"]);
        let settings = Settings::resolve(&args, &cwd).unwrap();
        assert_eq!(settings.options, ConvertOptions::default());
        assert!(settings.ignore.is_empty());
    }

    #[test]
    fn test_config_file_in_working_directory() {
        let (_dir, cwd) = temp_dir();
        fs::write(
            cwd.join(CONFIG_FILE_NAME),
            r#"{ "constructors": ["App"], "dataAccessor": "store", "ignore": ["legacy/**"] }"#,
        )
        .unwrap();

        let args = Args::parse_from(["vue2san", "--ignore", "tmp/**"]);
        let settings = Settings::resolve(&args, &cwd).unwrap();
        assert_eq!(settings.options.constructors, vec!["App"]);
        assert_eq!(settings.options.data_accessor, "store");
        assert_eq!(settings.options.component_factory, "San.defineComponent");
        assert_eq!(settings.ignore, vec!["legacy/**", "tmp/**"]);
    }

    #[test]
    fn test_flags_override_config_file() {
        let (_dir, cwd) = temp_dir();
        let config = cwd.join("custom.json");
        fs::write(&config, r#"{ "factory": "a.b", "constructors": ["App"] }"#).unwrap();

        let args = Args::parse_from([
            "vue2san",
            "--config",
            config.as_str(),
            "--factory",
            "c.d",
        ]);
        let settings = Settings::resolve(&args, &cwd).unwrap();
        assert_eq!(settings.options.component_factory, "c.d");
        assert_eq!(settings.options.constructors, vec!["App"]);
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let (_dir, cwd) = temp_dir();
        let config = cwd.join("bad.json");
        fs::write(&config, r#"{ "factroy": "a.b" }"#).unwrap();
        assert!(matches!(
            FileConfig::load(&config),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_explicit_config() {
        let (_dir, cwd) = temp_dir();
        let args = Args::parse_from(["vue2san", "--config", "does-not-exist.json"]);
        assert!(matches!(
            Settings::resolve(&args, &cwd),
            Err(ConfigError::Read { .. })
        ));
    }
}
