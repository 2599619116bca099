//! Configuration loader with multi-source merging

use crate::{BrokerformConfig, Paths};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Prefix of environment overrides (BROKERFORM_DEFAULTS__NAMESPACE=...)
const ENV_PREFIX: &str = "BROKERFORM";

/// Configuration loader with builder pattern
pub struct ConfigLoader {
    project_dir: PathBuf,
    user_config: bool,
}

impl ConfigLoader {
    /// Create a new config loader with default project directory (current dir)
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            user_config: true,
        }
    }

    /// Set the project directory
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Skip ~/.config/brokerform/config.toml
    pub fn without_user_config(mut self) -> Self {
        self.user_config = false;
        self
    }

    /// Config files that exist and would be merged, lowest precedence first
    pub fn sources(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();

        if self.user_config {
            if let Ok(user_config_file) = Paths::new().user_config_file() {
                files.push(user_config_file);
            }
        }
        files.push(Paths::project_config_file(&self.project_dir));
        files.push(Paths::local_config_file(&self.project_dir));

        files.retain(|file| file.exists());
        files
    }

    /// Load configuration from all sources with proper precedence
    pub fn load(self) -> Result<BrokerformConfig> {
        let mut builder = config::Config::builder();

        // 1. Start with built-in defaults
        let defaults = BrokerformConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2-4. User, project and local config files
        for file in self.sources() {
            builder = builder.add_source(
                config::File::from(file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // 5. Environment variables (BROKERFORM_DEFAULTS__BROKER_NAME=...)
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // Build and deserialize
        let config = builder.build().context("Failed to build configuration")?;

        let brokerform_config: BrokerformConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        brokerform_config
            .validate()
            .context("Configuration failed validation")?;

        Ok(brokerform_config)
    }

    /// Load configuration or return defaults if not found
    pub fn load_or_default(self) -> BrokerformConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brokerform_types::{ExposeMode, TextFormat};
    use std::fs;
    use tempfile::tempdir;

    fn loader(project_dir: &Path) -> ConfigLoader {
        ConfigLoader::new()
            .with_project_dir(project_dir)
            .without_user_config()
    }

    #[test]
    fn test_load_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = loader(temp_dir.path())
            .load()
            .expect("Failed to load config");

        assert_eq!(config, BrokerformConfig::default());
    }

    #[test]
    fn test_load_project_config() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        let config_content = r#"
[project]
name = "test-project"

[defaults]
broker_name = "prod"
namespace = "messaging"
ingress_domain = "apps.example.com"
replica_count = 3
console_expose_mode = "ingress"

[output]
format = "json"
"#;
        fs::write(project_dir.join("brokerform.toml"), config_content)
            .expect("Failed to write config");

        let config = loader(project_dir).load().expect("Failed to load config");

        assert_eq!(config.project.name, "test-project");
        assert_eq!(config.defaults.broker_name, "prod");
        assert_eq!(config.defaults.namespace, "messaging");
        assert_eq!(config.defaults.replica_count, 3);
        assert_eq!(config.defaults.console_expose_mode, ExposeMode::Ingress);
        assert_eq!(config.output.format, TextFormat::Json);
        // Untouched keys keep their defaults
        assert!(config.defaults.console_expose);
    }

    #[test]
    fn test_local_overrides() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("brokerform.toml"),
            r#"
[defaults]
namespace = "staging"
"#,
        )
        .expect("Failed to write project config");

        fs::write(
            project_dir.join("brokerform.local.toml"),
            r#"
[defaults]
namespace = "dev-alice"
"#,
        )
        .expect("Failed to write local config");

        let config = loader(project_dir).load().expect("Failed to load config");

        // Local config should override project config
        assert_eq!(config.defaults.namespace, "dev-alice");
    }

    #[test]
    fn test_sources_lists_existing_files_in_order() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        assert!(loader(project_dir).sources().is_empty());

        fs::write(project_dir.join("brokerform.local.toml"), "")
            .expect("Failed to write local config");
        fs::write(project_dir.join("brokerform.toml"), "")
            .expect("Failed to write project config");

        assert_eq!(
            loader(project_dir).sources(),
            vec![
                project_dir.join("brokerform.toml"),
                project_dir.join("brokerform.local.toml"),
            ]
        );
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let project_dir = temp_dir.path();

        fs::write(
            project_dir.join("brokerform.toml"),
            "[defaults]\nbroker_name = \"\"\n",
        )
        .expect("Failed to write config");

        assert!(loader(project_dir).load().is_err());
    }

    // Environment variables are not exercised here: the loader reads the
    // process environment, which tests share. In actual usage:
    //
    // BROKERFORM_DEFAULTS__NAMESPACE=messaging
    // BROKERFORM_OUTPUT__FORMAT=json
    //
    // override the corresponding config file values.
}
