//! Configuration management for Brokerform
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence)
//! 2. Environment variables (`BROKERFORM_*` prefix)
//! 3. brokerform.local.toml (gitignored, local overrides)
//! 4. brokerform.toml (git-tracked, project config)
//! 5. ~/.config/brokerform/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)

use brokerform_types::{Descriptor, ExposeMode, TextFormat};
use serde::{Deserialize, Serialize};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Brokerform configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrokerformConfig {
    pub project: ProjectConfig,
    pub defaults: DescriptorDefaults,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub name: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "brokerform-project".to_string(),
        }
    }
}

/// Values a new-broker descriptor starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptorDefaults {
    pub broker_name: String,
    pub namespace: String,
    pub ingress_domain: String,
    pub replica_count: u32,
    pub console_expose: bool,
    pub console_expose_mode: ExposeMode,
}

impl Default for DescriptorDefaults {
    fn default() -> Self {
        Self {
            broker_name: "ex-aao".to_string(),
            namespace: "default".to_string(),
            ingress_domain: String::new(),
            replica_count: 1,
            console_expose: true,
            console_expose_mode: ExposeMode::Route,
        }
    }
}

impl DescriptorDefaults {
    /// Builds the new-broker descriptor these defaults describe.
    pub fn to_descriptor(&self) -> Descriptor {
        let mut descriptor = Descriptor::with_identity(&self.broker_name, &self.namespace);
        descriptor.ingress_domain.clone_from(&self.ingress_domain);
        descriptor.replica_count = self.replica_count;
        descriptor.console.expose = self.console_expose;
        descriptor.console.expose_mode = Some(self.console_expose_mode);
        descriptor
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: TextFormat,
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: TextFormat::Yaml,
            color: true,
        }
    }
}

impl BrokerformConfig {
    /// Rejects values no descriptor could be built from.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let broker_name = &self.defaults.broker_name;
        if broker_name.is_empty() || broker_name.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "defaults.broker_name '{broker_name}' must be non-empty without whitespace"
            )));
        }
        if self.defaults.namespace.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "defaults.namespace '{}' must not contain whitespace",
                self.defaults.namespace
            )));
        }
        Ok(())
    }

    /// Renders the configuration as a TOML document.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BrokerformConfig::default();
        assert_eq!(config.project.name, "brokerform-project");
        assert_eq!(config.defaults.broker_name, "ex-aao");
        assert_eq!(config.defaults.replica_count, 1);
        assert_eq!(config.output.format, TextFormat::Yaml);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_build_descriptor() {
        let defaults = DescriptorDefaults {
            broker_name: "prod".to_string(),
            namespace: "messaging".to_string(),
            ingress_domain: "apps.example.com".to_string(),
            replica_count: 3,
            console_expose: false,
            console_expose_mode: ExposeMode::Ingress,
        };

        let descriptor = defaults.to_descriptor();

        assert_eq!(descriptor.broker_name(), "prod");
        assert_eq!(descriptor.namespace(), "messaging");
        assert_eq!(descriptor.ingress_domain, "apps.example.com");
        assert_eq!(descriptor.replica_count, 3);
        assert!(!descriptor.console.expose);
        assert_eq!(descriptor.console.expose_mode, Some(ExposeMode::Ingress));
        assert!(descriptor.acceptors.is_empty());
        assert_eq!(descriptor.cert_templates, None);
    }

    #[test]
    fn test_validation_rejects_bad_broker_name() {
        let mut config = BrokerformConfig::default();
        config.defaults.broker_name = "two words".to_string();

        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_toml_rendering() {
        let rendered = BrokerformConfig::default()
            .to_toml_string()
            .expect("default config should render");

        assert!(rendered.contains("[defaults]"));
        assert!(rendered.contains("broker_name = \"ex-aao\""));
        assert!(rendered.contains("console_expose_mode = \"route\""));
    }
}
