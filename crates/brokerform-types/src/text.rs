//! Raw-text encoding of descriptors.
//!
//! Editors and the CLI work on YAML or JSON text. Decoding never touches the
//! engine: callers hand the decoded [`Descriptor`] to the "replace whole
//! descriptor" operation, which rebuilds the structured endpoint views.

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Descriptor;

/// Text formats a descriptor can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Yaml,
    Json,
}

impl TextFormat {
    /// Encodes a descriptor in this format.
    pub fn encode(self, descriptor: &Descriptor) -> Result<String, TextError> {
        match self {
            TextFormat::Yaml => serde_yaml::to_string(descriptor).map_err(TextError::Yaml),
            TextFormat::Json => serde_json::to_string_pretty(descriptor).map_err(TextError::Json),
        }
    }

    /// Decodes a descriptor from text in this format.
    pub fn decode(self, text: &str) -> Result<Descriptor, TextError> {
        match self {
            TextFormat::Yaml => serde_yaml::from_str(text).map_err(TextError::Yaml),
            TextFormat::Json => serde_json::from_str(text).map_err(TextError::Json),
        }
    }

    /// Guesses the format from a file extension, defaulting to YAML.
    pub fn from_extension(extension: Option<&str>) -> Self {
        match extension {
            Some(ext) if ext.eq_ignore_ascii_case("json") => TextFormat::Json,
            _ => TextFormat::Yaml,
        }
    }
}

impl Display for TextFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextFormat::Yaml => write!(f, "yaml"),
            TextFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for TextFormat {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(TextFormat::Yaml),
            "json" => Ok(TextFormat::Json),
            other => Err(TextError::UnknownFormat(other.to_string())),
        }
    }
}

/// Errors raised while converting descriptors to or from text.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    #[error("invalid YAML descriptor: {0}")]
    Yaml(#[source] serde_yaml::Error),

    #[error("invalid JSON descriptor: {0}")]
    Json(#[source] serde_json::Error),

    #[error("unknown descriptor format '{0}' (expected yaml or json)")]
    UnknownFormat(String),
}

/// Encodes a descriptor as YAML.
pub fn to_yaml(descriptor: &Descriptor) -> Result<String, TextError> {
    TextFormat::Yaml.encode(descriptor)
}

/// Decodes a descriptor from YAML.
pub fn from_yaml(text: &str) -> Result<Descriptor, TextError> {
    TextFormat::Yaml.decode(text)
}
