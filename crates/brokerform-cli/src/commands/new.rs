//! New-descriptor command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use brokerform_config::ConfigLoader;
use brokerform_types::TextFormat;
use tracing::debug;

use super::{hydrate, write_document};

/// Prints a fresh descriptor built from configured defaults.
pub fn run(
    project: &Path,
    name: Option<String>,
    namespace: Option<String>,
    format: Option<TextFormat>,
) -> Result<()> {
    let config = ConfigLoader::new()
        .with_project_dir(project)
        .load()
        .context("Failed to load configuration")?;

    let mut descriptor = config.defaults.to_descriptor();
    if let Some(name) = name {
        descriptor.identity.name = name;
    }
    if let Some(namespace) = namespace {
        descriptor.identity.namespace = namespace;
    }
    debug!(broker = descriptor.broker_name(), "creating descriptor");

    let form = hydrate(descriptor);
    let format = format.unwrap_or(config.output.format);
    let text = format
        .encode(form.descriptor())
        .context("Failed to encode descriptor")?;

    write_document(&text, None)
}
