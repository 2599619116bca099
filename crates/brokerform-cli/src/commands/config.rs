//! Configuration management commands.

use std::path::Path;

use anyhow::{Context, Result};
use brokerform_config::{BrokerformConfig, ConfigLoader};

use crate::ConfigFormat;
use crate::style::{print_heading, print_labeled, print_spacer};

/// Show current configuration.
pub fn show(project: &Path, format: ConfigFormat) -> Result<()> {
    let loader = ConfigLoader::new().with_project_dir(project);
    let sources = loader.sources();
    let config = loader.load().context("Failed to load configuration")?;

    match format {
        ConfigFormat::Json => {
            let json = serde_json::to_string_pretty(&config)?;
            println!("{json}");
        }
        ConfigFormat::Toml => {
            let toml_str = config.to_toml_string()?;
            println!("{toml_str}");
        }
        ConfigFormat::Text => print_text(&config, &sources),
    }

    Ok(())
}

fn print_text(config: &BrokerformConfig, sources: &[std::path::PathBuf]) {
    print_heading("Brokerform Configuration");
    print_spacer();

    println!("Sources:");
    if sources.is_empty() {
        println!("  (built-in defaults)");
    }
    for source in sources {
        println!("  {}", source.display());
    }
    print_spacer();

    println!("Project:");
    print_labeled("Name", &config.project.name);
    print_spacer();

    let defaults = &config.defaults;
    println!("Defaults:");
    print_labeled("Broker name", &defaults.broker_name);
    print_labeled("Namespace", &defaults.namespace);
    print_labeled("Ingress domain", &defaults.ingress_domain);
    print_labeled("Replicas", &defaults.replica_count.to_string());
    print_labeled("Console exposed", &defaults.console_expose.to_string());
    print_labeled("Console expose mode", &defaults.console_expose_mode.to_string());
    print_spacer();

    println!("Output:");
    print_labeled("Format", &config.output.format.to_string());
    print_labeled("Color", &config.output.color.to_string());
}
