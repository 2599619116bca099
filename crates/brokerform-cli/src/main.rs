//! Brokerform CLI.
//!
//! Edits broker descriptors offline with the same transition engine the
//! console uses.
//!
//! # Quick Start
//!
//! ```bash
//! # Start a descriptor from configured defaults
//! brokerform new --name ex-aao --namespace messaging > broker.yaml
//!
//! # Apply a list of operations
//! brokerform apply broker.yaml --ops ops.json --output broker.yaml
//!
//! # Look at the result
//! brokerform inspect broker.yaml
//! ```

mod commands;
mod style;

use std::path::PathBuf;

use anyhow::Result;
use brokerform_config::ConfigLoader;
use brokerform_types::TextFormat;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Brokerform - edit message broker descriptors consistently.
#[derive(Parser)]
#[command(name = "brokerform")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Print a new broker descriptor built from configured defaults.
    New {
        /// Broker name (overrides defaults.broker_name).
        #[arg(long)]
        name: Option<String>,

        /// Namespace (overrides defaults.namespace).
        #[arg(long)]
        namespace: Option<String>,

        /// Output format (yaml, json).
        #[arg(short, long)]
        format: Option<TextFormat>,

        /// Project directory to read brokerform.toml from.
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },

    /// Apply a JSON list of operations to a descriptor.
    Apply {
        /// Descriptor file (YAML or JSON).
        descriptor: PathBuf,

        /// JSON file holding the operations, in order.
        #[arg(long)]
        ops: PathBuf,

        /// Output format (defaults to the input's format).
        #[arg(short, long)]
        format: Option<TextFormat>,

        /// Write the result here instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Verify a descriptor's structural invariants.
    Check {
        /// Descriptor file (YAML or JSON).
        descriptor: PathBuf,
    },

    /// Show endpoints and certificate templates of a descriptor.
    Inspect {
        /// Descriptor file (YAML or JSON).
        descriptor: PathBuf,
    },

    /// Configuration commands.
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the merged configuration.
    Show {
        /// Output format.
        #[arg(short, long, value_enum, default_value_t = ConfigFormat::Text)]
        format: ConfigFormat,

        /// Project directory.
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },
}

/// Formats `config show` can print.
#[derive(Clone, Copy, ValueEnum)]
enum ConfigFormat {
    Text,
    Json,
    Toml,
}

fn main() -> Result<()> {
    // Logs go to stderr; stdout carries documents
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let color = ConfigLoader::new().load_or_default().output.color;
    style::set_no_color(cli.no_color || !color || std::env::var_os("NO_COLOR").is_some());

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::New {
            name,
            namespace,
            format,
            project,
        } => commands::new::run(&project, name, namespace, format),
        Commands::Apply {
            descriptor,
            ops,
            format,
            output,
        } => commands::apply::run(&descriptor, &ops, format, output.as_deref()),
        Commands::Check { descriptor } => commands::check::run(&descriptor),
        Commands::Inspect { descriptor } => commands::inspect::run(&descriptor),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { format, project } => commands::config::show(&project, format),
        },
    }
}
