//! CLI command implementations.

pub mod apply;
pub mod check;
pub mod config;
pub mod inspect;
pub mod new;
pub mod version;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use brokerform_kernel::{Command, FormState, ReplaceOrigin, apply};
use brokerform_types::{Descriptor, TextFormat};

/// Reads a descriptor file, guessing the format from its extension.
pub fn read_descriptor(path: &Path) -> Result<(Descriptor, TextFormat)> {
    let format = TextFormat::from_extension(path.extension().and_then(|e| e.to_str()));
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read descriptor {}", path.display()))?;
    let descriptor = format
        .decode(&text)
        .with_context(|| format!("Failed to parse {format} descriptor {}", path.display()))?;
    Ok((descriptor, format))
}

/// Hydrates a descriptor the way a remote fetch does.
pub fn hydrate(descriptor: Descriptor) -> FormState {
    apply(
        &FormState::default(),
        Command::replace_descriptor(descriptor, ReplaceOrigin::System),
    )
}

/// Writes a document to `output`, or to stdout.
pub fn write_document(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            print!("{text}");
            if !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

/// Short hex form of a fingerprint.
pub fn short_fingerprint(bytes: [u8; 32]) -> String {
    let hex = blake3::Hash::from(bytes).to_hex();
    hex.as_str()[..16].to_string()
}
