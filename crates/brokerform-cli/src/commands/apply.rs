//! Apply command implementation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use brokerform_kernel::{Command, apply, check_invariants};
use brokerform_types::TextFormat;
use tracing::{debug, info};

use super::{hydrate, read_descriptor, short_fingerprint, write_document};
use crate::style::{print_hint, print_success, print_warn};

/// Folds a list of operations over a descriptor and writes the result.
pub fn run(
    descriptor_path: &Path,
    ops_path: &Path,
    format: Option<TextFormat>,
    output: Option<&Path>,
) -> Result<()> {
    let (descriptor, input_format) = read_descriptor(descriptor_path)?;
    let commands = read_commands(ops_path)?;

    let initial = hydrate(descriptor);
    let before = initial.fingerprint();

    let mut form = initial;
    let mut ignored = 0usize;
    for (index, cmd) in commands.into_iter().enumerate() {
        let kind = cmd.kind();
        let bookkeeping = cmd.is_bookkeeping();
        let next = apply(&form, cmd);

        if !bookkeeping && next.descriptor() == form.descriptor() {
            ignored += 1;
            print_warn(&format!("operation {} ({kind}) had no effect", index + 1));
        } else {
            debug!(index, kind, "applied operation");
        }
        form = next;
    }

    if let Err(violation) = check_invariants(form.descriptor()) {
        bail!("Result violates a descriptor invariant: {violation}");
    }

    let after = form.fingerprint();
    let format = format.unwrap_or(input_format);
    let text = format
        .encode(form.descriptor())
        .context("Failed to encode descriptor")?;
    write_document(&text, output)?;

    if before == after {
        print_success("Descriptor unchanged");
    } else {
        info!(
            before = %short_fingerprint(before),
            after = %short_fingerprint(after),
            "descriptor changed"
        );
        print_success(&format!(
            "Descriptor updated ({} → {})",
            short_fingerprint(before),
            short_fingerprint(after)
        ));
    }
    if ignored > 0 {
        print_hint("Operations on missing endpoints, taken names and taken ports are ignored");
    }

    Ok(())
}

fn read_commands(path: &Path) -> Result<Vec<Command>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read operations {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse operations {}", path.display()))
}
