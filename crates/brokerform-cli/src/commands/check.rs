//! Check command implementation.

use std::path::Path;

use anyhow::{Result, bail};
use brokerform_kernel::collect_violations;

use super::{hydrate, read_descriptor};
use crate::style::{print_error, print_success, print_warn};

/// Verifies a descriptor's invariants after hydration.
pub fn run(descriptor_path: &Path) -> Result<()> {
    let (descriptor, _) = read_descriptor(descriptor_path)?;
    let raw_properties = descriptor.raw_properties.clone();

    let form = hydrate(descriptor);
    if form.descriptor().raw_properties != raw_properties {
        print_warn("rawProperties were re-projected on load (missing or repeated factoryClassName)");
    }

    let violations = collect_violations(form.descriptor());
    if violations.is_empty() {
        print_success(&format!("{} is consistent", descriptor_path.display()));
        return Ok(());
    }

    for violation in &violations {
        print_error(&violation.to_string());
    }
    bail!(
        "{} invariant violation(s) in {}",
        violations.len(),
        descriptor_path.display()
    )
}
