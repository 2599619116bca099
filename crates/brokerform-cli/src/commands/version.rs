//! Version command implementation.

/// Version information for the CLI.
const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() {
    println!("brokerform {VERSION}");
    println!();
    println!("Consistent editing for message broker descriptors.");
    println!();
    println!("Build info:");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
}
