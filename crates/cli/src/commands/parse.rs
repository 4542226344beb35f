//! The `parse` command - turns a capability string into guest descriptors.

use super::print_guests_text;
use clap::Args;
use hostcaps::{GuestCapabilityParser, ProbeConfig, guest_descriptors};

#[derive(Args)]
pub struct ParseArgs {
    /// Space-separated capability string, e.g. "xen-3.0-x86_64 hvm-3.0-x86_32p"
    capabilities: String,
}

pub fn run(args: ParseArgs, config: ProbeConfig) -> anyhow::Result<()> {
    let parser = GuestCapabilityParser::new(config.max_guest_archs)?;
    let archs = parser.parse(&args.capabilities);
    tracing::debug!(count = archs.len(), "Parsed guest architectures");

    print_guests_text(&guest_descriptors(&archs, &config));
    Ok(())
}
