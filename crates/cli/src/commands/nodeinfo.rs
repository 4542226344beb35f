//! The `nodeinfo` command - prints the CPU summary parsed from cpuinfo.

use super::print_node_info_text;
use clap::Args;
use hostcaps::ProbeConfig;
use hostcaps::cpuinfo::read_node_info;
use std::path::PathBuf;

#[derive(Args)]
pub struct NodeinfoArgs {
    /// cpuinfo file to parse instead of the configured one
    #[arg(long)]
    cpuinfo: Option<PathBuf>,
}

pub fn run(args: NodeinfoArgs, config: ProbeConfig) -> anyhow::Result<()> {
    let path = args.cpuinfo.unwrap_or(config.cpuinfo_path);
    let info = read_node_info(&path)?;
    print_node_info_text(&info);
    Ok(())
}
