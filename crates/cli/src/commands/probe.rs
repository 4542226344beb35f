//! The `probe` command - builds and prints the host capability model.

use super::{print_guests_text, print_node_info_text, yes_no};
use clap::Args;
use hostcaps::{CapabilityModel, ProbeConfig};

#[derive(Args)]
pub struct ProbeArgs {
    /// Use this capability string instead of asking the hypervisor
    #[arg(long)]
    capabilities: Option<String>,
}

pub fn run(args: ProbeArgs, mut config: ProbeConfig) -> anyhow::Result<()> {
    if args.capabilities.is_some() {
        config.capabilities = args.capabilities;
    }

    let model = hostcaps::probe(&config)?;
    print_model_text(&model);
    Ok(())
}

fn print_model_text(model: &CapabilityModel) {
    let host = &model.host;
    println!("Host:");
    println!("  arch:           {}", host.arch);
    let features: Vec<&str> = host.features.keys().map(String::as_str).collect();
    println!(
        "  features:       {}",
        if features.is_empty() { "(none)".to_string() } else { features.join(" ") }
    );
    if let Some(prefix) = &host.net_prefix {
        println!("  net prefix:     {prefix}");
    }
    println!("  live migration: {}", yes_no(host.live_migration));
    println!("  save/restore:   {}", yes_no(host.save_restore));
    println!();

    match &model.node_info {
        Some(info) => {
            println!("Topology (from cpuinfo):");
            print_node_info_text(info);
        }
        None => {
            println!("Topology: {} cell(s)", model.cells.len());
            for cell in &model.cells {
                println!(
                    "  cell {}: {} KiB, {} CPU(s)",
                    cell.id,
                    cell.memory_kib,
                    cell.cpus.len()
                );
                for cpu in &cell.cpus {
                    println!(
                        "    cpu {:<4} socket {:<3} core {:<3} siblings {}",
                        cpu.id, cpu.socket_id, cpu.core_id, cpu.siblings
                    );
                }
            }
        }
    }
    println!(
        "Total: {} CPU(s), {} KiB",
        model.total_cpus(),
        model.total_memory_kib()
    );
    println!();

    print_guests_text(&model.guests);
}
