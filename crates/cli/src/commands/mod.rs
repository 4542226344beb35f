pub mod emulator;
pub mod nodeinfo;
pub mod parse;
pub mod probe;
pub mod version;

use hostcaps::{GuestDescriptor, NodeInfo};

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

fn print_guests_text(guests: &[GuestDescriptor]) {
    println!("Guests:");
    if guests.is_empty() {
        println!("  (none)");
        return;
    }

    for guest in guests {
        println!("  {} {} ({})", guest.os_type, guest.arch, guest.domain_type);
        println!("    machine:  {}", guest.machine);
        println!("    emulator: {}", guest.emulator.display());
        if let Some(loader) = &guest.loader {
            println!("    loader:   {}", loader.display());
        }
        for feature in &guest.features {
            println!(
                "    feature:  {:<8} default {:<3} toggle {}",
                feature.name,
                if feature.default_on { "on" } else { "off" },
                yes_no(feature.toggle)
            );
        }
    }
}

fn print_node_info_text(info: &NodeInfo) {
    println!("Model:   {}", info.model);
    println!("CPUs:    {}", info.cpus);
    println!("MHz:     {}", info.mhz);
    println!("Nodes:   {}", info.nodes);
    println!("Sockets: {}", info.sockets);
    println!("Cores:   {}", info.cores);
    println!("Threads: {}", info.threads);
    println!("Memory:  {} KiB", info.memory_kib);
}
