//! Hypervisor host capability discovery.
//!
//! hostcaps inspects the host it runs on and describes what kinds of guests
//! a Xen hypervisor there can create:
//!
//! - **Host features**: CPU feature bits such as PAE, plus host-wide flags
//! - **NUMA topology**: cells with their memory and CPUs, including which
//!   CPUs are hyperthread siblings
//! - **Guests**: every supported (architecture, mode) pair with its machine
//!   type, emulator, firmware and optional features
//!
//! When the host exposes no NUMA topology, a summary parsed from
//! `/proc/cpuinfo` is reported instead.
//!
//! # Example
//!
//! ```no_run
//! use hostcaps::{Arch, OsType, ProbeConfig};
//!
//! let model = hostcaps::probe(&ProbeConfig::default())?;
//! if model.supports(OsType::Hvm, &Arch::X86_64) {
//!     println!("fully-virtualized x86_64 guests are available");
//! }
//! # Ok::<(), hostcaps::Error>(())
//! ```

mod assembler;
pub mod cpuinfo;
pub mod emulator;
pub mod guests;
pub mod host;
pub mod numa;
pub mod sources;

pub use assembler::CapabilityProbe;
pub use emulator::{EmulatorKind, detect_emulator_kind};
pub use guests::{GuestArch, GuestCapabilityParser, guest_descriptors};

pub use hostcaps_core::{
    Arch, CapabilityModel, CpuDescriptor, CpuSet, Error, GuestDescriptor, GuestFeature,
    HostCapabilities, NodeInfo, NumaCell, OsType, ProbeConfig, Result,
};

use hostcaps_core::CapabilityStringSource;
use sources::{CpuidHostInfo, StaticCapabilities, SysfsTopology, XenSysfsCapabilities};

/// Probes the running host with the real collaborators.
///
/// A capability string set in `config` replaces the hypervisor query.
pub fn probe(config: &ProbeConfig) -> Result<CapabilityModel> {
    let host_info = CpuidHostInfo::new();
    let topology = SysfsTopology::new(&config.sysfs_root);
    let capabilities: Box<dyn CapabilityStringSource> = match &config.capabilities {
        Some(caps) => Box::new(StaticCapabilities(caps.clone())),
        None => Box::new(XenSysfsCapabilities::new(&config.sysfs_root)),
    };

    CapabilityProbe::new(
        &host_info,
        &topology,
        capabilities.as_ref(),
        host::host_arch(),
        config.clone(),
    )
    .build()
}
