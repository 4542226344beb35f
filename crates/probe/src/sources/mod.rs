//! Concrete host, topology and capability string sources.

mod cpuid;
mod sysfs;
mod xen;

pub use cpuid::{CpuidHostInfo, StaticHostInfo};
pub use sysfs::{SysfsTopology, parse_cpulist};
pub use xen::{StaticCapabilities, XenSysfsCapabilities};
