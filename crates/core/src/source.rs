//! Narrow interfaces to the host and hypervisor queries the probe relies on.
//!
//! The raw record types mirror what hypervisor control libraries hand back:
//! parallel arrays with sentinel values marking offline or absent entries.

use crate::error::Result;

/// Core id marking a CPU entry as offline or absent.
pub const CPUTOPOLOGY_INVALID_ENTRY: u32 = u32::MAX;

/// Memory size marking a node entry as absent.
pub const NUMAINFO_INVALID_ENTRY: u64 = u64::MAX;

/// Raw physical host information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhysInfo {
    /// Feature bitmask as 32-bit words. The layout is architecture specific;
    /// on x86 word 0 is CPUID leaf 1 EDX.
    pub hw_cap: Vec<u32>,
}

/// Topology record for one logical CPU, indexed by CPU id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCpuTopology {
    pub core: u32,
    pub socket: u32,
    pub node: u32,
}

impl RawCpuTopology {
    pub const INVALID: Self = Self {
        core: CPUTOPOLOGY_INVALID_ENTRY,
        socket: CPUTOPOLOGY_INVALID_ENTRY,
        node: CPUTOPOLOGY_INVALID_ENTRY,
    };

    pub fn is_valid(&self) -> bool {
        self.core != CPUTOPOLOGY_INVALID_ENTRY
    }
}

/// Memory record for one NUMA node, indexed by node id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawNodeInfo {
    /// Node memory in bytes.
    pub size: u64,
}

impl RawNodeInfo {
    pub const INVALID: Self = Self {
        size: NUMAINFO_INVALID_ENTRY,
    };

    pub fn is_valid(&self) -> bool {
        self.size != NUMAINFO_INVALID_ENTRY
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTopology {
    pub nodes: Vec<RawNodeInfo>,
    pub cpus: Vec<RawCpuTopology>,
}

pub trait HostInfoSource {
    fn physinfo(&self) -> Result<PhysInfo>;
}

pub trait TopologySource {
    /// Returns `Ok(None)` when the host offers no topology enumeration at all,
    /// as opposed to an enumeration that failed.
    fn topology(&self) -> Result<Option<RawTopology>>;
}

pub trait CapabilityStringSource {
    /// The hypervisor's space-separated guest capability string, if any.
    fn capabilities(&self) -> Result<Option<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_cpu_entry_is_not_valid() {
        assert!(!RawCpuTopology::INVALID.is_valid());
        let cpu = RawCpuTopology {
            core: 0,
            socket: 0,
            node: 0,
        };
        assert!(cpu.is_valid());
    }

    #[test]
    fn invalid_node_entry_is_not_valid() {
        assert!(!RawNodeInfo::INVALID.is_valid());
        assert!(RawNodeInfo { size: 0 }.is_valid());
    }
}
