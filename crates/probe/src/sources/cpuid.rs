use hostcaps_core::{HostInfoSource, PhysInfo, Result};

/// Host feature words taken from the CPUID instruction.
///
/// Word 0 mirrors leaf 1 EDX. On non-x86 hosts no words are known and all
/// features read as clear.
#[derive(Debug, Default)]
pub struct CpuidHostInfo;

impl CpuidHostInfo {
    pub fn new() -> Self {
        Self
    }
}

impl HostInfoSource for CpuidHostInfo {
    fn physinfo(&self) -> Result<PhysInfo> {
        Ok(PhysInfo {
            hw_cap: vec![leaf1_edx()],
        })
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn leaf1_edx() -> u32 {
    raw_cpuid::cpuid!(1).edx
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn leaf1_edx() -> u32 {
    0
}

/// A fixed set of feature words.
#[derive(Debug, Clone, Default)]
pub struct StaticHostInfo {
    pub hw_cap: Vec<u32>,
}

impl HostInfoSource for StaticHostInfo {
    fn physinfo(&self) -> Result<PhysInfo> {
        Ok(PhysInfo {
            hw_cap: self.hw_cap.clone(),
        })
    }
}
