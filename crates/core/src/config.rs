use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;

/// Default cap on distinct (architecture, mode) guest tuples.
pub const DEFAULT_MAX_GUEST_ARCHS: usize = 32;

/// Settings for a capability probe.
///
/// Every field has a default matching a stock Linux host running Xen, so an
/// empty TOML document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    pub sysfs_root: PathBuf,
    pub cpuinfo_path: PathBuf,
    pub emulator_path: PathBuf,
    pub firmware_dir: PathBuf,
    /// Literal capability string used instead of querying the hypervisor.
    pub capabilities: Option<String>,
    pub max_guest_archs: usize,
    /// Whether the hypervisor supports suspend/resume of guests.
    pub save_restore: bool,
    pub emulator_timeout_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from("/sys"),
            cpuinfo_path: PathBuf::from("/proc/cpuinfo"),
            emulator_path: PathBuf::from("/usr/lib/xen/bin/qemu-system-i386"),
            firmware_dir: PathBuf::from("/usr/lib/xen/boot"),
            capabilities: None,
            max_guest_archs: DEFAULT_MAX_GUEST_ARCHS,
            save_restore: true,
            emulator_timeout_ms: 5000,
        }
    }
}

impl ProbeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_guest_archs == 0 {
            return Err(Error::InvalidConfig(
                "max_guest_archs must be at least 1".to_string(),
            ));
        }
        if self.emulator_timeout_ms == 0 {
            return Err(Error::InvalidConfig(
                "emulator_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Firmware loader handed to fully-virtualized guests.
    pub fn hvm_loader(&self) -> PathBuf {
        self.firmware_dir.join("hvmloader")
    }
}
