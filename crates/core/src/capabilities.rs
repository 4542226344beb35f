use crate::types::{Arch, NodeInfo, NumaCell, OsType};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Host-wide facts: architecture, CPU features and global flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostCapabilities {
    pub arch: Arch,
    /// Named host CPU features. Only features found present are recorded.
    pub features: BTreeMap<String, bool>,
    /// Prefix used when generating guest network interface names.
    pub net_prefix: Option<String>,
    pub live_migration: bool,
    pub save_restore: bool,
}

impl HostCapabilities {
    pub fn new(arch: Arch, save_restore: bool) -> Self {
        Self {
            arch,
            features: BTreeMap::new(),
            net_prefix: None,
            live_migration: save_restore,
            save_restore,
        }
    }

    pub fn add_feature(&mut self, name: impl Into<String>) {
        self.features.insert(name.into(), true);
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.features.get(name).copied().unwrap_or(false)
    }

    pub fn set_net_prefix(&mut self, prefix: impl Into<String>) {
        self.net_prefix = Some(prefix.into());
    }
}

/// An optional guest feature and how the management layer may treat it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestFeature {
    pub name: String,
    /// Enabled unless the guest configuration says otherwise.
    pub default_on: bool,
    /// The guest configuration may switch it off.
    pub toggle: bool,
}

impl GuestFeature {
    pub fn new(name: impl Into<String>, default_on: bool, toggle: bool) -> Self {
        Self {
            name: name.into(),
            default_on,
            toggle,
        }
    }
}

/// One kind of guest this host can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestDescriptor {
    pub os_type: OsType,
    pub arch: Arch,
    /// Hypervisor domain type the guest runs under.
    pub domain_type: String,
    pub emulator: PathBuf,
    /// Firmware loader, only present for fully-virtualized guests.
    pub loader: Option<PathBuf>,
    pub machine: String,
    pub features: Vec<GuestFeature>,
}

impl GuestDescriptor {
    pub fn feature(&self, name: &str) -> Option<&GuestFeature> {
        self.features.iter().find(|f| f.name == name)
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.feature(name).is_some()
    }
}

/// Everything known about what guests this host can run.
///
/// Built fresh by every probe; a failed probe never yields a partial model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityModel {
    pub host: HostCapabilities,
    pub cells: Vec<NumaCell>,
    pub guests: Vec<GuestDescriptor>,
    /// Aggregate CPU summary, set when per-CPU topology was unavailable.
    pub node_info: Option<NodeInfo>,
}

impl CapabilityModel {
    pub fn guest(&self, os_type: OsType, arch: &Arch) -> Option<&GuestDescriptor> {
        self.guests
            .iter()
            .find(|g| g.os_type == os_type && g.arch == *arch)
    }

    pub fn supports(&self, os_type: OsType, arch: &Arch) -> bool {
        self.guest(os_type, arch).is_some()
    }

    pub fn total_cpus(&self) -> u32 {
        match &self.node_info {
            Some(info) => info.cpus,
            None => self.cells.iter().map(|c| c.cpus.len() as u32).sum(),
        }
    }

    pub fn total_memory_kib(&self) -> u64 {
        match &self.node_info {
            Some(info) => info.memory_kib,
            None => self.cells.iter().map(|c| c.memory_kib).sum(),
        }
    }
}
