use crate::cpuinfo::read_node_info;
use crate::guests::{GuestCapabilityParser, guest_descriptors};
use crate::host::probe_host;
use crate::numa::build_numa_cells;
use hostcaps_core::{
    Arch, CapabilityModel, CapabilityStringSource, Error, HostInfoSource, ProbeConfig, Result,
    TopologySource,
};

/// Builds a [`CapabilityModel`] from a set of host collaborators.
///
/// Stages run in order: host features, NUMA topology (or the cpuinfo
/// summary when no topology is available), then guest capabilities. The
/// first failing stage aborts the probe and everything built so far is
/// dropped with it.
pub struct CapabilityProbe<'a> {
    host_info: &'a dyn HostInfoSource,
    topology: &'a dyn TopologySource,
    capabilities: &'a dyn CapabilityStringSource,
    host_arch: Arch,
    config: ProbeConfig,
}

impl<'a> CapabilityProbe<'a> {
    pub fn new(
        host_info: &'a dyn HostInfoSource,
        topology: &'a dyn TopologySource,
        capabilities: &'a dyn CapabilityStringSource,
        host_arch: Arch,
        config: ProbeConfig,
    ) -> Self {
        Self {
            host_info,
            topology,
            capabilities,
            host_arch,
            config,
        }
    }

    pub fn build(&self) -> Result<CapabilityModel> {
        self.config.validate()?;

        let host = probe_host(
            self.host_info,
            self.host_arch.clone(),
            self.config.save_restore,
        )?;

        let (cells, node_info) = match self.topology.topology()? {
            Some(raw) => (build_numa_cells(&raw)?, None),
            None => {
                tracing::warn!(
                    cpuinfo = %self.config.cpuinfo_path.display(),
                    "NUMA topology unavailable, falling back to cpuinfo"
                );
                (Vec::new(), Some(read_node_info(&self.config.cpuinfo_path)?))
            }
        };

        let caps = self.capabilities.capabilities()?.ok_or_else(|| {
            Error::Query("hypervisor reported no guest capabilities".to_string())
        })?;
        let parser = GuestCapabilityParser::new(self.config.max_guest_archs)?;
        let guests = guest_descriptors(&parser.parse(&caps), &self.config);

        tracing::info!(
            arch = %host.arch,
            cells = cells.len(),
            guests = guests.len(),
            "Built capability model"
        );

        Ok(CapabilityModel {
            host,
            cells,
            guests,
            node_info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{StaticCapabilities, StaticHostInfo};
    use hostcaps_core::{OsType, RawCpuTopology, RawNodeInfo, RawTopology};
    use std::cell::Cell;

    struct FixedTopology(Option<RawTopology>);

    impl TopologySource for FixedTopology {
        fn topology(&self) -> Result<Option<RawTopology>> {
            Ok(self.0.clone())
        }
    }

    struct FailingTopology;

    impl TopologySource for FailingTopology {
        fn topology(&self) -> Result<Option<RawTopology>> {
            Err(Error::Query("cpu topology query failed".to_string()))
        }
    }

    struct NoCapabilities;

    impl CapabilityStringSource for NoCapabilities {
        fn capabilities(&self) -> Result<Option<String>> {
            Ok(None)
        }
    }

    /// Records whether it was asked, to check later stages never run.
    struct CountingCapabilities(Cell<u32>);

    impl CapabilityStringSource for CountingCapabilities {
        fn capabilities(&self) -> Result<Option<String>> {
            self.0.set(self.0.get() + 1);
            Ok(Some("xen-3.0-x86_64".to_string()))
        }
    }

    fn single_node() -> RawTopology {
        RawTopology {
            nodes: vec![RawNodeInfo { size: 1 << 30 }],
            cpus: vec![
                RawCpuTopology {
                    core: 0,
                    socket: 0,
                    node: 0,
                },
                RawCpuTopology {
                    core: 0,
                    socket: 0,
                    node: 0,
                },
            ],
        }
    }

    fn pae_host() -> StaticHostInfo {
        StaticHostInfo {
            hw_cap: vec![0x40],
        }
    }

    #[test]
    fn builds_complete_model() {
        let host = pae_host();
        let topology = FixedTopology(Some(single_node()));
        let caps = StaticCapabilities("xen-3.0-x86_32p hvm-3.0-x86_32 xen-3.0-x86_64".to_string());

        let model = CapabilityProbe::new(
            &host,
            &topology,
            &caps,
            Arch::X86_64,
            ProbeConfig::default(),
        )
        .build()
        .unwrap();

        assert!(model.host.has_feature("pae"));
        assert_eq!(model.host.arch, Arch::X86_64);
        assert_eq!(model.cells.len(), 1);
        assert_eq!(model.cells[0].memory_kib, 1 << 20);
        assert!(model.node_info.is_none());
        assert_eq!(model.guests.len(), 3);
        assert!(model.supports(OsType::Hvm, &Arch::I686));
    }

    #[test]
    fn topology_failure_aborts_before_guests() {
        let host = pae_host();
        let caps = CountingCapabilities(Cell::new(0));

        let result = CapabilityProbe::new(
            &host,
            &FailingTopology,
            &caps,
            Arch::X86_64,
            ProbeConfig::default(),
        )
        .build();

        assert!(matches!(result, Err(Error::Query(_))));
        assert_eq!(caps.0.get(), 0);
    }

    #[test]
    fn missing_capability_string_is_a_query_failure() {
        let host = pae_host();
        let topology = FixedTopology(Some(single_node()));

        let result = CapabilityProbe::new(
            &host,
            &topology,
            &NoCapabilities,
            Arch::X86_64,
            ProbeConfig::default(),
        )
        .build();

        assert!(matches!(result, Err(Error::Query(_))));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let host = pae_host();
        let topology = FixedTopology(Some(single_node()));
        let caps = CountingCapabilities(Cell::new(0));
        let config = ProbeConfig {
            max_guest_archs: 0,
            ..ProbeConfig::default()
        };

        let result = CapabilityProbe::new(&host, &topology, &caps, Arch::X86_64, config).build();
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert_eq!(caps.0.get(), 0);
    }

    #[test]
    fn unavailable_topology_uses_cpuinfo() {
        let dir = tempfile::tempdir().unwrap();
        let cpuinfo = dir.path().join("cpuinfo");
        std::fs::write(&cpuinfo, "processor : 0\nprocessor : 1\ncpu cores : 2\n").unwrap();

        let host = pae_host();
        let topology = FixedTopology(None);
        let caps = StaticCapabilities("hvm-3.0-x86_64".to_string());
        let config = ProbeConfig {
            cpuinfo_path: cpuinfo,
            ..ProbeConfig::default()
        };

        let model = CapabilityProbe::new(&host, &topology, &caps, Arch::X86_64, config)
            .build()
            .unwrap();

        assert!(model.cells.is_empty());
        let info = model.node_info.as_ref().unwrap();
        assert_eq!(info.cpus, 2);
        assert_eq!(info.sockets, 1);
        assert_eq!(model.total_cpus(), 2);
    }

    #[test]
    fn empty_cpuinfo_fallback_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let cpuinfo = dir.path().join("cpuinfo");
        std::fs::write(&cpuinfo, "").unwrap();

        let host = pae_host();
        let topology = FixedTopology(None);
        let caps = StaticCapabilities("hvm-3.0-x86_64".to_string());
        let config = ProbeConfig {
            cpuinfo_path: cpuinfo,
            ..ProbeConfig::default()
        };

        let result = CapabilityProbe::new(&host, &topology, &caps, Arch::X86_64, config).build();
        assert!(matches!(result, Err(Error::NoCpus)));
    }
}
