pub mod capabilities;
pub mod config;
pub mod error;
pub mod source;
pub mod types;

pub use capabilities::{CapabilityModel, GuestDescriptor, GuestFeature, HostCapabilities};
pub use config::{DEFAULT_MAX_GUEST_ARCHS, ProbeConfig};
pub use error::{Error, Result};
pub use source::{
    CPUTOPOLOGY_INVALID_ENTRY, CapabilityStringSource, HostInfoSource, NUMAINFO_INVALID_ENTRY,
    PhysInfo, RawCpuTopology, RawNodeInfo, RawTopology, TopologySource,
};
pub use types::{Arch, CpuDescriptor, CpuSet, NodeInfo, NumaCell, OsType};
