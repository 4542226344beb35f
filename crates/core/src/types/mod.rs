mod topology;

pub use topology::{CpuDescriptor, CpuSet, NodeInfo, NumaCell};

use std::fmt;

/// CPU architecture of the host or of a guest.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Arch {
    I686,
    X86_64,
    Itanium,
    Armv7l,
    Aarch64,
    Ppc64,
    /// Machine name the model has no dedicated variant for.
    Other(String),
}

impl Arch {
    /// Maps a `uname -m` style machine name to an architecture.
    pub fn from_machine(machine: &str) -> Self {
        match machine {
            "i386" | "i486" | "i586" | "i686" => Self::I686,
            "x86_64" | "amd64" => Self::X86_64,
            "ia64" => Self::Itanium,
            "armv7l" => Self::Armv7l,
            "aarch64" | "arm64" => Self::Aarch64,
            "ppc64" => Self::Ppc64,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::I686 => "i686",
            Self::X86_64 => "x86_64",
            Self::Itanium => "ia64",
            Self::Armv7l => "armv7l",
            Self::Aarch64 => "aarch64",
            Self::Ppc64 => "ppc64",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guest operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OsType {
    /// Paravirtualized guest, needs a cooperating guest kernel.
    Xen,
    /// Fully-virtualized guest backed by hardware virtualization extensions.
    Hvm,
}

impl OsType {
    pub fn is_hvm(self) -> bool {
        matches!(self, Self::Hvm)
    }

    /// The single machine type offered for guests of this mode.
    pub fn machine(self) -> &'static str {
        match self {
            Self::Xen => "xenpv",
            Self::Hvm => "xenfv",
        }
    }
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xen => f.write_str("xen"),
            Self::Hvm => f.write_str("hvm"),
        }
    }
}
