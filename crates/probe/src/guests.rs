//! Guest capability string parsing.
//!
//! The hypervisor reports supported guests as a space-separated list of
//! tokens shaped `TYPE-VERSION-ARCH[MODIFIER]`:
//!
//! - `TYPE` is `xen` (paravirtualized) or `hvm` (fully-virtualized)
//! - `VERSION` is the hypervisor version, e.g. `3.0`
//! - `ARCH` is one of `x86_32`, `x86_64`, `ia64`, `armv7l`, `aarch64`, `powerpc64`
//! - `MODIFIER` is `p` (PAE) on `x86_32` or `be` (big-endian) on `ia64`
//!
//! Tokens that don't fit this shape are skipped. The same architecture may
//! be reported several times with different modifiers; those reports are
//! merged, and a flag once seen is never cleared.

use hostcaps_core::{Arch, Error, GuestDescriptor, GuestFeature, OsType, ProbeConfig, Result};
use regex::Regex;

const CAPABILITY_PATTERN: &str =
    r"(xen|hvm)-[0-9]+\.[0-9]+-(aarch64|armv7l|x86_32|x86_64|ia64|powerpc64)(p|be)?";

/// Domain type shared by every guest the hypervisor runs.
const DOMAIN_TYPE: &str = "xen";

/// One supported (architecture, mode) pair with its merged feature flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestArch {
    pub arch: Arch,
    pub os_type: OsType,
    pub pae: bool,
    pub nonpae: bool,
    pub ia64_be: bool,
}

impl GuestArch {
    fn merge(&mut self, other: &GuestArch) {
        self.pae |= other.pae;
        self.nonpae |= other.nonpae;
        self.ia64_be |= other.ia64_be;
    }
}

pub struct GuestCapabilityParser {
    pattern: Regex,
    max_archs: usize,
}

impl GuestCapabilityParser {
    /// Creates a parser keeping at most `max_archs` distinct guest tuples.
    pub fn new(max_archs: usize) -> Result<Self> {
        Self::with_pattern(CAPABILITY_PATTERN, max_archs)
    }

    fn with_pattern(pattern: &str, max_archs: usize) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| Error::PatternCompile(e.to_string()))?;
        Ok(Self { pattern, max_archs })
    }

    /// Parses `capabilities` into distinct guest tuples in first-seen order.
    pub fn parse(&self, capabilities: &str) -> Vec<GuestArch> {
        let mut archs: Vec<GuestArch> = Vec::new();

        for token in capabilities.split_whitespace() {
            let Some(seen) = self.parse_token(token) else {
                tracing::debug!(token, "Skipping unrecognized capability token");
                continue;
            };

            if let Some(existing) = archs
                .iter_mut()
                .find(|a| a.arch == seen.arch && a.os_type == seen.os_type)
            {
                existing.merge(&seen);
            } else if archs.len() >= self.max_archs {
                tracing::warn!(
                    token,
                    limit = self.max_archs,
                    "Too many guest architectures, dropping"
                );
            } else {
                archs.push(seen);
            }
        }

        archs
    }

    fn parse_token(&self, token: &str) -> Option<GuestArch> {
        let caps = self.pattern.captures(token)?;
        let os_type = match caps.get(1)?.as_str() {
            "hvm" => OsType::Hvm,
            _ => OsType::Xen,
        };
        let modifier = caps.get(3).map(|m| m.as_str());

        let (arch, pae, nonpae, ia64_be) = match caps.get(2)?.as_str() {
            "x86_32" => {
                let pae = modifier == Some("p");
                (Arch::I686, pae, !pae, false)
            }
            "x86_64" => (Arch::X86_64, false, false, false),
            "ia64" => (Arch::Itanium, false, false, modifier == Some("be")),
            "powerpc64" => (Arch::Ppc64, false, false, false),
            "armv7l" => (Arch::Armv7l, false, false, false),
            "aarch64" => (Arch::Aarch64, false, false, false),
            _ => return None,
        };

        Some(GuestArch {
            arch,
            os_type,
            pae,
            nonpae,
            ia64_be,
        })
    }
}

/// Builds one guest descriptor per merged tuple.
pub fn guest_descriptors(archs: &[GuestArch], config: &ProbeConfig) -> Vec<GuestDescriptor> {
    archs
        .iter()
        .map(|guest| {
            let hvm = guest.os_type.is_hvm();
            let mut features = Vec::new();

            if guest.pae {
                features.push(GuestFeature::new("pae", true, false));
            }
            if guest.nonpae {
                features.push(GuestFeature::new("nonpae", true, false));
            }
            if guest.ia64_be {
                features.push(GuestFeature::new("ia64_be", true, false));
            }
            if hvm {
                features.push(GuestFeature::new("acpi", true, true));
                features.push(GuestFeature::new("apic", true, false));
                features.push(GuestFeature::new("hap", true, true));
            }

            GuestDescriptor {
                os_type: guest.os_type,
                arch: guest.arch.clone(),
                domain_type: DOMAIN_TYPE.to_string(),
                emulator: config.emulator_path.clone(),
                loader: hvm.then(|| config.hvm_loader()),
                machine: guest.os_type.machine().to_string(),
                features,
            }
        })
        .collect()
}
