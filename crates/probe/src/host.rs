use hostcaps_core::{Arch, HostCapabilities, HostInfoSource, Result};

/// Prefix for generated guest network interface names.
pub const NET_PREFIX: &str = "vif";

/// A single bit in the hypervisor's host feature words.
///
/// Features are numbered `word * 32 + bit` by the hypervisor; we keep the
/// word index and mask separately.
struct HostFeatureBit {
    word: usize,
    mask: u32,
    name: &'static str,
}

const HOST_FEATURES: &[HostFeatureBit] = &[HostFeatureBit {
    word: 0,
    mask: 0x40,
    name: "pae",
}];

/// Records the host's known CPU features and global flags.
///
/// A failing query aborts the probe. A feature bit that is simply clear is a
/// normal result and leaves the feature out of the map.
pub fn probe_host(
    source: &dyn HostInfoSource,
    arch: Arch,
    save_restore: bool,
) -> Result<HostCapabilities> {
    let info = source.physinfo()?;
    let mut host = HostCapabilities::new(arch, save_restore);

    for bit in HOST_FEATURES {
        let present = info
            .hw_cap
            .get(bit.word)
            .is_some_and(|word| word & bit.mask != 0);
        tracing::debug!(feature = bit.name, present, "Host feature");
        if present {
            host.add_feature(bit.name);
        }
    }

    host.set_net_prefix(NET_PREFIX);
    Ok(host)
}

/// Machine name of the running kernel, e.g. `x86_64`.
pub fn host_machine() -> String {
    #[cfg(unix)]
    {
        match nix::sys::utsname::uname() {
            Ok(uts) => return uts.machine().to_string_lossy().into_owned(),
            Err(e) => tracing::warn!(error = %e, "uname failed, using compile-time arch"),
        }
    }
    std::env::consts::ARCH.to_string()
}

pub fn host_arch() -> Arch {
    Arch::from_machine(&host_machine())
}
