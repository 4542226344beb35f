//! Device model variant detection.
//!
//! Runs the emulator with `-help` and looks for the banner only the
//! traditional Xen fork prints. Every failure falls back to the upstream
//! variant; nothing here is reported as an error.

use hostcaps_core::OsType;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::thread;
use std::time::Duration;
use tokio::process::Command;

/// Help text section printed only by the traditional Xen device model.
pub const XEN_TRADITIONAL_MARKER: &str = "Options specific to the Xen version:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmulatorKind {
    /// Upstream QEMU with Xen support.
    #[default]
    QemuXen,
    /// The older qemu-xen-traditional fork.
    QemuXenTraditional,
}

impl std::fmt::Display for EmulatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::QemuXen => f.write_str("qemu-xen"),
            Self::QemuXenTraditional => f.write_str("qemu-xen-traditional"),
        }
    }
}

/// Classifies raw help output; the text need not be valid UTF-8.
pub fn classify_help_output(output: &[u8]) -> EmulatorKind {
    let marker = XEN_TRADITIONAL_MARKER.as_bytes();
    if output.windows(marker.len()).any(|window| window == marker) {
        EmulatorKind::QemuXenTraditional
    } else {
        EmulatorKind::QemuXen
    }
}

/// Detects which device model `emulator` is.
///
/// Only fully-virtualized guests use a device model, so other guests and a
/// missing emulator report the default.
pub fn detect_emulator_kind(
    os_type: OsType,
    emulator: Option<&Path>,
    timeout: Duration,
) -> EmulatorKind {
    let Some(emulator) = emulator.filter(|_| os_type.is_hvm()) else {
        return EmulatorKind::default();
    };

    let Some(path) = resolve(emulator) else {
        tracing::debug!(emulator = %emulator.display(), "Emulator not found");
        return EmulatorKind::default();
    };

    match run_help(&path, timeout) {
        Some(output) => {
            let kind = classify_help_output(&output);
            tracing::debug!(emulator = %path.display(), %kind, "Detected emulator variant");
            kind
        }
        None => EmulatorKind::default(),
    }
}

fn resolve(emulator: &Path) -> Option<PathBuf> {
    if emulator.components().count() == 1 && !emulator.is_absolute() {
        return which::which(emulator).ok();
    }
    emulator.exists().then(|| emulator.to_path_buf())
}

/// Runs `path -help` and returns its stdout, or `None` if it could not be
/// run, exited unsuccessfully or outlived `timeout`.
fn run_help(path: &Path, timeout: Duration) -> Option<Vec<u8>> {
    if tokio::runtime::Handle::try_current().is_ok() {
        // block_on cannot be called from within an async context.
        return thread::scope(|s| {
            s.spawn(|| block_on_help(path, timeout))
                .join()
                .ok()
                .flatten()
        });
    }
    block_on_help(path, timeout)
}

fn block_on_help(path: &Path, timeout: Duration) -> Option<Vec<u8>> {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to start runtime for emulator probe");
            return None;
        }
    };
    runtime.block_on(help_output(path, timeout))
}

async fn help_output(path: &Path, timeout: Duration) -> Option<Vec<u8>> {
    let mut cmd = Command::new(path);
    cmd.arg("-help")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);
    // Own process group, so a wrapper script's children die with it.
    #[cfg(unix)]
    cmd.process_group(0);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(e) => {
            tracing::debug!(emulator = %path.display(), error = %e, "Failed to run emulator");
            return None;
        }
    };
    let pid = child.id();

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) if output.status.success() => Some(output.stdout),
        Ok(Ok(output)) => {
            tracing::debug!(
                emulator = %path.display(),
                status = %output.status,
                "Emulator exited with failure"
            );
            None
        }
        Ok(Err(e)) => {
            tracing::debug!(emulator = %path.display(), error = %e, "Failed to wait for emulator");
            None
        }
        Err(_) => {
            tracing::warn!(emulator = %path.display(), "Emulator timed out, killing it");
            kill_process_group(pid);
            None
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{Signal, killpg};
    use nix::unistd::Pid;

    let Some(pid) = pid.and_then(|pid| i32::try_from(pid).ok()) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(pid), Signal::SIGKILL) {
        tracing::debug!(pid, error = %e, "Failed to kill emulator process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
