//! The `emulator` command - detects the device model variant of a binary.

use clap::Args;
use hostcaps::{OsType, ProbeConfig, detect_emulator_kind};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args)]
pub struct EmulatorArgs {
    /// Emulator binary, or a name to look up on PATH
    path: Option<PathBuf>,
}

pub fn run(args: EmulatorArgs, config: ProbeConfig) {
    let path = args.path.unwrap_or(config.emulator_path);
    let timeout = Duration::from_millis(config.emulator_timeout_ms);
    let kind = detect_emulator_kind(OsType::Hvm, Some(&path), timeout);
    println!("{}: {kind}", path.display());
}
