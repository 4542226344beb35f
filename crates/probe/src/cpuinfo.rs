//! Aggregate CPU summary from `/proc/cpuinfo`, used when the host offers no
//! per-CPU topology.
//!
//! The text carries no NUMA information, so the node count stays at one.
//! Sockets are inferred as `cpus / cores`, which ignores hyperthreading and
//! packages with differing core counts.

use crate::host::host_machine;
use hostcaps_core::{Error, NodeInfo, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

pub fn parse_cpuinfo<R: BufRead>(reader: R) -> Result<NodeInfo> {
    let mut info = NodeInfo::default();

    for line in reader.lines() {
        let line = line?;

        if let Some(rest) = line.strip_prefix("processor") {
            if !rest.trim_start().starts_with(':') {
                return Err(Error::Parse("cpuinfo processor".to_string()));
            }
            info.cpus += 1;
        } else if let Some(rest) = line.strip_prefix("cpu MHz") {
            let value =
                field_value(rest).ok_or_else(|| Error::Parse("cpuinfo cpu MHz".to_string()))?;
            if let Some((mhz, tail)) = leading_number::<u32>(value) {
                // Accept a trailing fractional part.
                if tail.is_empty() || tail.starts_with(|c: char| c == '.' || c.is_whitespace()) {
                    info.mhz = mhz;
                }
            }
        } else if let Some(rest) = line.strip_prefix("cpu cores") {
            let value =
                field_value(rest).ok_or_else(|| Error::Parse("cpuinfo cpu cores".to_string()))?;
            if let Some((cores, tail)) = leading_number::<u32>(value) {
                if (tail.is_empty() || tail.starts_with(char::is_whitespace))
                    && cores > info.cores
                {
                    info.cores = cores;
                }
            }
        }
    }

    if info.cpus == 0 {
        return Err(Error::NoCpus);
    }

    info.sockets = info.cpus / info.cores;
    Ok(info)
}

/// Reads the fallback summary from a cpuinfo file, filling in the machine
/// name and total memory from the neighbouring `meminfo`.
pub fn read_node_info(cpuinfo: &Path) -> Result<NodeInfo> {
    let file = File::open(cpuinfo)?;
    let mut info = parse_cpuinfo(BufReader::new(file))?;

    info.model = host_machine();
    info.memory_kib = cpuinfo
        .parent()
        .map(|dir| dir.join("meminfo"))
        .and_then(|path| fs::read_to_string(path).ok())
        .and_then(|text| meminfo_total_kib(&text))
        .unwrap_or(0);

    tracing::debug!(
        cpus = info.cpus,
        mhz = info.mhz,
        cores = info.cores,
        sockets = info.sockets,
        "Parsed cpuinfo"
    );
    Ok(info)
}

/// Extracts `MemTotal` in KiB from `/proc/meminfo` or a sysfs node `meminfo`.
pub(crate) fn meminfo_total_kib(text: &str) -> Option<u64> {
    text.lines().find_map(|line| {
        let (_, rest) = line.split_once("MemTotal:")?;
        leading_number::<u64>(rest.trim_start()).map(|(kib, _)| kib)
    })
}

/// Returns the text after `: ` for a cpuinfo field, or `None` when the
/// separator is missing or nothing follows it.
fn field_value(rest: &str) -> Option<&str> {
    let value = rest.trim_start().strip_prefix(':')?;
    if value.is_empty() {
        return None;
    }
    Some(value.trim_start())
}

/// Parses the leading decimal digits of `s`, returning the value and the
/// unparsed tail.
fn leading_number<T: FromStr>(s: &str) -> Option<(T, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}
