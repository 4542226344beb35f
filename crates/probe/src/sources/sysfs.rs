use crate::cpuinfo::meminfo_total_kib;
use hostcaps_core::{Error, RawCpuTopology, RawNodeInfo, RawTopology, Result, TopologySource};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// NUMA and CPU topology read from Linux sysfs.
pub struct SysfsTopology {
    root: PathBuf,
}

impl SysfsTopology {
    pub fn new(sysfs_root: impl Into<PathBuf>) -> Self {
        Self {
            root: sysfs_root.into(),
        }
    }

    fn node_dir(&self) -> PathBuf {
        self.root.join("devices/system/node")
    }

    fn cpu_dir(&self) -> PathBuf {
        self.root.join("devices/system/cpu")
    }
}

impl TopologySource for SysfsTopology {
    fn topology(&self) -> Result<Option<RawTopology>> {
        let node_dir = self.node_dir();
        if !node_dir.is_dir() {
            tracing::debug!(path = %node_dir.display(), "No NUMA topology in sysfs");
            return Ok(None);
        }

        let mut nodes: Vec<RawNodeInfo> = Vec::new();
        let mut cpu_nodes: HashMap<u32, u32> = HashMap::new();

        for (node, path) in numbered_entries(&node_dir, "node")? {
            let size = fs::read_to_string(path.join("meminfo"))
                .ok()
                .and_then(|text| meminfo_total_kib(&text))
                .and_then(|kib| kib.checked_mul(1024));

            let index = node as usize;
            grow(&mut nodes, index, RawNodeInfo::INVALID)?;
            nodes[index] = size.map_or(RawNodeInfo::INVALID, |size| RawNodeInfo { size });

            let cpulist = read_trimmed(&path.join("cpulist"))?;
            for cpu in parse_cpulist(&cpulist)? {
                cpu_nodes.insert(cpu, node);
            }
        }

        // CPUs outside every node's cpulist would be invalid anyway.
        let last_cpu = cpu_nodes.keys().max().copied();
        let mut cpus: Vec<RawCpuTopology> = Vec::new();
        for (id, path) in numbered_entries(&self.cpu_dir(), "cpu")? {
            if last_cpu.is_none_or(|last| id > last) {
                tracing::debug!(cpu = id, "Skipping CPU beyond every node cpulist");
                continue;
            }
            let index = id as usize;
            grow(&mut cpus, index, RawCpuTopology::INVALID)?;
            cpus[index] = read_cpu(&path, cpu_nodes.get(&id).copied());
        }

        tracing::debug!(nodes = nodes.len(), cpus = cpus.len(), "Read sysfs topology");
        Ok(Some(RawTopology { nodes, cpus }))
    }
}

/// Extends `entries` with `fill` so that `index` is in bounds.
fn grow<T: Clone>(entries: &mut Vec<T>, index: usize, fill: T) -> Result<()> {
    if entries.len() <= index {
        entries.try_reserve(index + 1 - entries.len())?;
        entries.resize(index + 1, fill);
    }
    Ok(())
}

/// Reads one CPU's record; offline CPUs and CPUs without topology or node
/// information come back invalid.
fn read_cpu(path: &Path, node: Option<u32>) -> RawCpuTopology {
    let online = fs::read_to_string(path.join("online"))
        .map(|s| s.trim() != "0")
        .unwrap_or(true);
    let topology = path.join("topology");
    let core = read_u32(&topology.join("core_id"));
    let socket = read_u32(&topology.join("physical_package_id"));

    match (online, node, core, socket) {
        (true, Some(node), Some(core), Some(socket)) => RawCpuTopology { core, socket, node },
        _ => RawCpuTopology::INVALID,
    }
}

fn read_u32(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

fn read_trimmed(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| Error::Query(format!("failed to read {}: {e}", path.display())))
}

/// Lists `<prefix><N>` entries of `dir` as `(N, path)`, sorted by `N`.
fn numbered_entries(dir: &Path, prefix: &str) -> Result<Vec<(u32, PathBuf)>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| Error::Query(format!("failed to read {}: {e}", dir.display())))?;

    let mut found = Vec::new();
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(id) = name
            .to_str()
            .and_then(|n| n.strip_prefix(prefix))
            .and_then(|n| n.parse::<u32>().ok())
        else {
            continue;
        };
        found.push((id, entry.path()));
    }
    found.sort_unstable_by_key(|(id, _)| *id);
    Ok(found)
}

/// Parses Linux cpulist syntax such as `0-3,8,10-11`.
pub fn parse_cpulist(cpulist: &str) -> Result<Vec<u32>> {
    let mut cpus = Vec::new();
    if cpulist.is_empty() {
        return Ok(cpus);
    }

    for part in cpulist.split(',') {
        let invalid = || Error::Query(format!("invalid cpulist entry '{part}'"));
        if let Some((start, end)) = part.split_once('-') {
            let start: u32 = start.parse().map_err(|_| invalid())?;
            let end: u32 = end.parse().map_err(|_| invalid())?;
            if start > end {
                return Err(invalid());
            }
            cpus.try_reserve((end - start) as usize + 1)?;
            cpus.extend(start..=end);
        } else {
            cpus.push(part.parse().map_err(|_| invalid())?);
        }
    }

    cpus.sort_unstable();
    cpus.dedup();
    Ok(cpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod cpulist {
        use super::*;

        #[test]
        fn single_range() {
            assert_eq!(parse_cpulist("0-3").unwrap(), vec![0, 1, 2, 3]);
        }

        #[test]
        fn mixed_entries() {
            assert_eq!(
                parse_cpulist("0-1,4,8-9").unwrap(),
                vec![0, 1, 4, 8, 9]
            );
        }

        #[test]
        fn empty_list() {
            assert!(parse_cpulist("").unwrap().is_empty());
        }

        #[test]
        fn rejects_garbage() {
            assert!(matches!(parse_cpulist("0-x"), Err(Error::Query(_))));
            assert!(matches!(parse_cpulist("3-1"), Err(Error::Query(_))));
        }
    }

    mod topology {
        use super::*;

        struct FakeSysfs {
            dir: tempfile::TempDir,
        }

        impl FakeSysfs {
            fn new() -> Self {
                Self {
                    dir: tempfile::tempdir().unwrap(),
                }
            }

            fn write(&self, rel: &str, contents: &str) {
                let path = self.dir.path().join(rel);
                fs::create_dir_all(path.parent().unwrap()).unwrap();
                fs::write(path, contents).unwrap();
            }

            fn node(&self, id: u32, mem_kib: u64, cpulist: &str) {
                self.write(
                    &format!("devices/system/node/node{id}/meminfo"),
                    &format!("Node {id} MemTotal:       {mem_kib} kB\n"),
                );
                self.write(&format!("devices/system/node/node{id}/cpulist"), cpulist);
            }

            fn cpu(&self, id: u32, socket: u32, core: u32) {
                let base = format!("devices/system/cpu/cpu{id}/topology");
                self.write(&format!("{base}/core_id"), &format!("{core}\n"));
                self.write(&format!("{base}/physical_package_id"), &format!("{socket}\n"));
            }

            fn source(&self) -> SysfsTopology {
                SysfsTopology::new(self.dir.path())
            }
        }

        #[test]
        fn missing_node_dir_is_unavailable() {
            let sysfs = FakeSysfs::new();
            assert!(sysfs.source().topology().unwrap().is_none());
        }

        #[test]
        fn reads_nodes_and_cpus() {
            let sysfs = FakeSysfs::new();
            sysfs.node(0, 1024, "0-1\n");
            sysfs.node(1, 2048, "2-3\n");
            sysfs.cpu(0, 0, 0);
            sysfs.cpu(1, 0, 0);
            sysfs.cpu(2, 1, 0);
            sysfs.cpu(3, 1, 1);

            let topology = sysfs.source().topology().unwrap().unwrap();
            assert_eq!(
                topology.nodes,
                vec![
                    RawNodeInfo { size: 1024 * 1024 },
                    RawNodeInfo { size: 2048 * 1024 }
                ]
            );
            assert_eq!(topology.cpus.len(), 4);
            assert_eq!(
                topology.cpus[3],
                RawCpuTopology {
                    core: 1,
                    socket: 1,
                    node: 1
                }
            );
        }

        #[test]
        fn offline_cpu_is_invalid() {
            let sysfs = FakeSysfs::new();
            sysfs.node(0, 1024, "0-1");
            sysfs.cpu(0, 0, 0);
            sysfs.cpu(1, 0, 1);
            sysfs.write("devices/system/cpu/cpu1/online", "0\n");

            let topology = sysfs.source().topology().unwrap().unwrap();
            assert!(topology.cpus[0].is_valid());
            assert!(!topology.cpus[1].is_valid());
        }

        #[test]
        fn cpu_without_topology_is_invalid() {
            let sysfs = FakeSysfs::new();
            sysfs.node(0, 1024, "0-1");
            sysfs.cpu(0, 0, 0);
            sysfs.write("devices/system/cpu/cpu1/online", "1\n");

            let topology = sysfs.source().topology().unwrap().unwrap();
            assert!(!topology.cpus[1].is_valid());
        }

        #[test]
        fn sparse_node_ids_leave_invalid_holes() {
            let sysfs = FakeSysfs::new();
            sysfs.node(2, 4096, "0");
            sysfs.cpu(0, 0, 0);

            let topology = sysfs.source().topology().unwrap().unwrap();
            assert_eq!(topology.nodes.len(), 3);
            assert!(!topology.nodes[0].is_valid());
            assert!(!topology.nodes[1].is_valid());
            assert!(topology.nodes[2].is_valid());
            assert_eq!(topology.cpus[0].node, 2);
        }

        #[test]
        fn node_without_meminfo_is_invalid() {
            let sysfs = FakeSysfs::new();
            sysfs.write("devices/system/node/node0/cpulist", "0");
            sysfs.cpu(0, 0, 0);

            let topology = sysfs.source().topology().unwrap().unwrap();
            assert!(!topology.nodes[0].is_valid());
        }

        #[test]
        fn ignores_non_numbered_entries() {
            let sysfs = FakeSysfs::new();
            sysfs.node(0, 1024, "0");
            sysfs.cpu(0, 0, 0);
            sysfs.write("devices/system/cpu/cpufreq/boost", "1");
            sysfs.write("devices/system/node/possible", "0");

            let topology = sysfs.source().topology().unwrap().unwrap();
            assert_eq!(topology.nodes.len(), 1);
            assert_eq!(topology.cpus.len(), 1);
        }

        #[test]
        fn oversized_node_memory_is_invalid() {
            let sysfs = FakeSysfs::new();
            sysfs.node(0, u64::MAX, "0");
            sysfs.node(1, 1024, "1");
            sysfs.cpu(0, 0, 0);
            sysfs.cpu(1, 0, 1);

            let topology = sysfs.source().topology().unwrap().unwrap();
            assert!(!topology.nodes[0].is_valid());
            assert_eq!(topology.nodes[1], RawNodeInfo { size: 1024 * 1024 });
        }

        #[test]
        fn cpus_beyond_every_cpulist_are_skipped() {
            let sysfs = FakeSysfs::new();
            sysfs.node(0, 1024, "0-1");
            sysfs.cpu(0, 0, 0);
            sysfs.cpu(1, 0, 1);
            sysfs.cpu(u32::MAX, 0, 2);

            let topology = sysfs.source().topology().unwrap().unwrap();
            assert_eq!(topology.cpus.len(), 2);
            assert!(topology.cpus.iter().all(RawCpuTopology::is_valid));
        }

        #[test]
        fn bad_cpulist_is_a_query_failure() {
            let sysfs = FakeSysfs::new();
            sysfs.node(0, 1024, "zero");
            sysfs.cpu(0, 0, 0);

            let result = sysfs.source().topology();
            assert!(matches!(result, Err(Error::Query(_))));
        }
    }
}
