//! NUMA cell construction from raw per-node and per-CPU records.
//!
//! CPUs are first grouped by node in source order, then each CPU's sibling
//! set is filled with every CPU of the same node sharing its socket and core.
//! Any failure drops everything built so far; cells are only handed out once
//! the whole list is complete.

use hostcaps_core::{CpuDescriptor, CpuSet, Error, NumaCell, RawTopology, Result};

pub fn build_numa_cells(topology: &RawTopology) -> Result<Vec<NumaCell>> {
    if topology.nodes.is_empty() {
        return Err(Error::Query("NUMA info reported no nodes".to_string()));
    }
    if topology.cpus.is_empty() {
        return Err(Error::Query("CPU topology reported no CPUs".to_string()));
    }

    let max_cpus = u32::try_from(topology.cpus.len())
        .map_err(|_| Error::Query("CPU topology too large".to_string()))?;

    let mut per_node: Vec<Vec<CpuDescriptor>> = Vec::new();
    per_node.try_reserve_exact(topology.nodes.len())?;
    per_node.resize_with(topology.nodes.len(), Vec::new);

    for (id, cpu) in (0..max_cpus).zip(&topology.cpus) {
        if !cpu.is_valid() {
            tracing::debug!(cpu = id, "Skipping invalid CPU topology entry");
            continue;
        }

        let cpus = per_node.get_mut(cpu.node as usize).ok_or_else(|| {
            Error::Query(format!("CPU {id} references unknown NUMA node {}", cpu.node))
        })?;
        cpus.try_reserve(1)?;
        cpus.push(CpuDescriptor {
            id,
            socket_id: cpu.socket,
            core_id: cpu.core,
            siblings: CpuSet::with_capacity(max_cpus)?,
        });
    }

    for (id, cpu) in (0..max_cpus).zip(&topology.cpus) {
        if !cpu.is_valid() {
            continue;
        }
        // Grouping above already rejected out-of-range nodes.
        for desc in per_node[cpu.node as usize].iter_mut() {
            if desc.socket_id == cpu.socket && desc.core_id == cpu.core {
                desc.siblings.insert(id);
            }
        }
    }

    let mut cells = Vec::new();
    for ((node, info), cpus) in (0u32..).zip(&topology.nodes).zip(per_node) {
        if !info.is_valid() {
            tracing::debug!(node, "Skipping NUMA node with invalid memory entry");
            continue;
        }
        if cpus.is_empty() {
            tracing::debug!(node, "Skipping NUMA node without usable CPUs");
            continue;
        }

        tracing::debug!(node, cpus = cpus.len(), "Adding NUMA cell");
        cells.try_reserve(1)?;
        cells.push(NumaCell {
            id: node,
            memory_kib: info.size / 1024,
            cpus,
        });
    }

    Ok(cells)
}
