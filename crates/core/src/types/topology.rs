use crate::error::Result;
use std::fmt;

const WORD_BITS: u32 = u64::BITS;

/// Fixed-capacity set of logical CPU ids.
///
/// The capacity is chosen up front (normally the host's CPU count) and ids at
/// or beyond it are rejected rather than growing the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuSet {
    words: Vec<u64>,
    capacity: u32,
}

impl CpuSet {
    /// Allocates an empty set able to hold ids `0..capacity`.
    pub fn with_capacity(capacity: u32) -> Result<Self> {
        let len = capacity.div_ceil(WORD_BITS) as usize;
        let mut words = Vec::new();
        words.try_reserve_exact(len)?;
        words.resize(len, 0);
        Ok(Self { words, capacity })
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Adds `cpu`, returning `false` when it lies outside the capacity.
    pub fn insert(&mut self, cpu: u32) -> bool {
        if cpu >= self.capacity {
            return false;
        }
        self.words[(cpu / WORD_BITS) as usize] |= 1u64 << (cpu % WORD_BITS);
        true
    }

    pub fn contains(&self, cpu: u32) -> bool {
        cpu < self.capacity
            && self.words[(cpu / WORD_BITS) as usize] & (1u64 << (cpu % WORD_BITS)) != 0
    }

    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Iterates member ids in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.capacity).filter(|&cpu| self.contains(cpu))
    }
}

/// Formats the set in Linux cpulist syntax, e.g. `0-3,8,10-11`.
impl fmt::Display for CpuSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids = self.iter().peekable();
        let mut first = true;
        while let Some(start) = ids.next() {
            let mut end = start;
            while ids.peek() == Some(&(end + 1)) {
                end += 1;
                ids.next();
            }
            if !first {
                f.write_str(",")?;
            }
            first = false;
            if start == end {
                write!(f, "{start}")?;
            } else {
                write!(f, "{start}-{end}")?;
            }
        }
        Ok(())
    }
}

/// One logical CPU inside a NUMA cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuDescriptor {
    pub id: u32,
    pub socket_id: u32,
    pub core_id: u32,
    /// CPUs sharing this CPU's socket and core, itself included.
    pub siblings: CpuSet,
}

/// A group of CPUs and memory with uniform access latency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumaCell {
    pub id: u32,
    pub memory_kib: u64,
    pub cpus: Vec<CpuDescriptor>,
}

impl NumaCell {
    pub fn cpu(&self, id: u32) -> Option<&CpuDescriptor> {
        self.cpus.iter().find(|cpu| cpu.id == id)
    }
}

/// Aggregate CPU summary used when no per-CPU topology is available.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// Machine name as reported by `uname`.
    pub model: String,
    pub cpus: u32,
    pub mhz: u32,
    pub nodes: u32,
    pub sockets: u32,
    pub cores: u32,
    pub threads: u32,
    pub memory_kib: u64,
}

impl Default for NodeInfo {
    fn default() -> Self {
        Self {
            model: String::new(),
            cpus: 0,
            mhz: 0,
            nodes: 1,
            sockets: 1,
            cores: 1,
            threads: 1,
            memory_kib: 0,
        }
    }
}
