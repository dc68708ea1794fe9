use std::fmt;

/// Counters kept by the buffer manager. Purely informational.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BufStats {
    /// Page requests served, hits and misses alike.
    pub accesses: u64,
    pub disk_reads: u64,
    pub disk_writes: u64,
}

impl BufStats {
    pub fn clear(&mut self) {
        *self = BufStats::default();
    }
}

impl fmt::Display for BufStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "accesses={} disk_reads={} disk_writes={}",
            self.accesses, self.disk_reads, self.disk_writes
        )
    }
}
