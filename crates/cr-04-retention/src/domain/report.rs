use shared_types::Timestamp;

/// Outcome of one sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Records older than this were evicted.
    pub cutoff: Timestamp,
    /// Table size when the sweep started.
    pub before: usize,
    pub evicted: usize,
    /// Table size after eviction.
    pub after: usize,
    /// Size of the backing document after the sweep.
    pub file_bytes: u64,
}
