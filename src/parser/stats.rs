//! Parsing statistics and result structures for BC3 processing
//!
//! Malformed records are tolerated rather than rejected; these counters are
//! where that tolerance becomes visible.

use crate::models::Node;

/// Parsing result with the assembled forest and statistics
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Root nodes sorted by code
    pub roots: Vec<Node>,

    /// Parsing statistics
    pub stats: ParseStats,
}

impl ParseResult {
    /// Total number of nodes reachable from the roots
    pub fn node_count(&self) -> usize {
        self.roots.iter().map(Node::subtree_len).sum()
    }
}

/// Counters collected while streaming and wiring records
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct ParseStats {
    /// Lines carrying one of the four recognised tags
    pub total_records: usize,

    /// `~C` records that created or replaced a node
    pub concepts: usize,

    /// `~T` records applied as long description
    pub long_texts: usize,

    /// Child entries read from `~D` records
    pub edges: usize,

    /// `~M` records attached to a code
    pub measurements: usize,

    /// Records dropped as malformed or redundant
    pub records_skipped: usize,

    /// Edges whose parent or child has no node
    pub edges_dropped: usize,

    /// Nodes only reachable through a parent cycle
    pub unreachable_nodes: usize,

    /// Reasons for skipped records, for debugging
    pub skipped: Vec<String>,
}

impl ParseStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a skipped line with its 1-based position and reason
    pub fn skip(&mut self, line_number: usize, reason: impl Into<String>) {
        self.records_skipped += 1;
        self.skipped
            .push(format!("Line {}: {}", line_number, reason.into()));
    }
}
