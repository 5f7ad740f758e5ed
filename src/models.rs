//! Core data structures for BC3 processing.
//!
//! Defines the node kinds, the priced tree node and the run statistics
//! used throughout the library.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Semantic kind of a concept in the budget tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Chapter (code carries `##`)
    Grouping,
    /// Sub-chapter (code carries `#`)
    Subgrouping,
    /// Priced work unit (type `0`)
    LineItem,
    /// Labor cost component (type `1`)
    BreakdownLabor,
    /// Machinery cost component (type `2`)
    BreakdownMachinery,
    /// Material cost component (type `3`)
    BreakdownMaterial,
    /// Any other or missing type code
    Other,
}

impl NodeKind {
    /// Whether this kind is one of the three cost breakdowns
    pub fn is_breakdown(&self) -> bool {
        matches!(
            self,
            NodeKind::BreakdownLabor | NodeKind::BreakdownMachinery | NodeKind::BreakdownMaterial
        )
    }

    /// Stable label used in exports and console output
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Grouping => "grouping",
            NodeKind::Subgrouping => "subgrouping",
            NodeKind::LineItem => "line_item",
            NodeKind::BreakdownLabor => "breakdown_labor",
            NodeKind::BreakdownMachinery => "breakdown_machinery",
            NodeKind::BreakdownMaterial => "breakdown_material",
            NodeKind::Other => "other",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concept of the budget with its owned children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub code: String,
    pub description: String,
    pub long_description: Option<String>,
    pub kind: NodeKind,
    pub unit: Option<String>,
    pub unit_price: Option<f64>,
    pub budgeted_quantity: Option<f64>,
    pub budgeted_amount: Option<f64>,
    pub measurements: Vec<String>,
    pub children: Vec<Node>,

    /// Set only on unit-cost clones created by the repair pass
    #[serde(default)]
    pub synthetic: bool,
}

impl Node {
    /// Create a node with no price, quantity, measurements or children
    pub fn new(code: impl Into<String>, description: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
            long_description: None,
            kind,
            unit: None,
            unit_price: None,
            budgeted_quantity: None,
            budgeted_amount: None,
            measurements: Vec::new(),
            children: Vec::new(),
            synthetic: false,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_unit_price(mut self, price: f64) -> Self {
        self.unit_price = Some(price);
        self
    }

    pub fn with_budgeted_quantity(mut self, quantity: f64) -> Self {
        self.budgeted_quantity = Some(quantity);
        self
    }

    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Derive `budgeted_amount` as price × quantity where it is still absent.
    ///
    /// Visits the whole subtree on every call; amounts that are already set
    /// are never recomputed.
    pub fn compute_total(&mut self) {
        if self.budgeted_amount.is_none() {
            if let (Some(price), Some(quantity)) = (self.unit_price, self.budgeted_quantity) {
                self.budgeted_amount = Some(price * quantity);
            }
        }
        for child in &mut self.children {
            child.compute_total();
        }
    }

    /// Codes of the direct children, in order
    pub fn child_codes(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.code.as_str()).collect()
    }

    /// Number of nodes in this subtree, including self
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Node::subtree_len).sum::<usize>()
    }

    /// Depth-first search for a node by code
    pub fn find(&self, code: &str) -> Option<&Node> {
        if self.code == code {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(code))
    }

    /// Visit every node of the subtree in pre-order with its depth
    pub fn walk<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a Node, usize)) {
        visit(self, depth);
        for child in &self.children {
            child.walk(depth + 1, visit);
        }
    }
}

/// Find a node by code anywhere in a forest
pub fn find_in_forest<'a>(roots: &'a [Node], code: &str) -> Option<&'a Node> {
    roots.iter().find_map(|r| r.find(code))
}

/// Statistics for a whole processing run
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub files_processed: usize,
    pub total_records: usize,
    pub records_skipped: usize,
    pub edges_dropped: usize,
    pub nodes_built: usize,
    pub roots: usize,
    pub nodes_promoted: usize,
    pub codes_shortened: usize,
    pub output_paths: Vec<PathBuf>,
    pub processing_time_ms: u128,
}
