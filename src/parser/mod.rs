//! BC3 parser and tree builder
//!
//! Turns the untyped, positionally-encoded BC3 record streams into a forest
//! of priced [`Node`](crate::models::Node)s.
//!
//! ## Architecture
//!
//! - [`classifier`] - Node kind from code markers and type codes
//! - [`numeric`] - Locale-tolerant decimal parsing
//! - [`builder`] - Streaming record pass and relationship wiring
//! - [`stats`] - Parsing statistics and result structures
//!
//! ## Usage
//!
//! ```rust
//! use bc3_processor::parser::build_tree;
//!
//! let lines = [
//!     "~C|OBRA##||Obra||||",
//!     "~C|P01|m2|Solado|12,50||0|",
//!     "~D|OBRA##|P01\\1\\4\\|",
//! ];
//! let result = build_tree(lines);
//!
//! assert_eq!(result.roots.len(), 1);
//! assert_eq!(result.roots[0].children[0].budgeted_amount, Some(50.0));
//! ```

pub mod builder;
pub mod classifier;
pub mod numeric;
pub mod stats;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use builder::{TreeBuilder, build_tree};
pub use classifier::classify;
pub use numeric::parse_number;
pub use stats::{ParseResult, ParseStats};
