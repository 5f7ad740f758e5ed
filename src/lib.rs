//! BC3 Processor Library
//!
//! A Rust library for rebuilding, repairing and exporting the budget tree
//! held in FIEBDC-3 (BC3) construction budget files.
//!
//! This library provides tools for:
//! - Parsing `~C`, `~T`, `~D` and `~M` records into a priced forest
//! - Classifying concepts into groupings, line items and cost breakdowns
//! - Promoting breakdowns that sit beside line items, with synthetic children
//! - Writing the repair back into a patched BC3 copy
//! - Normalizing long codes and forcing material types before parsing
//! - Exporting the tree as a delimited table

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod parser;
pub mod patch;
pub mod processor;
pub mod reader;
pub mod repair;
pub mod report;
pub mod sanitize;

// Re-export commonly used types
pub use config::Bc3Config;
pub use error::{Bc3Error, Result};
pub use models::{Node, NodeKind, ProcessingStats};
pub use parser::{ParseResult, ParseStats, build_tree};
pub use processor::Bc3Processor;
