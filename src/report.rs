//! Console output: indented tree listing and run summary.

use crate::models::{Node, ProcessingStats};
use colored::*;
use std::fmt::Write;

/// Render the forest as an indented listing, children sorted by code
pub fn render_tree(roots: &[Node]) -> String {
    let mut out = String::new();
    for root in roots {
        render_node(root, 0, &mut out);
    }
    out
}

fn render_node(node: &Node, indent: usize, out: &mut String) {
    let _ = writeln!(
        out,
        "{:indent$}- [{:<19}] {:<15} {:<5} {}",
        "",
        node.kind.as_str().to_uppercase(),
        node.code,
        node.unit.as_deref().unwrap_or(""),
        node.description,
        indent = indent
    );

    let mut children: Vec<&Node> = node.children.iter().collect();
    children.sort_by(|a, b| a.code.cmp(&b.code));
    for child in children {
        render_node(child, indent + 4, out);
    }
}

/// Print the end-of-run summary to stdout
pub fn print_summary(stats: &ProcessingStats) {
    println!();
    println!("{}", "BC3 processing complete".bright_green().bold());
    println!("  Files processed:   {}", stats.files_processed.to_string().bright_cyan());
    println!("  Records read:      {}", stats.total_records);
    println!("  Nodes built:       {}", stats.nodes_built);
    println!("  Root nodes:        {}", stats.roots);
    println!("  Nodes promoted:    {}", stats.nodes_promoted.to_string().bright_yellow());
    if stats.codes_shortened > 0 {
        println!("  Codes shortened:   {}", stats.codes_shortened);
    }
    if stats.records_skipped > 0 || stats.edges_dropped > 0 {
        println!(
            "  {}",
            format!(
                "Skipped {} records, dropped {} edges",
                stats.records_skipped, stats.edges_dropped
            )
            .bright_black()
        );
    }
    for path in &stats.output_paths {
        println!("  {} {}", "→".bright_green(), path.display());
    }
    println!("  Time: {} ms", stats.processing_time_ms);
}
