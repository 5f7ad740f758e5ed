//! Streaming tree builder
//!
//! Records may reference codes that have not been defined yet, so the build
//! runs in two phases: the streaming pass fills code-keyed tables, and
//! [`TreeBuilder::finish`] resolves every relationship against them.

use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

use super::classifier::classify;
use super::numeric::parse_number;
use super::stats::{ParseResult, ParseStats};
use crate::constants::{FIELD_SEPARATOR, SUBFIELD_SEPARATOR};
use crate::models::Node;
use crate::reader::RecordTag;

/// Minimum number of fields after the tag in a `~C` record
const CONCEPT_MIN_FIELDS: usize = 6;

/// Accumulates record streams and assembles them into a forest
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: HashMap<String, Node>,
    /// child code -> parent code, last edge wins
    parents: HashMap<String, String>,
    /// child codes in the order they were first named by an edge
    edge_order: Vec<String>,
    quantities: HashMap<String, f64>,
    measurements: HashMap<String, Vec<String>>,
    line_number: usize,
    stats: ParseStats,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw line into the builder
    pub fn push_line(&mut self, line: &str) {
        self.line_number += 1;

        match RecordTag::of(line) {
            RecordTag::Concept => self.push_concept(line),
            RecordTag::Text => self.push_long_text(line),
            RecordTag::Decomposition => self.push_decomposition(line),
            RecordTag::Measurement => self.push_measurement(line),
            RecordTag::Other => {}
        }
    }

    fn push_concept(&mut self, line: &str) {
        self.stats.total_records += 1;

        let Some((_, rest)) = line.split_once(FIELD_SEPARATOR) else {
            self.stats.skip(self.line_number, "concept record without fields");
            return;
        };
        let parts: Vec<&str> = rest.split(FIELD_SEPARATOR).collect();
        if parts.len() < CONCEPT_MIN_FIELDS {
            debug!(
                "Skipping concept at line {}: {} fields",
                self.line_number,
                parts.len()
            );
            self.stats.skip(
                self.line_number,
                format!("concept record with {} fields", parts.len()),
            );
            return;
        }

        let (code, unit, description, price, type_field) =
            (parts[0], parts[1], parts[2], parts[3], parts[5]);
        if code.is_empty() {
            self.stats.skip(self.line_number, "concept record with empty code");
            return;
        }

        let mut node = Node::new(code, description, classify(code, type_field));
        node.unit = Some(unit).filter(|u| !u.is_empty()).map(str::to_string);
        node.unit_price = parse_number(price);

        self.nodes.insert(code.to_string(), node);
        self.stats.concepts += 1;
    }

    fn push_long_text(&mut self, line: &str) {
        self.stats.total_records += 1;

        let parsed = line
            .split_once(FIELD_SEPARATOR)
            .and_then(|(_, rest)| rest.split_once(FIELD_SEPARATOR));
        let Some((code, text)) = parsed else {
            self.stats.skip(self.line_number, "long text without code and text");
            return;
        };
        let text = text.strip_suffix(FIELD_SEPARATOR).unwrap_or(text);

        match self.nodes.get_mut(code) {
            Some(node) if node.long_description.is_none() => {
                node.long_description = Some(text.to_string());
                self.stats.long_texts += 1;
            }
            Some(_) => self
                .stats
                .skip(self.line_number, format!("duplicate long text for {}", code)),
            None => self
                .stats
                .skip(self.line_number, format!("long text for unknown code {}", code)),
        }
    }

    fn push_decomposition(&mut self, line: &str) {
        self.stats.total_records += 1;

        let parsed = line
            .split_once(FIELD_SEPARATOR)
            .and_then(|(_, rest)| rest.split_once(FIELD_SEPARATOR));
        let Some((parent_code, child_part)) = parsed else {
            self.stats
                .skip(self.line_number, "decomposition without child list");
            return;
        };

        let chunks: Vec<&str> = child_part
            .trim_end_matches([FIELD_SEPARATOR, '\n'])
            .split(SUBFIELD_SEPARATOR)
            .collect();

        for triple in chunks.chunks(3) {
            let child_code = triple[0].trim();
            if child_code.is_empty() {
                continue;
            }

            if !self.parents.contains_key(child_code) {
                self.edge_order.push(child_code.to_string());
            }
            self.parents
                .insert(child_code.to_string(), parent_code.to_string());
            self.stats.edges += 1;

            if let Some(quantity) = triple.get(2).and_then(|q| parse_number(q)) {
                self.quantities.insert(child_code.to_string(), quantity);
            }
        }
    }

    fn push_measurement(&mut self, line: &str) {
        self.stats.total_records += 1;

        let code = line
            .split(FIELD_SEPARATOR)
            .nth(1)
            .and_then(|path| path.split_once(SUBFIELD_SEPARATOR))
            .map(|(_, code)| code)
            .filter(|code| !code.is_empty());
        let Some(code) = code else {
            self.stats
                .skip(self.line_number, "measurement without code path");
            return;
        };

        self.measurements
            .entry(code.to_string())
            .or_default()
            .push(line.trim_end().to_string());
        self.stats.measurements += 1;
    }

    /// Resolve edges, attach quantities and measurements, compute totals
    /// and return the roots sorted by code
    pub fn finish(mut self) -> ParseResult {
        for (code, node) in self.nodes.iter_mut() {
            if let Some(quantity) = self.quantities.get(code) {
                node.budgeted_quantity = Some(*quantity);
            }
            if let Some(measurements) = self.measurements.remove(code) {
                node.measurements = measurements;
            }
        }

        let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
        let mut wired: HashSet<String> = HashSet::new();
        for child_code in &self.edge_order {
            let parent_code = &self.parents[child_code];
            if self.nodes.contains_key(child_code) && self.nodes.contains_key(parent_code) {
                children_of
                    .entry(parent_code.clone())
                    .or_default()
                    .push(child_code.clone());
                wired.insert(child_code.clone());
            } else {
                debug!(
                    "Dropping edge {} -> {}: endpoint not defined",
                    parent_code, child_code
                );
                self.stats.edges_dropped += 1;
            }
        }

        let mut root_codes: Vec<String> = self
            .nodes
            .keys()
            .filter(|code| !wired.contains(*code))
            .cloned()
            .collect();
        root_codes.sort();

        let mut roots: Vec<Node> = root_codes
            .iter()
            .filter_map(|code| assemble(code, &mut self.nodes, &mut children_of))
            .collect();

        if !self.nodes.is_empty() {
            let mut orphaned: Vec<&String> = self.nodes.keys().collect();
            orphaned.sort();
            warn!(
                "Discarding {} nodes only reachable through a parent cycle: {:?}",
                orphaned.len(),
                orphaned
            );
            self.stats.unreachable_nodes = orphaned.len();
        }

        for root in &mut roots {
            root.compute_total();
        }

        let result = ParseResult {
            roots,
            stats: self.stats,
        };
        info!(
            "Built {} nodes under {} roots from {} records ({} skipped, {} edges dropped)",
            result.node_count(),
            result.roots.len(),
            result.stats.total_records,
            result.stats.records_skipped,
            result.stats.edges_dropped
        );
        result
    }
}

/// Move `code` and its wired descendants out of the node table into a tree
fn assemble(
    code: &str,
    nodes: &mut HashMap<String, Node>,
    children_of: &mut HashMap<String, Vec<String>>,
) -> Option<Node> {
    let mut node = nodes.remove(code)?;
    for child_code in children_of.remove(code).unwrap_or_default() {
        if let Some(child) = assemble(&child_code, nodes, children_of) {
            node.add_child(child);
        }
    }
    Some(node)
}

/// Build a forest from a sequence of raw BC3 lines
pub fn build_tree<I>(lines: I) -> ParseResult
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut builder = TreeBuilder::new();
    for line in lines {
        builder.push_line(line.as_ref());
    }
    builder.finish()
}
