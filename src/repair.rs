//! Hierarchy repair pass.
//!
//! Some budgets place cost breakdowns directly beside real line items under
//! the same parent. Such a breakdown is promoted to a line item and given a
//! synthetic unit-cost child, so every leaf-level cost ends up owned by
//! exactly one line item and totals still resolve to the original price.

use crate::constants::{MAX_CODE_LEN, SYNTHETIC_SUFFIX};
use crate::models::{Node, NodeKind};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Repair every tree of the forest in place, returning how many nodes were promoted
pub fn repair(forest: &mut [Node]) -> usize {
    let mut taken = HashSet::new();
    for root in forest.iter() {
        root.walk(0, &mut |node, _| {
            taken.insert(node.code.clone());
        });
    }

    let mut promoted = 0;
    for root in forest.iter_mut() {
        promoted += repair_node(root, &mut taken);
    }
    if promoted > 0 {
        info!("Promoted {} orphan breakdowns to line items", promoted);
    }
    promoted
}

/// Post-order repair of one subtree, returning how many nodes were promoted
fn repair_node(node: &mut Node, taken: &mut HashSet<String>) -> usize {
    let mut promoted: usize = node
        .children
        .iter_mut()
        .map(|child| repair_node(child, taken))
        .sum();

    if !node.children.iter().any(|c| c.kind == NodeKind::LineItem) {
        return promoted;
    }

    for child in node
        .children
        .iter_mut()
        .filter(|c| c.kind.is_breakdown() && c.children.is_empty())
    {
        promote(child, taken);
        promoted += 1;
    }
    promoted
}

fn promote(node: &mut Node, taken: &mut HashSet<String>) {
    debug!("Promoting {} ({}) to line item", node.code, node.kind);

    node.kind = NodeKind::LineItem;
    if node.budgeted_quantity.is_none() {
        node.budgeted_quantity = Some(1.0);
    }

    let code = free_synthetic_code(&node.code, taken);
    taken.insert(code.clone());

    let clone = Node {
        code,
        description: node.description.clone(),
        long_description: node.long_description.clone(),
        kind: NodeKind::BreakdownMaterial,
        unit: node.unit.clone(),
        unit_price: Some(1.0),
        budgeted_quantity: Some(1.0),
        budgeted_amount: Some(1.0),
        measurements: Vec::new(),
        children: Vec::new(),
        synthetic: true,
    };
    node.add_child(clone);
    node.compute_total();
}

/// Code of the unit-cost clone of `code`, kept within [`MAX_CODE_LEN`]
///
/// The base is cut so the suffix always survives truncation.
pub fn synthetic_code(code: &str) -> String {
    suffixed_code(code, SYNTHETIC_SUFFIX)
}

/// [`synthetic_code`], or the first `.2`, `.3`, ... variant no node already uses
fn free_synthetic_code(code: &str, taken: &HashSet<String>) -> String {
    let preferred = synthetic_code(code);
    if !taken.contains(&preferred) {
        return preferred;
    }

    let mut n = 2;
    loop {
        let candidate = suffixed_code(code, &format!(".{}", n));
        if !taken.contains(&candidate) {
            warn!(
                "Code {} already exists, using {} for the clone of {}",
                preferred, candidate, code
            );
            return candidate;
        }
        n += 1;
    }
}

fn suffixed_code(code: &str, suffix: &str) -> String {
    let base_len = MAX_CODE_LEN.saturating_sub(suffix.chars().count());
    let base: String = code.chars().take(base_len).collect();
    format!("{}{}", base, suffix)
}

/// Whether `node` is a line item whose first child was synthesized by repair
pub fn has_synthetic_child(node: &Node) -> bool {
    node.kind == NodeKind::LineItem && node.children.first().is_some_and(|c| c.synthetic)
}
