//! Tests for the streaming tree builder

use super::*;
use crate::models::{NodeKind, find_in_forest};
use crate::parser::{TreeBuilder, build_tree};
use crate::reader::read_lines;
use std::collections::HashSet;

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value should be present");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_fixture_structure() {
    let result = build_tree(create_test_bc3().lines());

    assert_eq!(result.roots.len(), 1);
    let root = &result.roots[0];
    assert_eq!(root.code, "OBRA##");
    assert_eq!(root.kind, NodeKind::Grouping);
    assert_eq!(root.child_codes(), vec!["01#", "02#"]);

    let p01 = root.find("P01").unwrap();
    assert_eq!(p01.kind, NodeKind::LineItem);
    assert_eq!(p01.unit.as_deref(), Some("m2"));
    assert_eq!(p01.child_codes(), vec!["MO001", "MQ001", "MT001"]);
    assert_eq!(
        p01.children.iter().map(|c| c.kind).collect::<Vec<_>>(),
        vec![
            NodeKind::BreakdownLabor,
            NodeKind::BreakdownMachinery,
            NodeKind::BreakdownMaterial
        ]
    );
    assert_eq!(result.node_count(), 8);
}

#[test]
fn test_fixture_totals() {
    let result = build_tree(create_test_bc3().lines());
    let roots = &result.roots;

    assert_close(find_in_forest(roots, "D01").unwrap().budgeted_amount, 520.5);
    assert_close(find_in_forest(roots, "P01").unwrap().budgeted_amount, 1000.0);
    assert_close(find_in_forest(roots, "MO001").unwrap().budgeted_amount, 7.4);
    assert_close(find_in_forest(roots, "MT001").unwrap().budgeted_amount, 10.2375);

    // Roots are never the child of an edge, so no quantity and no derived amount
    let root = &roots[0];
    assert_eq!(root.budgeted_quantity, None);
    assert_eq!(root.budgeted_amount, None);
    assert_close(root.unit_price, 1520.5);
}

#[test]
fn test_fixture_stats() {
    let result = build_tree(create_test_bc3().lines());
    let stats = &result.stats;

    assert_eq!(stats.total_records, 17);
    assert_eq!(stats.concepts, 8);
    assert_eq!(stats.long_texts, 1);
    assert_eq!(stats.edges, 7);
    assert_eq!(stats.measurements, 3);
    assert_eq!(stats.records_skipped, 1);
    assert_eq!(stats.edges_dropped, 0);
    assert_eq!(stats.unreachable_nodes, 0);
}

#[test]
fn test_first_long_text_wins() {
    let result = build_tree(create_test_bc3().lines());
    let p01 = find_in_forest(&result.roots, "P01").unwrap();

    assert_eq!(
        p01.long_description.as_deref(),
        Some("Solado de gres porcelanico 30x30 cm recibido con mortero")
    );
    assert_eq!(p01.description, "Solado de gres");
}

#[test]
fn test_long_text_keeps_inner_separators() {
    let lines = [
        "~C|A|u|Corto|1||0|",
        "~T|A|uno|dos|",
        "~C|B|u|Otro|1||0|",
        "~T|B|con \\ barra|",
    ];
    let result = build_tree(lines);

    let a = find_in_forest(&result.roots, "A").unwrap();
    assert_eq!(a.long_description.as_deref(), Some("uno|dos"));
    let b = find_in_forest(&result.roots, "B").unwrap();
    assert_eq!(b.long_description.as_deref(), Some("con \\ barra"));
}

#[test]
fn test_long_text_before_definition_is_ignored() {
    let lines = ["~T|A|Texto temprano|", "~C|A|u|Corto|1||0|", "~T|A|Texto tardio|"];
    let result = build_tree(lines);

    assert_eq!(
        result.roots[0].long_description.as_deref(),
        Some("Texto tardio")
    );
    assert_eq!(result.stats.records_skipped, 1);
}

#[test]
fn test_measurements_keep_raw_records_in_order() {
    let result = build_tree(create_test_bc3().lines());
    let p01 = find_in_forest(&result.roots, "P01").unwrap();

    assert_eq!(p01.measurements.len(), 2);
    assert!(p01.measurements[0].starts_with("~M|02#\\P01|1\\1\\|40|Salon"));
    assert!(p01.measurements[1].contains("Pasillo"));

    let d01 = find_in_forest(&result.roots, "D01").unwrap();
    assert_eq!(d01.measurements.len(), 1);
}

#[test]
fn test_roots_are_complement_of_child_codes() {
    let lines = [
        "~C|A||A||||",
        "~C|B||B||||",
        "~C|C||C||||",
        "~C|D||D||||",
        "~C|E||E||||",
        "~C|F||F||||",
        "~D|A|B\\1\\1\\C\\1\\1\\|",
        "~D|C|D\\1\\1\\|",
        "~D|E|F\\\\\\|",
    ];
    let result = build_tree(lines);

    let child_codes: HashSet<&str> = ["B", "C", "D", "F"].into_iter().collect();
    let expected: Vec<&str> = ["A", "B", "C", "D", "E", "F"]
        .into_iter()
        .filter(|c| !child_codes.contains(c))
        .collect();
    let roots: Vec<&str> = result.roots.iter().map(|r| r.code.as_str()).collect();

    assert_eq!(roots, expected);
    assert_eq!(result.node_count(), 6);
}

#[test]
fn test_last_edge_wins() {
    let lines = [
        "~C|P1||Padre 1||||",
        "~C|P2||Padre 2||||",
        "~C|H||Hijo|3||0|",
        "~D|P1|H\\1\\2\\|",
        "~D|P2|H\\1\\5\\|",
    ];
    let result = build_tree(lines);

    let p1 = find_in_forest(&result.roots, "P1").unwrap();
    let p2 = find_in_forest(&result.roots, "P2").unwrap();
    assert!(p1.children.is_empty());
    assert_eq!(p2.child_codes(), vec!["H"]);
    assert_eq!(p2.children[0].budgeted_quantity, Some(5.0));
    assert_eq!(p2.children[0].budgeted_amount, Some(15.0));
}

#[test]
fn test_redefinition_overwrites_node() {
    let lines = ["~C|A|m|Primera|1||0|", "~C|A|kg|Segunda|2||3|"];
    let result = build_tree(lines);

    assert_eq!(result.roots.len(), 1);
    let node = &result.roots[0];
    assert_eq!(node.description, "Segunda");
    assert_eq!(node.kind, NodeKind::BreakdownMaterial);
    assert_eq!(node.unit_price, Some(2.0));
}

#[test]
fn test_malformed_concept_is_tolerated() {
    let lines = [
        "~C|P||Padre||||",
        "~C|ROTO|m|Corto|",
        "~D|P|ROTO\\1\\2\\|",
        "~M|P\\ROTO|1|2|",
    ];
    let result = build_tree(lines);

    assert!(find_in_forest(&result.roots, "ROTO").is_none());
    assert_eq!(result.roots.len(), 1);
    assert!(result.roots[0].children.is_empty());
    assert_eq!(result.stats.records_skipped, 1);
    assert_eq!(result.stats.edges_dropped, 1);
}

#[test]
fn test_empty_code_creates_no_node() {
    let result = build_tree(["~C||m|Sin codigo|1||0|"]);
    assert!(result.roots.is_empty());
    assert_eq!(result.stats.records_skipped, 1);
}

#[test]
fn test_child_of_unknown_parent_becomes_root() {
    let lines = ["~C|H||Hijo||||", "~D|FANTASMA|H\\1\\1\\|"];
    let result = build_tree(lines);

    assert_eq!(result.roots.len(), 1);
    assert_eq!(result.roots[0].code, "H");
    assert_eq!(result.roots[0].budgeted_quantity, Some(1.0));
    assert_eq!(result.stats.edges_dropped, 1);
}

#[test]
fn test_malformed_measurement_and_decomposition_skipped() {
    let lines = ["~C|A||A||||", "~M|SINBARRA|1|", "~M", "~D|A"];
    let result = build_tree(lines);

    assert!(result.roots[0].measurements.is_empty());
    assert_eq!(result.stats.records_skipped, 3);
}

#[test]
fn test_non_numeric_fields_are_absent() {
    let lines = [
        "~C|P||Padre||||",
        "~C|H|u|Hijo|n/a||0|",
        "~D|P|H\\1\\mucho\\|",
    ];
    let result = build_tree(lines);
    let child = find_in_forest(&result.roots, "H").unwrap();

    assert_eq!(child.unit_price, None);
    assert_eq!(child.budgeted_quantity, None);
    assert_eq!(child.budgeted_amount, None);
}

#[test]
fn test_cycle_members_are_discarded() {
    let lines = [
        "~C|R||Raiz||||",
        "~C|A||A||||",
        "~C|B||B||||",
        "~D|R|A\\1\\1\\|",
        "~D|A|B\\1\\1\\|",
        "~D|B|A\\1\\1\\|",
    ];
    let result = build_tree(lines);

    assert_eq!(result.roots.len(), 1);
    assert!(result.roots[0].children.is_empty());
    assert_eq!(result.stats.unreachable_nodes, 2);
}

#[test]
fn test_roots_sorted_by_code() {
    let lines = ["~C|Z||Z||||", "~C|B||B||||", "~C|M||M||||"];
    let result = build_tree(lines);
    let roots: Vec<&str> = result.roots.iter().map(|r| r.code.as_str()).collect();
    assert_eq!(roots, vec!["B", "M", "Z"]);
}

#[test]
fn test_forward_references_resolve() {
    let lines = [
        "~D|P|H\\1\\2\\|",
        "~M|P\\H|1|",
        "~C|H|u|Hijo|4||0|",
        "~C|P||Padre||||",
    ];
    let result = build_tree(lines);
    let child = find_in_forest(&result.roots, "H").unwrap();

    assert_eq!(result.roots[0].code, "P");
    assert_eq!(child.budgeted_amount, Some(8.0));
    assert_eq!(child.measurements, vec!["~M|P\\H|1|".to_string()]);
}

#[test]
fn test_incremental_builder_matches_batch() {
    let mut builder = TreeBuilder::new();
    for line in create_test_bc3().lines() {
        builder.push_line(line);
    }
    let incremental = builder.finish();
    let batch = build_tree(create_test_bc3().lines());

    assert_eq!(incremental.roots, batch.roots);
}

#[test]
fn test_build_from_file() {
    let temp_file = create_temp_file(&create_test_bc3());
    let lines = read_lines(temp_file.path()).unwrap();
    let result = build_tree(&lines);

    assert_eq!(result.roots.len(), 1);
    assert_eq!(result.node_count(), 8);
}
