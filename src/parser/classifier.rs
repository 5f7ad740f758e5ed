//! Node kind classification
//!
//! The same decision is reachable from two encodings: the `#` markers in a
//! code, and the numeric type code of a `~C` record.

use crate::constants::{GROUP_MARKER, SUBGROUP_MARKER, type_codes};
use crate::models::NodeKind;

/// Decide the kind of a concept from its code and type field
pub fn classify(code: &str, type_field: &str) -> NodeKind {
    if code.contains(GROUP_MARKER) {
        return NodeKind::Grouping;
    }
    if code.contains(SUBGROUP_MARKER) {
        return NodeKind::Subgrouping;
    }
    kind_from_type_code(type_field)
}

/// Map a bare type code to a kind
pub fn kind_from_type_code(type_field: &str) -> NodeKind {
    match type_field {
        type_codes::LINE_ITEM => NodeKind::LineItem,
        type_codes::LABOR => NodeKind::BreakdownLabor,
        type_codes::MACHINERY => NodeKind::BreakdownMachinery,
        type_codes::MATERIAL => NodeKind::BreakdownMaterial,
        _ => NodeKind::Other,
    }
}
