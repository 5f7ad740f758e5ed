//! Application constants for the BC3 processor
//!
//! Record tags, type codes, identifier limits and output defaults shared
//! by the parser, the repair pass and the writers.

// =============================================================================
// Record Tags
// =============================================================================

/// Record tags as they appear at the start of each line
pub mod tags {
    /// Node definition (concept): code, unit, summary, price, date, type
    pub const CONCEPT: &str = "~C";

    /// Long text attached to an existing concept
    pub const TEXT: &str = "~T";

    /// Decomposition: parent code followed by child triples
    pub const DECOMPOSITION: &str = "~D";

    /// Measurement lines justifying a budgeted quantity
    pub const MEASUREMENT: &str = "~M";
}

/// Field separator inside a record
pub const FIELD_SEPARATOR: char = '|';

/// Separator between sub-fields (child triples, measurement paths)
pub const SUBFIELD_SEPARATOR: char = '\\';

// =============================================================================
// Type Codes
// =============================================================================

/// Concept type codes carried in the sixth field of a `~C` record
pub mod type_codes {
    pub const LINE_ITEM: &str = "0";
    pub const LABOR: &str = "1";
    pub const MACHINERY: &str = "2";
    pub const MATERIAL: &str = "3";

    /// Types that count as "real" cost concepts (line item plus breakdowns)
    pub const PRICED: &[&str] = &[LINE_ITEM, LABOR, MACHINERY, MATERIAL];

    /// Breakdown types collapsed to material during normalization
    pub const BREAKDOWNS: &[&str] = &[LABOR, MACHINERY, MATERIAL];
}

/// Marker for top-level groupings (chapters); checked before [`SUBGROUP_MARKER`]
pub const GROUP_MARKER: &str = "##";

/// Marker for sub-groupings (sub-chapters)
pub const SUBGROUP_MARKER: &str = "#";

// =============================================================================
// Identifier Limits and Repair
// =============================================================================

/// Maximum code length accepted when writing records back
pub const MAX_CODE_LEN: usize = 20;

/// Suffix appended to a promoted node's code to name its unit-cost clone
pub const SYNTHETIC_SUFFIX: &str = ".1";

/// Unit assigned to priced concepts with an empty unit during normalization
pub const DEFAULT_UNIT: &str = "UD";

// =============================================================================
// Output Defaults
// =============================================================================

/// Default directory for every generated file
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// File extension of BC3 inputs (compared case-insensitively)
pub const BC3_EXTENSION: &str = "bc3";

/// Default delimiter of the exported table
pub const DEFAULT_CSV_DELIMITER: char = ';';

/// Default separator between measurement records inside one CSV cell
pub const DEFAULT_MEASUREMENT_SEPARATOR: &str = "⏎";

/// Suffixes of the files generated for an input named `<stem>.bc3`
pub mod output_suffixes {
    pub const NORMALIZED: &str = "_material.bc3";
    pub const PATCHED: &str = "_patched.bc3";
    pub const TREE_CSV: &str = "_tree.csv";
}

/// Header row of the exported table
pub const EXPORT_COLUMNS: &[&str] = &[
    "kind",
    "code",
    "description",
    "long_description",
    "unit",
    "unit_price",
    "budgeted_quantity",
    "budgeted_amount",
    "children",
    "measurements",
];
