//! Tabular export of the budget tree.
//!
//! One row per node in pre-order. Absent numerics are written as empty
//! cells, never as zero.

use crate::constants::{DEFAULT_CSV_DELIMITER, DEFAULT_MEASUREMENT_SEPARATOR, EXPORT_COLUMNS};
use crate::error::{Bc3Error, Result};
use crate::models::Node;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Formatting options for the exported table
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub delimiter: u8,
    pub measurement_separator: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_CSV_DELIMITER as u8,
            measurement_separator: DEFAULT_MEASUREMENT_SEPARATOR.to_string(),
        }
    }
}

/// One flattened node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportRow {
    pub kind: String,
    pub code: String,
    pub description: String,
    pub long_description: String,
    pub unit: String,
    pub unit_price: String,
    pub budgeted_quantity: String,
    pub budgeted_amount: String,
    pub children: String,
    pub measurements: String,
}

impl ExportRow {
    fn from_node(node: &Node, measurement_separator: &str) -> Self {
        Self {
            kind: node.kind.to_string(),
            code: node.code.clone(),
            description: node.description.clone(),
            long_description: node.long_description.clone().unwrap_or_default(),
            unit: node.unit.clone().unwrap_or_default(),
            unit_price: format_number(node.unit_price),
            budgeted_quantity: format_number(node.budgeted_quantity),
            budgeted_amount: format_number(node.budgeted_amount),
            children: node.child_codes().join(","),
            measurements: node.measurements.join(measurement_separator),
        }
    }

    fn as_record(&self) -> [&str; 10] {
        [
            &self.kind,
            &self.code,
            &self.description,
            &self.long_description,
            &self.unit,
            &self.unit_price,
            &self.budgeted_quantity,
            &self.budgeted_amount,
            &self.children,
            &self.measurements,
        ]
    }
}

fn format_number(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Flatten the forest into rows in pre-order
pub fn export_rows(roots: &[Node], options: &ExportOptions) -> Vec<ExportRow> {
    let mut rows = Vec::new();
    for root in roots {
        root.walk(0, &mut |node, _| {
            rows.push(ExportRow::from_node(node, &options.measurement_separator));
        });
    }
    rows
}

/// Write the forest to a delimited file with a header row
pub fn export_csv(roots: &[Node], path: &Path, options: &ExportOptions) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Bc3Error::WriteFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .from_path(path)?;

    writer.write_record(EXPORT_COLUMNS)?;
    let rows = export_rows(roots, options);
    for row in &rows {
        writer.write_record(row.as_record())?;
    }
    writer.flush()?;

    debug!("Export columns: {}", EXPORT_COLUMNS.join(","));
    info!("Exported {} rows to {}", rows.len(), path.display());
    Ok(rows.len())
}
