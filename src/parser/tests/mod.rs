//! Test utilities for BC3 parser testing
//!
//! Shared fixtures used across the parser test modules.

use std::io::Write;
use tempfile::NamedTempFile;

// Test modules
mod builder_tests;

/// A small but complete budget: one chapter tree, a line item with a
/// full breakdown, long texts and measurements
pub fn create_test_bc3() -> String {
    r#"~V|SOFT S.A.|FIEBDC-3/2020|Presupuesto||ANSI|
~K|\2\2\3\2\2\2\2\EUR\|0|
~C|OBRA##||Reforma de local|1520,5|010124|0|
~C|01#||Demoliciones|520,5|010124|0|
~C|02#||Pavimentos|1000|010124|0|
~C|D01|m2|Demolicion de tabique|10,41|010124|0|
~C|P01|m2|Solado de gres|25|010124|0|
~C|MO001|h|Oficial 1a|18,5|010124|1|
~C|MQ001|h|Radial|2,1|010124|2|
~C|MT001|m2|Baldosa de gres|9,75|010124|3|
~T|P01|Solado de gres porcelanico 30x30 cm recibido con mortero|
~T|P01|Texto duplicado que se ignora|
~D|OBRA##|01#\1\1\02#\1\1\|
~D|01#|D01\1\50\|
~D|02#|P01\1\40\|
~D|P01|MO001\1\0,4\MQ001\1\0,1\MT001\1\1,05\|
~M|01#\D01|1\1\|50|Planta baja\\10\5\\|
~M|02#\P01|1\1\|40|Salon\\8\5\\|
~M|02#\P01|1\2\|0|Pasillo\\0\0\\|
"#
    .to_string()
}

/// Helper to create a temporary file with given content
pub fn create_temp_file(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{}", content).unwrap();
    temp_file
}
