//! Reads written tables back as matrices

use std::path::Path;

use ndarray::Array2;

use crate::error::{AlignError, Result};

/// Load a table written by [`TableWriter`](super::TableWriter)
///
/// A first row that does not parse as numbers is treated as a header and
/// skipped. Every remaining row must have the same number of fields.
pub fn read_table(path: impl AsRef<Path>) -> Result<Array2<f64>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut values = Vec::new();
    let mut columns = None;
    let mut rows = 0;

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let parsed: std::result::Result<Vec<f64>, _> =
            record.iter().map(|field| field.parse::<f64>()).collect();

        let parsed = match parsed {
            Ok(parsed) => parsed,
            Err(_) if line == 0 => continue,
            Err(e) => {
                return Err(AlignError::Serialization(format!(
                    "{:?} line {}: {}",
                    path,
                    line + 1,
                    e
                )))
            }
        };

        match columns {
            None => columns = Some(parsed.len()),
            Some(expected) if expected != parsed.len() => {
                return Err(AlignError::Serialization(format!(
                    "{:?} line {}: expected {} fields, found {}",
                    path,
                    line + 1,
                    expected,
                    parsed.len()
                )));
            }
            Some(_) => {}
        }

        values.extend(parsed);
        rows += 1;
    }

    Array2::from_shape_vec((rows, columns.unwrap_or(0)), values)
        .map_err(|e| AlignError::Serialization(e.to_string()))
}
