//! Dataset loading and row-level validation.
//!
//! Streams the PBC CSV and keeps only rows where every required column
//! parses to a finite number. Bad rows are dropped, never imputed.
//! Both the controller and the worker load the dataset themselves;
//! nothing is shipped across the process boundary.

use std::path::Path;

use crate::error::{TrainError, TrainResult};

/// Feature columns, in model input order, followed by the label column.
pub const FEATURE_COLUMNS: [&str; 5] =
    ["Bilirubin", "Albumin", "Copper", "Platelets", "Prothrombin"];
pub const LABEL_COLUMN: &str = "Stage";

/// Parallel feature/label containers. Built once per load, immutable after.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Row-major, fixed width `FEATURE_COLUMNS.len()`.
    pub features: Vec<Vec<f64>>,
    /// Stage label per row, same length as `features`.
    pub labels: Vec<i64>,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Load and filter the dataset.
///
/// Fails with `SourceUnavailable` when the file cannot be opened or its
/// header is missing a required column, and with `EmptyDataset` when no
/// valid rows remain.
pub fn load(path: &Path) -> TrainResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| TrainError::SourceUnavailable(format!("{}: {e}", path.display())))?;

    let headers = reader
        .headers()
        .map_err(|e| TrainError::SourceUnavailable(format!("{}: {e}", path.display())))?
        .clone();

    let column_index = |name: &str| -> TrainResult<usize> {
        headers.iter().position(|h| h == name).ok_or_else(|| {
            TrainError::SourceUnavailable(format!(
                "{}: missing required column '{name}'",
                path.display()
            ))
        })
    };

    let feature_indices: Vec<usize> = FEATURE_COLUMNS
        .iter()
        .map(|&name| column_index(name))
        .collect::<TrainResult<_>>()?;
    let label_index = column_index(LABEL_COLUMN)?;

    let mut features: Vec<Vec<f64>> = Vec::new();
    let mut labels: Vec<i64> = Vec::new();
    let mut dropped = 0usize;

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(_) => {
                // Structurally broken row, same treatment as non-numeric.
                dropped += 1;
                continue;
            }
        };

        match parse_row(&record, &feature_indices, label_index) {
            Some((row, label)) => {
                features.push(row);
                labels.push(label);
            }
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        log::info!(
            "Dropped {dropped} row(s) with non-numeric values from {}",
            path.display()
        );
    }

    if features.is_empty() {
        return Err(TrainError::EmptyDataset);
    }

    Ok(Dataset { features, labels })
}

/// Parse one CSV record. `None` means the row has a missing or
/// non-finite value in a required column and must be dropped.
fn parse_row(
    record: &csv::StringRecord,
    feature_indices: &[usize],
    label_index: usize,
) -> Option<(Vec<f64>, i64)> {
    let mut row = Vec::with_capacity(feature_indices.len());
    for &idx in feature_indices {
        row.push(parse_finite(record.get(idx)?)?);
    }
    let label = parse_finite(record.get(label_index)?)?;
    Some((row, label.round() as i64))
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const HEADER: &str = "ID,Bilirubin,Albumin,Copper,Platelets,Prothrombin,Stage\n";

    fn write_csv(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_keeps_valid_rows_in_order() {
        let file = write_csv("1,1.4,2.6,156,190,12.2,4\n2,0.9,3.1,54,221,10.6,3\n");
        let dataset = load(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.features[0], vec![1.4, 2.6, 156.0, 190.0, 12.2]);
        assert_eq!(dataset.labels, vec![4, 3]);
    }

    #[test]
    fn test_load_drops_non_numeric_rows() {
        let file = write_csv(
            "1,1.4,2.6,156,190,12.2,4\n\
             2,NA,3.1,54,221,10.6,3\n\
             3,0.7,2.9,inf,151,11.0,2\n\
             4,0.7,2.9,33,151,11.0,2\n",
        );
        let dataset = load(file.path()).unwrap();
        // 4 raw rows, 2 dropped (NA bilirubin, infinite copper).
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.labels, vec![4, 2]);
    }

    #[test]
    fn test_load_drops_short_rows() {
        let file = write_csv("1,1.4,2.6,156\n2,0.9,3.1,54,221,10.6,3\n");
        let dataset = load(file.path()).unwrap();
        assert_eq!(dataset.len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_source_unavailable() {
        let err = load(Path::new("no/such/file.csv")).unwrap_err();
        assert!(matches!(err, TrainError::SourceUnavailable(_)));
    }

    #[test]
    fn test_load_missing_column_is_source_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"ID,Bilirubin,Albumin\n1,1.4,2.6\n").unwrap();
        file.flush().unwrap();
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, TrainError::SourceUnavailable(_)));
    }

    #[test]
    fn test_load_all_rows_invalid_is_empty_dataset() {
        let file = write_csv("1,NA,NA,NA,NA,NA,NA\n");
        let err = load(file.path()).unwrap_err();
        assert!(matches!(err, TrainError::EmptyDataset));
    }
}
