//! SVM-light format interchange
//!
//! One line per example: `label feature:value feature:value ...` with
//! 1-based integer feature ids sorted ascending. Labels are kept as the
//! literal token, so multiclass files work unchanged.
//!
//! Example:
//! +1 1:0.5 3:1.2 7:0.8
//! -1 2:0.3 5:2.1

use crate::core::{ClassifyError, Datum, Result};
use crate::dataset::Dataset;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// A dataset read from SVM-light text: features are the file's 1-based
/// integer ids, labels are the literal label tokens
pub type SvmLightDataset = Dataset<usize, String>;

/// Load a dataset from an SVM-light format file
pub fn read_file<P: AsRef<Path>>(path: P) -> Result<SvmLightDataset> {
    let file = File::open(path).map_err(ClassifyError::IoError)?;
    read(BufReader::new(file))
}

/// Load a dataset from a reader (for testing and flexibility)
pub fn read<R: BufRead>(reader: R) -> Result<SvmLightDataset> {
    let mut dataset = Dataset::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(ClassifyError::IoError)?;
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let datum = parse_line(line).map_err(|e| {
            ClassifyError::ParseError(format!("Error parsing line {}: {}", line_num + 1, e))
        })?;
        dataset.add(&datum)?;
    }

    if dataset.is_empty() {
        return Err(ClassifyError::EmptyDataset);
    }

    Ok(dataset)
}

/// Parse a single line in SVM-light format
fn parse_line(line: &str) -> Result<Datum<usize, String>> {
    let mut parts = line.split_whitespace();

    let label = parts
        .next()
        .ok_or_else(|| ClassifyError::ParseError("Empty line".to_string()))?
        .to_string();

    let mut features = Vec::new();
    let mut values = Vec::new();

    for feature_str in parts {
        let (index_str, value_str) = feature_str.split_once(':').ok_or_else(|| {
            ClassifyError::ParseError(format!("Invalid feature format: {feature_str}"))
        })?;

        let index = index_str.parse::<usize>().map_err(|_| {
            ClassifyError::ParseError(format!("Invalid feature index: {index_str}"))
        })?;
        if index == 0 {
            return Err(ClassifyError::ParseError(format!(
                "Feature index must be positive: {index}"
            )));
        }

        let value = value_str.parse::<f64>().map_err(|_| {
            ClassifyError::ParseError(format!("Invalid feature value: {value_str}"))
        })?;

        features.push(index);
        values.push(value);
    }

    Ok(Datum::with_values(features, values, label))
}

/// Write a dataset in SVM-light format.
///
/// Features are emitted sorted ascending by their original 1-based id.
pub fn write_file<P: AsRef<Path>>(dataset: &SvmLightDataset, path: P) -> Result<()> {
    let file = File::create(path).map_err(ClassifyError::IoError)?;
    write(dataset, BufWriter::new(file))
}

/// Write a dataset in SVM-light format to any writer
pub fn write<W: Write>(dataset: &SvmLightDataset, mut writer: W) -> Result<()> {
    let view = dataset.indexed()?;
    for d in 0..view.len() {
        let label = dataset
            .label_index()
            .get(view.labels[d])
            .expect("label id from the same dataset");
        write!(writer, "{label}")?;

        let mut pairs: Vec<(usize, f64)> = view.data[d]
            .iter()
            .enumerate()
            .map(|(pos, &id)| {
                let original = *dataset
                    .feature_index()
                    .get(id)
                    .expect("feature id from the same dataset");
                (original, view.value(d, pos))
            })
            .collect();
        pairs.sort_by_key(|&(original, _)| original);

        for (original, value) in pairs {
            write!(writer, " {original}:{value}")?;
        }
        writeln!(writer)?;
    }
    Ok(())
}
