//! Point data and the input collaborator that loads it using Polars

use crate::error::{Result, SegmentationError};
use anyhow::Context;
use ndarray::{Array2, ArrayView1};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::PathBuf;

/// Immutable set of customer points, one row per customer and one column per feature
#[derive(Debug, Clone, PartialEq)]
pub struct PointSet {
    values: Array2<f64>,
    feature_names: Vec<String>,
}

impl PointSet {
    /// Wrap a feature matrix. Missing feature names are filled in as `feature_<n>`.
    ///
    /// Every value must be finite; NaN or infinite coordinates are rejected.
    pub fn new(values: Array2<f64>, feature_names: Vec<String>) -> Result<Self> {
        if values.nrows() == 0 || values.ncols() == 0 {
            return Err(SegmentationError::EmptyPointSet);
        }

        if let Some(((row, column), _)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(SegmentationError::NonFiniteValue { row, column });
        }

        let mut feature_names = feature_names;
        feature_names.truncate(values.ncols());
        for j in feature_names.len()..values.ncols() {
            feature_names.push(format!("feature_{j}"));
        }

        Ok(Self {
            values,
            feature_names,
        })
    }

    /// Build a point set from fixed-width rows
    pub fn from_rows<const D: usize>(rows: &[[f64; D]]) -> Result<Self> {
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        let values = Array2::from_shape_vec((rows.len(), D), flat)
            .map_err(|_| SegmentationError::EmptyPointSet)?;
        Self::new(values, Vec::new())
    }

    pub fn len(&self) -> usize {
        self.values.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.values.nrows() == 0
    }

    pub fn n_features(&self) -> usize {
        self.values.ncols()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn point(&self, index: usize) -> ArrayView1<'_, f64> {
        self.values.row(index)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of distinct points; k-means cannot place more clusters than this
    pub fn distinct_count(&self) -> usize {
        self.values
            .outer_iter()
            .map(|row| {
                row.iter()
                    // -0.0 and 0.0 are the same location
                    .map(|&v| if v == 0.0 { 0u64 } else { v.to_bits() })
                    .collect::<Vec<u64>>()
            })
            .collect::<HashSet<_>>()
            .len()
    }
}

/// Supplies the point set to the analysis
pub trait PointSource {
    fn load(&self) -> anyhow::Result<PointSet>;
}

/// Already-loaded points, handy for tests and embedding
impl PointSource for PointSet {
    fn load(&self) -> anyhow::Result<PointSet> {
        Ok(self.clone())
    }
}

/// Delimiter-separated table on disk (e.g. `age spend` rows separated by spaces)
#[derive(Debug, Clone)]
pub struct DelimitedFileSource {
    pub path: PathBuf,
    pub separator: u8,
    pub has_header: bool,
}

impl DelimitedFileSource {
    pub fn new(path: impl Into<PathBuf>, separator: u8) -> Self {
        Self {
            path: path.into(),
            separator,
            has_header: true,
        }
    }
}

impl PointSource for DelimitedFileSource {
    fn load(&self) -> anyhow::Result<PointSet> {
        load_points(&self.path, self.separator, self.has_header)
    }
}

/// Load a numeric table, dropping rows that hold non-numeric, missing or
/// non-finite values
///
/// With a space separator any run of whitespace separates columns, so aligned
/// or trailing-space rows parse as expected. Extra fields beyond the header
/// are ignored.
///
/// # Arguments
/// * `file_path` - Path to the delimited text file
/// * `separator` - Column separator byte (b' ' for the customer age/spend file)
/// * `has_header` - Whether the first row names the features
///
/// # Returns
/// * `PointSet` with one row per valid record
pub fn load_points(
    file_path: impl Into<PathBuf>,
    separator: u8,
    has_header: bool,
) -> anyhow::Result<PointSet> {
    let file_path = file_path.into();

    let raw = std::fs::read_to_string(&file_path)
        .with_context(|| format!("failed to open {}", file_path.display()))?;
    let table = normalize_rows(&raw, separator);

    let df = CsvReadOptions::default()
        .with_has_header(has_header)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(separator)
                .with_truncate_ragged_lines(true),
        )
        .into_reader_with_file_handle(Cursor::new(table.into_bytes()))
        .finish()
        .and_then(|df| {
            df.lazy()
                .select([all().cast(DataType::Float64)])
                .drop_nulls(None)
                .collect()
        })
        .with_context(|| format!("failed to parse {}", file_path.display()))?;

    let feature_names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let columns: Vec<Vec<f64>> = df
        .get_columns()
        .iter()
        .map(|series| Ok(series.f64()?.into_no_null_iter().collect()))
        .collect::<anyhow::Result<_>>()?;

    // NaN and inf parse as floats, so they survive drop_nulls
    let kept: Vec<usize> = (0..df.height())
        .filter(|&i| columns.iter().all(|column| column[i].is_finite()))
        .collect();

    if kept.is_empty() {
        anyhow::bail!("No valid rows found in {}", file_path.display());
    }
    if kept.len() < df.height() {
        tracing::warn!(
            dropped = df.height() - kept.len(),
            path = %file_path.display(),
            "dropped rows with non-finite values"
        );
    }

    let values =
        Array2::from_shape_fn((kept.len(), columns.len()), |(i, j)| columns[j][kept[i]]);

    tracing::debug!(
        rows = values.nrows(),
        features = values.ncols(),
        path = %file_path.display(),
        "loaded point set"
    );

    Ok(PointSet::new(values, feature_names)?)
}

/// Trim every field and drop blank lines; a space separator collapses runs of
/// whitespace into one column break
fn normalize_rows(raw: &str, separator: u8) -> String {
    let separator = char::from(separator);

    let mut table = String::with_capacity(raw.len());
    for line in raw.lines() {
        let fields: Vec<&str> = if separator == ' ' {
            line.split_whitespace().collect()
        } else {
            line.split(separator).map(str::trim).collect()
        };
        if fields.iter().all(|field| field.is_empty()) {
            continue;
        }
        table.push_str(&fields.join(&separator.to_string()));
        table.push('\n');
    }
    table
}
