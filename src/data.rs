//! Member dataset loading using Polars
//!
//! Every endpoint reads the dataset fresh from disk. Missing values are
//! represented as `None` once they leave the frame, and become JSON `null`
//! through [`cell_to_json`] / [`float_to_json`].

use crate::error::Error;
use polars::prelude::*;
use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};

/// File name tried in the working directory when the configured path is absent
pub const DATASET_FILE_NAME: &str = "segmented_members_final.csv";

/// Cell tokens read as missing, matching the usual CSV conventions for NA
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Columns coerced to numeric (zero-filled) by [`load_members`]
pub const COERCED_COLUMNS: [&str; 2] = ["churn", "balance"];

/// In-memory member table backed by a Polars `DataFrame`
#[derive(Debug, Clone)]
pub struct MemberTable {
    frame: DataFrame,
}

impl MemberTable {
    /// Wrap an already materialized frame
    pub fn from_frame(frame: DataFrame) -> Self {
        Self { frame }
    }

    /// Number of member rows
    pub fn row_count(&self) -> usize {
        self.frame.height()
    }

    /// Column names in file order
    pub fn column_names(&self) -> Vec<String> {
        self.frame.get_column_names().iter().map(|name| name.to_string()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    fn series(&self, name: &str) -> crate::Result<&Series> {
        self.frame.column(name).map_err(|_| Error::MissingColumn(name.to_string()))
    }

    /// Column values as floats; unparseable cells and NaN become `None`
    pub fn numeric(&self, name: &str) -> crate::Result<Vec<Option<f64>>> {
        let series = self.series(name)?.cast(&DataType::Float64)?;
        let values = series.f64()?.into_iter().map(|v| v.filter(|x| !x.is_nan())).collect();
        Ok(values)
    }

    /// Like [`MemberTable::numeric`], but an absent column reads as all-missing
    pub fn numeric_or_missing(&self, name: &str) -> crate::Result<Vec<Option<f64>>> {
        if self.has_column(name) {
            self.numeric(name)
        } else {
            Ok(vec![None; self.row_count()])
        }
    }

    /// Column values with missing cells replaced by `fill`
    pub fn numeric_filled(&self, name: &str, fill: f64) -> crate::Result<Vec<f64>> {
        Ok(self.numeric(name)?.into_iter().map(|v| v.unwrap_or(fill)).collect())
    }

    /// Number of null (or NaN, for float columns) cells in a column
    pub fn missing_count(&self, name: &str) -> crate::Result<usize> {
        let series = self.series(name)?;
        let nan_count = match series.dtype() {
            DataType::Float32 | DataType::Float64 => series
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .filter(|v| matches!(v, Some(x) if x.is_nan()))
                .count(),
            _ => 0,
        };
        Ok(series.null_count() + nan_count)
    }

    /// Coerce [`COERCED_COLUMNS`] to floats, filling missing cells with zero
    pub fn coerce_defaults(&mut self) -> crate::Result<()> {
        for name in COERCED_COLUMNS {
            if !self.has_column(name) {
                continue;
            }
            let filled = self.numeric_filled(name, 0.0)?;
            self.frame.with_column(Series::new(name, filled))?;
        }
        Ok(())
    }

    /// Every row as a JSON object keyed by column name
    pub fn records(&self) -> Vec<Map<String, Value>> {
        let columns = self.frame.get_columns();
        (0..self.row_count())
            .map(|row| {
                columns
                    .iter()
                    .map(|series| {
                        let cell = series.get(row).map(cell_to_json).unwrap_or(Value::Null);
                        (series.name().to_string(), cell)
                    })
                    .collect()
            })
            .collect()
    }
}

/// Resolve the dataset location, falling back to the working directory
pub fn resolve_dataset_path(configured: &Path) -> PathBuf {
    if configured.exists() {
        configured.to_path_buf()
    } else {
        PathBuf::from(DATASET_FILE_NAME)
    }
}

/// Read the dataset exactly as stored, without coercion
pub fn read_members(path: &Path) -> crate::Result<MemberTable> {
    let resolved = resolve_dataset_path(path);
    if !resolved.exists() {
        let path = std::path::absolute(&resolved).unwrap_or(resolved);
        return Err(Error::DatasetMissing { path });
    }

    tracing::debug!(path = %resolved.display(), "reading member dataset");
    let null_values = NULL_TOKENS.iter().map(|token| token.to_string()).collect();
    let frame = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .with_parse_options(
            CsvParseOptions::default().with_null_values(Some(NullValues::AllColumns(null_values))),
        )
        .try_into_reader_with_file_path(Some(resolved))?
        .finish()?;

    Ok(MemberTable::from_frame(frame))
}

/// Read the dataset and apply the numeric coercions the endpoints rely on
pub fn load_members(path: &Path) -> crate::Result<MemberTable> {
    let mut table = read_members(path)?;
    table.coerce_defaults()?;
    Ok(table)
}

/// Convert one dataframe cell into JSON, mapping NaN and null to `null`
pub fn cell_to_json(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(v) => Value::Bool(v),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float32(v) => float_to_json(f64::from(v)),
        AnyValue::Float64(v) => float_to_json(v),
        AnyValue::String(v) => Value::String(v.to_string()),
        AnyValue::StringOwned(v) => Value::String(v.to_string()),
        other => Value::String(other.to_string()),
    }
}

/// Finite floats become numbers, everything else `null`
pub fn float_to_json(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}
