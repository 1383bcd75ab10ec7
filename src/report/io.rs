use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use polars::{
    frame::DataFrame,
    prelude::{CsvWriter, IntoLazy, LazyFrame, SchemaRef, SerWriter},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{
    error::{DataError, IoError, RatescopeResult},
    report::polars_ext::{DataFrameExt, LazyFrameExt},
};

// ================================================================================================
// Traits
// ================================================================================================

/// Defines a common interface for all chart-ready tables.
pub trait Report {
    /// The table's rows.
    fn as_df(&self) -> &DataFrame;
}

pub trait ReportName {
    fn base_name(&self) -> String;

    fn filename(&self, ext: FileExtension) -> String {
        format!("{}.{}", self.base_name(), ext)
    }
}

pub trait ToSchema {
    /// Returns the canonical schema for this table type.
    fn to_schema() -> SchemaRef;
}

pub trait AsFormattedLazyFrame {
    fn as_formatted_lf(&self) -> LazyFrame;
}

pub trait ToJson {
    /// Serializes the table to a generic JSON Value.
    /// Returns a `Value::Array` containing row objects.
    fn to_json(&self) -> RatescopeResult<serde_json::Value>;
}

pub trait ToCsv {
    /// Writes the table to `<dir>/<base_name>.csv` and returns the written path.
    ///
    /// # Formatting
    /// - Date columns are written as ISO-8601 strings.
    ///
    /// # Side Effects
    /// - Creates the directory if missing.
    /// - Overwrites the file if it exists.
    fn to_csv(&self, dir: impl AsRef<Path>) -> RatescopeResult<PathBuf>;
}

// ================================================================================================
// Blanket Implementations
// ================================================================================================

impl<T> AsFormattedLazyFrame for T
where
    T: Report,
{
    fn as_formatted_lf(&self) -> LazyFrame {
        let df = self.as_df();
        df.clone().lazy().with_iso_dates(df.schema().clone())
    }
}

impl<T> ToJson for T
where
    T: Report,
{
    fn to_json(&self) -> RatescopeResult<serde_json::Value> {
        let rows = self
            .as_formatted_lf()
            .collect()
            .map_err(|e| DataError::DataFrame(e.to_string()))?
            .to_json_rows()?;
        Ok(Value::Array(rows.into_iter().map(Value::Object).collect()))
    }
}

impl<T> ToCsv for T
where
    T: Report + ReportName,
{
    fn to_csv(&self, dir: impl AsRef<Path>) -> RatescopeResult<PathBuf> {
        let dir = dir.as_ref();
        let file_path = dir.join(self.filename(FileExtension::Csv));

        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| {
                IoError::FileSystem(format!(
                    "Failed to create directory {}: {}",
                    dir.display(),
                    e
                ))
            })?;
        }

        let mut df = self
            .as_formatted_lf()
            .collect()
            .map_err(|e| DataError::DataFrame(format!("Failed to format table: {e}")))?;

        let file = File::create(&file_path).map_err(IoError::Io)?;
        CsvWriter::new(&mut BufWriter::new(file))
            .include_header(true)
            .finish(&mut df)
            .map_err(|e| {
                DataError::DataFrame(format!(
                    "Failed to write CSV to '{}': {e}",
                    file_path.display()
                ))
            })?;

        Ok(file_path)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
pub enum FileExtension {
    Csv,
    Json,
}
