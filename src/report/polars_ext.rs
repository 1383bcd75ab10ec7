use polars::prelude::{
    DataFrame, DataType, Expr, JsonFormat, JsonWriter, LazyFrame, SchemaRef, SerWriter, col, lit,
    when,
};
use serde_json::Value;

use crate::error::{DataError, IoError, RatescopeError, RatescopeResult};

pub(super) fn polars_to_ratescope_error(table: &str, e: polars::error::PolarsError) -> RatescopeError {
    RatescopeError::Data(DataError::DataFrame(format!(
        "Error while building {table} from offer book: {e}"
    )))
}

pub trait ExprExt {
    /// Replaces every value other than `keep` with `label`.
    ///
    /// Applying it twice with the same arguments yields the same column as applying it once,
    /// as long as `label` is not itself a hotel in the data.
    fn relabel_others(self, keep: &str, label: &str) -> Expr;
}

impl ExprExt for Expr {
    fn relabel_others(self, keep: &str, label: &str) -> Expr {
        when(self.clone().eq(lit(keep)))
            .then(self)
            .otherwise(lit(label))
    }
}

pub trait DataFrameExt {
    fn to_json_rows(&self) -> RatescopeResult<Vec<serde_json::Map<String, Value>>>;
}

impl DataFrameExt for DataFrame {
    fn to_json_rows(&self) -> RatescopeResult<Vec<serde_json::Map<String, Value>>> {
        let height = self.height();
        if height == 0 {
            return Ok(Vec::new());
        }

        // Heuristic: approx 2^6 bytes per cell
        let estimated_row_size = self.width() * (1 << 6);
        let mut buf = Vec::with_capacity(height * estimated_row_size);

        JsonWriter::new(&mut buf)
            .with_json_format(JsonFormat::Json)
            .finish(&mut self.clone())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;

        let json_val: Value = serde_json::from_slice(&buf).map_err(IoError::Json)?;

        match json_val {
            Value::Array(rows) => Ok(rows
                .into_iter()
                .filter_map(|v| match v {
                    Value::Object(map) => Some(map),
                    _ => None,
                })
                .collect()),
            _ => {
                Err(DataError::DataFrame("Polars JSON output was not an array".to_string()).into())
            }
        }
    }
}

pub trait LazyFrameExt {
    /// Renders every `Date` column as an ISO-8601 (`YYYY-MM-DD`) string.
    fn with_iso_dates(self, schema: SchemaRef) -> Self;
}

impl LazyFrameExt for LazyFrame {
    fn with_iso_dates(self, schema: SchemaRef) -> Self {
        let date_exprs = schema
            .iter()
            .filter_map(|(name, dtype)| {
                if matches!(dtype, DataType::Date) {
                    Some(col(name.as_str()).cast(DataType::String).alias(name.as_str()))
                } else {
                    None
                }
            })
            .collect::<Vec<_>>();

        if date_exprs.is_empty() {
            return self;
        }

        self.with_columns(date_exprs)
    }
}

#[cfg(test)]
mod tests {
    use polars::{df, prelude::IntoLazy};

    use super::*;

    #[test]
    fn test_relabel_others_is_idempotent() {
        let df = df![
            "hotel_name" => &["A", "B", "C", "A"],
        ]
        .expect("Failed to create DF");

        let once = df
            .clone()
            .lazy()
            .select([col("hotel_name").relabel_others("A", "Other Hotels")])
            .collect()
            .expect("Failed to relabel once");
        let twice = once
            .clone()
            .lazy()
            .select([col("hotel_name").relabel_others("A", "Other Hotels")])
            .collect()
            .expect("Failed to relabel twice");

        assert!(once.equals(&twice));
        let labels = once
            .column("hotel_name")
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["A", "Other Hotels", "Other Hotels", "A"]);
    }

    #[test]
    fn test_to_json_rows_renders_iso_dates() {
        let df = df![
            "check_in" => &["2024-01-01", "2024-01-02"],
            "stock" => &[3_i64, 4],
        ]
        .expect("Failed to create DF")
        .lazy()
        .with_column(col("check_in").cast(DataType::Date))
        .collect()
        .expect("Failed to cast dates");

        let schema = df.schema().clone();
        let rows = df
            .lazy()
            .with_iso_dates(schema)
            .collect()
            .expect("Failed to format dates")
            .to_json_rows()
            .expect("Failed to serialize rows");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["check_in"], Value::String("2024-01-01".to_string()));
        assert_eq!(rows[1]["stock"], Value::from(4));
    }

    #[test]
    fn test_to_json_rows_empty() {
        let df = DataFrame::empty();
        assert!(df.to_json_rows().expect("Failed to serialize").is_empty());
    }
}
