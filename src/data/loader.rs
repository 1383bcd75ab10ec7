use std::path::Path;

use polars::{
    frame::DataFrame,
    prelude::{
        Column, DataType, IntoLazy, LazyCsvReader, LazyFileListReader, NULL, PlPath,
        SortMultipleOptions, col, lit,
    },
};
use tracing::debug;

use crate::{
    config::{ObservationOrder, PipelineConfig},
    data::offer::OfferCol,
    error::{DataError, IoError, RatescopeResult},
};

/// Reads a headered CSV snapshot into memory without any validation.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub(crate) fn read_csv(path: &Path) -> RatescopeResult<DataFrame> {
    if !path.is_file() {
        return Err(IoError::ReaderCreation(format!(
            "Dataset file not found: {}",
            path.display()
        ))
        .into());
    }

    let uri = path.to_str().ok_or_else(|| {
        IoError::FileSystem(format!(
            "Path contains invalid UTF-8 characters: {}",
            path.display()
        ))
    })?;

    let df = LazyCsvReader::new(PlPath::new(uri))
        .with_has_header(true)
        .with_try_parse_dates(true)
        .finish()
        .map_err(|e| IoError::ReaderCreation(format!("Failed to scan '{uri}': {e}")))?
        .collect()
        .map_err(|e| DataError::DataFrame(format!("Failed to read '{uri}': {e}")))?;

    debug!(rows = df.height(), cols = df.width(), "Read offer snapshot");
    Ok(df)
}

/// Validates and normalizes a raw offer frame.
///
/// # Steps
/// 1. Rejects frames missing any required column (or the configured ordering column).
/// 2. Strictly coerces every known column to [`OfferCol::dtype`]. Party sizes must be whole
///    numbers in `1..=65535`, so `2`, `2.0` and `"2"` all become `"2"` while `2.5` or `0`
///    fail the load.
/// 3. Trims hotel names and rejects blank ones, so stored names equal their [`HotelName`].
/// 4. Stably sorts by the ordering column, if one is configured.
/// 5. Replaces any existing `observation_seq` with a fresh row index.
///
/// [`HotelName`]: crate::data::selection::HotelName
pub(crate) fn normalize(mut df: DataFrame, cfg: &PipelineConfig) -> RatescopeResult<DataFrame> {
    ensure_columns(&df, cfg)?;

    for c in OfferCol::required() {
        coerce(&mut df, c)?;
    }
    if df.get_column_index(OfferCol::Review.as_str()).is_some() {
        coerce(&mut df, OfferCol::Review)?;
    }
    df = trim_hotel_names(df)?;

    if let ObservationOrder::Column(name) = cfg.observation_order() {
        df = df
            .sort(
                [name.as_str()],
                SortMultipleOptions::default().with_maintain_order(true),
            )
            .map_err(|e| {
                DataError::DataFrame(format!("Failed to order observations by '{name}': {e}"))
            })?;
    }

    if df
        .get_column_index(OfferCol::ObservationSeq.as_str())
        .is_some()
    {
        df = df
            .drop(OfferCol::ObservationSeq.as_str())
            .map_err(|e| DataError::DataFrame(e.to_string()))?;
    }

    df.with_row_index(OfferCol::ObservationSeq.name(), None)
        .map_err(|e| DataError::DataFrame(format!("Failed to sequence observations: {e}")).into())
}

fn ensure_columns(df: &DataFrame, cfg: &PipelineConfig) -> RatescopeResult<()> {
    let mut missing = OfferCol::required()
        .map(|c| c.as_str().to_string())
        .filter(|name| df.get_column_index(name).is_none())
        .collect::<Vec<_>>();

    if let ObservationOrder::Column(name) = cfg.observation_order() {
        if df.get_column_index(name).is_none() {
            missing.push(name.clone());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataError::MissingColumns { missing }.into())
    }
}

fn coerce(df: &mut DataFrame, c: OfferCol) -> RatescopeResult<()> {
    let name = c.as_str();
    let type_err = |msg: String| DataError::ColumnType {
        column: name.to_string(),
        msg,
    };

    let column = df.column(name).map_err(|e| type_err(e.to_string()))?;
    if c != OfferCol::NPerson && column.dtype() == &c.dtype() {
        return Ok(());
    }

    let coerced = match c {
        OfferCol::NPerson => party_size_keys(column),
        _ => column.strict_cast(&c.dtype()).map_err(|e| e.to_string()),
    }
    .map_err(type_err)?;

    df.with_column(coerced)
        .map_err(|e| type_err(e.to_string()))?;
    Ok(())
}

/// Canonical string keys for a party size column. Anything but a whole number in the
/// `PartySize` range is rejected rather than truncated.
fn party_size_keys(column: &Column) -> Result<Column, String> {
    let sizes = column
        .strict_cast(&DataType::Float64)
        .map_err(|e| e.to_string())?;

    let invalid = sizes
        .f64()
        .map_err(|e| e.to_string())?
        .into_iter()
        .flatten()
        .find(|v| v.fract() != 0.0 || *v < 1.0 || *v > f64::from(u16::MAX));
    if let Some(v) = invalid {
        return Err(format!("'{v}' is not a positive whole party size"));
    }

    sizes
        .cast(&DataType::Int64)
        .and_then(|ints| ints.cast(&DataType::String))
        .map_err(|e| e.to_string())
}

fn trim_hotel_names(df: DataFrame) -> RatescopeResult<DataFrame> {
    let name = OfferCol::HotelName.as_str();
    let type_err = |msg: String| DataError::ColumnType {
        column: name.to_string(),
        msg,
    };

    let df = df
        .lazy()
        .with_column(col(name).str().strip_chars(lit(NULL)))
        .collect()
        .map_err(|e| type_err(e.to_string()))?;

    let blank = df
        .column(name)
        .and_then(|c| {
            c.str()
                .map(|ca| ca.into_iter().filter(|v| v.is_none_or(str::is_empty)).count())
        })
        .map_err(|e| type_err(e.to_string()))?;
    if blank > 0 {
        return Err(type_err(format!("{blank} row(s) have a blank hotel name")).into());
    }

    Ok(df)
}

#[cfg(test)]
mod tests {
    use polars::{df, prelude::AnyValue};

    use super::*;
    use crate::error::RatescopeError;

    fn raw_frame() -> DataFrame {
        df![
            "hotel_name" => &["A", "B", "A"],
            "room_id" => &[1_i64, 1, 2],
            "check_in" => &["2024-01-01", "2024-01-01", "2024-01-02"],
            "n_person" => &[2_i64, 2, 3],
            "price" => &[100_i64, 90, 120],
            "stock" => &[5_i64, 3, 1],
            "score" => &[8.0, 9.0, 8.0],
            "room_type" => &["double", "double", "suite"],
            "cancellation" => &["free", "non_refundable", "free"],
        ]
        .expect("Failed to create raw DF")
    }

    #[test]
    fn test_normalize_coerces_schema() {
        let df = normalize(raw_frame(), &PipelineConfig::default()).expect("Failed to normalize");

        for c in OfferCol::required() {
            let dtype = df.column(c.as_str()).expect("Missing column").dtype();
            assert_eq!(dtype, &c.dtype(), "Type mismatch for column '{c}'");
        }

        let party = df
            .column(OfferCol::NPerson.as_str())
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        assert_eq!(party, vec!["2", "2", "3"]);

        let room = df.column(OfferCol::RoomId.as_str()).unwrap().get(2).unwrap();
        assert_eq!(room, AnyValue::String("2"));
    }

    #[test]
    fn test_normalize_sequences_in_load_order() {
        let df = normalize(raw_frame(), &PipelineConfig::default()).expect("Failed to normalize");
        let seq = df
            .column(OfferCol::ObservationSeq.as_str())
            .unwrap()
            .cast(&DataType::UInt64)
            .unwrap()
            .u64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        assert_eq!(seq, vec![0, 1, 2]);
    }

    #[test]
    fn test_normalize_orders_by_configured_column() {
        let mut raw = raw_frame();
        raw.with_column(polars::prelude::Column::new(
            "scraped_at".into(),
            &[3_i64, 1, 2],
        ))
        .expect("Failed to add ordering column");

        let cfg = PipelineConfig::default()
            .with_observation_order(ObservationOrder::Column("scraped_at".to_string()));
        let df = normalize(raw, &cfg).expect("Failed to normalize");

        let hotels = df
            .column(OfferCol::HotelName.as_str())
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        assert_eq!(hotels, vec!["B", "A", "A"]);
    }

    #[test]
    fn test_normalize_rejects_missing_columns() {
        let raw = raw_frame()
            .drop("score")
            .expect("Failed to drop column")
            .drop("stock")
            .expect("Failed to drop column");

        let err = normalize(raw, &PipelineConfig::default()).expect_err("Must reject");
        match err {
            RatescopeError::Data(DataError::MissingColumns { missing }) => {
                assert_eq!(missing, vec!["stock".to_string(), "score".to_string()]);
            }
            other => panic!("Unexpected error: {other}"),
        }
    }

    #[test]
    fn test_normalize_rejects_missing_ordering_column() {
        let cfg = PipelineConfig::default()
            .with_observation_order(ObservationOrder::Column("scraped_at".to_string()));
        let err = normalize(raw_frame(), &cfg).expect_err("Must reject");
        assert!(matches!(
            err,
            RatescopeError::Data(DataError::MissingColumns { .. })
        ));
    }

    #[test]
    fn test_normalize_rejects_non_numeric_party_size() {
        let mut raw = raw_frame();
        raw.with_column(polars::prelude::Column::new(
            "n_person".into(),
            &["2", "two", "3"],
        ))
        .expect("Failed to replace party sizes");

        let err = normalize(raw, &PipelineConfig::default()).expect_err("Must reject");
        match err {
            RatescopeError::Data(DataError::ColumnType { column, .. }) => {
                assert_eq!(column, "n_person");
            }
            other => panic!("Unexpected error: {other}"),
        }
    }

    #[test]
    fn test_normalize_rejects_fractional_and_non_positive_party_sizes() {
        let cases: [(&str, Column); 3] = [
            ("2.5", Column::new("n_person".into(), &[2.0, 2.5, 3.0])),
            ("0", Column::new("n_person".into(), &[2_i64, 0, 3])),
            ("-1", Column::new("n_person".into(), &["2", "-1", "3"])),
        ];

        for (bad, party) in cases {
            let mut raw = raw_frame();
            raw.with_column(party).expect("Failed to replace party sizes");

            let err = normalize(raw, &PipelineConfig::default()).expect_err("Must reject");
            match err {
                RatescopeError::Data(DataError::ColumnType { column, .. }) => {
                    assert_eq!(column, "n_person", "Wrong column for '{bad}'");
                }
                other => panic!("Unexpected error for '{bad}': {other}"),
            }
        }
    }

    #[test]
    fn test_normalize_accepts_whole_float_party_sizes() {
        let mut raw = raw_frame();
        raw.with_column(Column::new("n_person".into(), &[2.0, 2.0, 3.0]))
            .expect("Failed to replace party sizes");

        let df = normalize(raw, &PipelineConfig::default()).expect("Failed to normalize");
        let party = df
            .column(OfferCol::NPerson.as_str())
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        assert_eq!(party, vec!["2", "2", "3"]);
    }

    #[test]
    fn test_normalize_trims_hotel_names() {
        let mut raw = raw_frame();
        raw.with_column(Column::new("hotel_name".into(), &["A ", "  B", "A"]))
            .expect("Failed to replace hotel names");

        let df = normalize(raw, &PipelineConfig::default()).expect("Failed to normalize");
        let hotels = df
            .column(OfferCol::HotelName.as_str())
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        assert_eq!(hotels, vec!["A", "B", "A"]);
    }

    #[test]
    fn test_normalize_rejects_blank_hotel_names() {
        let mut raw = raw_frame();
        raw.with_column(Column::new("hotel_name".into(), &["A", "   ", "A"]))
            .expect("Failed to replace hotel names");

        let err = normalize(raw, &PipelineConfig::default()).expect_err("Must reject");
        assert!(matches!(
            err,
            RatescopeError::Data(DataError::ColumnType { ref column, .. }) if column == "hotel_name"
        ));
    }

    #[test]
    fn test_read_csv_missing_file() {
        let err = read_csv(Path::new("does/not/exist.csv")).expect_err("Must fail");
        assert!(matches!(err, RatescopeError::Io(IoError::ReaderCreation(_))));
    }
}
