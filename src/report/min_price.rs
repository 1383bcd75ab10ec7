use std::sync::Arc;

use polars::{
    frame::DataFrame,
    prelude::{Field, LazyFrame, Schema, SchemaRef, SortMultipleOptions, col},
};

use crate::{
    data::offer::OfferCol,
    report::{
        chart::{Chart, ChartKind, ChartSpec},
        io::{Report, ReportName, ToSchema},
    },
};

/// Cheapest quoted price per (hotel, check-in).
///
/// # Columns
/// - `check_in`: The check-in date.
/// - `price`: Minimum price over every observation of that hotel on that date.
/// - `hotel_name`: The hotel, or the shared label for non-selected hotels.
#[derive(Debug, Clone)]
pub struct MinPriceTable {
    df: DataFrame,
}

impl MinPriceTable {
    pub(crate) fn new(df: DataFrame) -> Self {
        Self { df }
    }
}

impl Default for MinPriceTable {
    fn default() -> Self {
        Self {
            df: DataFrame::empty_with_schema(&Self::to_schema()),
        }
    }
}

impl Report for MinPriceTable {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }
}

impl ReportName for MinPriceTable {
    fn base_name(&self) -> String {
        "min_price".to_string()
    }
}

impl ToSchema for MinPriceTable {
    fn to_schema() -> SchemaRef {
        let fields = [OfferCol::CheckIn, OfferCol::Price, OfferCol::HotelName]
            .into_iter()
            .map(|c| Field::new(c.name(), c.dtype()));
        Arc::new(Schema::from_iter(fields))
    }
}

impl Chart for MinPriceTable {
    fn chart_spec(&self) -> ChartSpec {
        ChartSpec::new(
            ChartKind::Scatter,
            "Prices for all hotels vs selected hotel",
            OfferCol::CheckIn,
            OfferCol::Price,
        )
        .with_color(OfferCol::HotelName)
    }
}

pub(crate) fn min_price_lf(offers: LazyFrame) -> LazyFrame {
    offers
        .group_by([col(OfferCol::HotelName), col(OfferCol::CheckIn)])
        .agg([col(OfferCol::Price).min()])
        .sort(
            [OfferCol::CheckIn.as_str(), OfferCol::HotelName.as_str()],
            SortMultipleOptions::default(),
        )
        .select([
            col(OfferCol::CheckIn),
            col(OfferCol::Price),
            col(OfferCol::HotelName),
        ])
}

#[cfg(test)]
mod tests {
    use polars::{
        df,
        prelude::{DataType, IntoLazy},
    };

    use super::*;

    #[test]
    fn test_min_price_per_hotel_and_date() {
        let df = df![
            "hotel_name" => &["A", "A", "B", "B", "A"],
            "check_in" => &["2024-01-01", "2024-01-01", "2024-01-01", "2024-01-01", "2024-01-02"],
            "price" => &[120.0, 100.0, 95.0, 90.0, 80.0],
        ]
        .expect("Failed to create DF")
        .lazy()
        .with_column(col("check_in").cast(DataType::Date));

        let out = min_price_lf(df).collect().expect("Failed to aggregate");

        let prices = out
            .column("price")
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .flatten()
            .collect::<Vec<_>>();
        assert_eq!(prices, vec![100.0, 90.0, 80.0]);
        assert_eq!(
            out.get_column_names_str(),
            vec!["check_in", "price", "hotel_name"]
        );
    }

    #[test]
    fn test_default_is_empty_with_schema() {
        let table = MinPriceTable::default();
        assert_eq!(table.as_df().height(), 0);
        assert_eq!(table.as_df().schema(), &MinPriceTable::to_schema());
        assert_eq!(table.filename(crate::report::io::FileExtension::Json), "min_price.json");
    }
}
