use std::sync::Arc;

use polars::{
    frame::DataFrame,
    prelude::{Field, IntoLazy, Schema, SchemaRef, SortMultipleOptions, col},
};

use crate::{
    data::{book::OfferBook, offer::OfferCol},
    error::{DataError, RatescopeError},
    report::{
        chart::{Chart, ChartKind, ChartSpec},
        io::{Report, ReportName, ToSchema},
        polars_ext::polars_to_ratescope_error,
    },
};

/// Market-wide review counts, one row per hotel.
///
/// # Columns
/// - `hotel_name`: The hotel.
/// - `review`: Review count at the hotel's last observation carrying one.
///
/// Rows are ordered by ascending review count.
#[derive(Debug, Clone)]
pub struct MarketSummary {
    df: DataFrame,
}

impl Default for MarketSummary {
    fn default() -> Self {
        Self {
            df: DataFrame::empty_with_schema(&Self::to_schema()),
        }
    }
}

impl Report for MarketSummary {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }
}

impl ReportName for MarketSummary {
    fn base_name(&self) -> String {
        "market_summary".to_string()
    }
}

impl ToSchema for MarketSummary {
    fn to_schema() -> SchemaRef {
        let fields = [OfferCol::HotelName, OfferCol::Review]
            .into_iter()
            .map(|c| Field::new(c.name(), c.dtype()));
        Arc::new(Schema::from_iter(fields))
    }
}

impl Chart for MarketSummary {
    fn chart_spec(&self) -> ChartSpec {
        ChartSpec::new(
            ChartKind::HorizontalBar,
            "Hotel Review Counts",
            OfferCol::Review,
            OfferCol::HotelName,
        )
    }
}

impl TryFrom<&OfferBook> for MarketSummary {
    type Error = RatescopeError;

    #[tracing::instrument(skip_all, fields(rows = book.height()))]
    fn try_from(book: &OfferBook) -> Result<Self, Self::Error> {
        let df = book.as_df();
        if df.get_column_index(OfferCol::Review.as_str()).is_none() {
            return Err(DataError::MissingColumns {
                missing: vec![OfferCol::Review.to_string()],
            }
            .into());
        }

        if book.is_empty() {
            return Ok(Self::default());
        }

        let df = df
            .clone()
            .lazy()
            .group_by([col(OfferCol::HotelName)])
            .agg([col(OfferCol::Review)
                .sort_by([col(OfferCol::ObservationSeq)], SortMultipleOptions::default())
                .drop_nulls()
                .last()])
            .sort(
                [OfferCol::Review.as_str(), OfferCol::HotelName.as_str()],
                SortMultipleOptions::default().with_nulls_last(true),
            )
            .select([col(OfferCol::HotelName), col(OfferCol::Review)])
            .collect()
            .map_err(|e| polars_to_ratescope_error("market summary", e))?;

        tracing::debug!(hotels = df.height(), "Built market summary");
        Ok(Self { df })
    }
}
