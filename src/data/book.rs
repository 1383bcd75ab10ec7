use std::path::Path;

use polars::{
    frame::DataFrame,
    prelude::{Column, DataType, IntoLazy, col},
};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::info;

use crate::{
    config::PipelineConfig,
    data::{
        loader::{normalize, read_csv},
        offer::{Offer, OfferCol},
        selection::{HotelName, PartySize, Selection, SelectionOptions},
    },
    error::{DataError, RatescopeResult},
    report::{comparison::Comparison, market_summary::MarketSummary},
};

/// The loaded, validated and immutable offer snapshot every comparison reads from.
///
/// Cloning is cheap: the underlying columns are reference counted, so a book can be
/// loaded once at startup and shared between threads.
#[derive(Debug, Clone)]
pub struct OfferBook {
    df: DataFrame,
}

impl OfferBook {
    /// Loads and validates a CSV snapshot.
    ///
    /// # Errors
    /// - [`DataError::MissingColumns`] if a required column is absent.
    /// - [`DataError::ColumnType`] if a column cannot be coerced to its canonical type.
    #[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn read_csv(path: impl AsRef<Path>, cfg: &PipelineConfig) -> RatescopeResult<Self> {
        let book = Self::from_frame(read_csv(path.as_ref())?, cfg)?;
        info!(offers = book.height(), "Loaded offer book");
        Ok(book)
    }

    /// Validates and normalizes an in-memory frame.
    pub fn from_frame(df: DataFrame, cfg: &PipelineConfig) -> RatescopeResult<Self> {
        cfg.validate()?;
        Ok(Self {
            df: normalize(df, cfg)?,
        })
    }

    /// Builds a book from typed rows, in observation order.
    pub fn from_offers(offers: &[Offer], cfg: &PipelineConfig) -> RatescopeResult<Self> {
        let mut columns = vec![
            Column::new(
                OfferCol::HotelName.name(),
                offers
                    .iter()
                    .map(|o| o.hotel_name.as_str())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                OfferCol::RoomId.name(),
                offers.iter().map(|o| o.room_id.as_str()).collect::<Vec<_>>(),
            ),
            Column::new(
                OfferCol::CheckIn.name(),
                offers
                    .iter()
                    .map(|o| o.check_in.format("%Y-%m-%d").to_string())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                OfferCol::NPerson.name(),
                offers
                    .iter()
                    .map(|o| i64::from(o.n_person.get()))
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                OfferCol::Price.name(),
                offers.iter().map(|o| o.price).collect::<Vec<_>>(),
            ),
            Column::new(
                OfferCol::Stock.name(),
                offers.iter().map(|o| o.stock).collect::<Vec<_>>(),
            ),
            Column::new(
                OfferCol::Score.name(),
                offers.iter().map(|o| o.score).collect::<Vec<_>>(),
            ),
            Column::new(
                OfferCol::RoomType.name(),
                offers
                    .iter()
                    .map(|o| o.room_type.as_str())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                OfferCol::Cancellation.name(),
                offers
                    .iter()
                    .map(|o| o.cancellation.as_str())
                    .collect::<Vec<_>>(),
            ),
        ];

        if offers.iter().any(|o| o.review.is_some()) {
            columns.push(Column::new(
                OfferCol::Review.name(),
                offers.iter().map(|o| o.review).collect::<Vec<_>>(),
            ));
        }

        let df = DataFrame::new(columns)
            .map_err(|e| DataError::DataFrame(format!("Failed to assemble offers: {e}")))?;
        Self::from_frame(df, cfg)
    }

    pub fn as_df(&self) -> &DataFrame {
        &self.df
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Distinct hotels in order of first appearance.
    pub fn hotels(&self) -> RatescopeResult<Vec<HotelName>> {
        self.distinct_strings(OfferCol::HotelName)?
            .iter()
            .map(HotelName::new)
            .collect()
    }

    /// Distinct party sizes in order of first appearance.
    pub fn party_sizes(&self) -> RatescopeResult<Vec<PartySize>> {
        self.distinct_strings(OfferCol::NPerson)?
            .iter()
            .map(|s| s.parse())
            .collect()
    }

    pub fn selection_options(&self, cfg: &PipelineConfig) -> RatescopeResult<SelectionOptions> {
        SelectionOptions::from_book(self, cfg)
    }

    pub fn compare(
        &self,
        selection: &Selection,
        cfg: &PipelineConfig,
    ) -> RatescopeResult<Comparison> {
        crate::report::comparison::compute_comparison(self, selection, cfg)
    }

    /// Evaluates many selections in parallel against this book.
    ///
    /// Results are returned in the order of `selections`.
    pub fn compare_batch(
        &self,
        selections: &[Selection],
        cfg: &PipelineConfig,
    ) -> Vec<RatescopeResult<Comparison>> {
        selections
            .par_iter()
            .map(|selection| self.compare(selection, cfg))
            .collect()
    }

    pub fn market_summary(&self) -> RatescopeResult<MarketSummary> {
        self.try_into()
    }

    fn distinct_strings(&self, c: OfferCol) -> RatescopeResult<Vec<String>> {
        let df = self
            .df
            .clone()
            .lazy()
            .select([col(c).unique_stable().cast(DataType::String)])
            .collect()
            .map_err(|e| DataError::DataFrame(format!("Failed to collect distinct '{c}': {e}")))?;

        let values = df
            .column(c.as_str())
            .and_then(|s| s.str().cloned())
            .map_err(|e| DataError::DataFrame(e.to_string()))?
            .into_iter()
            .flatten()
            .map(str::to_string)
            .collect();
        Ok(values)
    }
}
