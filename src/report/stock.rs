use std::sync::Arc;

use polars::{
    frame::DataFrame,
    prelude::{Field, LazyFrame, Schema, SchemaRef, SortMultipleOptions, col},
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    data::offer::OfferCol,
    report::{
        chart::{Chart, ChartKind, ChartSpec},
        io::{Report, ReportName, ToSchema},
    },
};

/// Which availability question a [`StockTable`] answers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum StockView {
    /// Everything still on sale per hotel and check-in date.
    Latest,
    /// Competitor stock that is at least as cheap and at least as well rated.
    Competitive,
}

/// Summed room availability per (hotel, check-in).
///
/// # Columns
/// - `hotel_name`: The hotel, or the shared label for non-selected hotels.
/// - `check_in`: The check-in date.
/// - `stock`: Sum over rooms of each room's last observed stock.
#[derive(Debug, Clone)]
pub struct StockTable {
    view: StockView,
    df: DataFrame,
}

impl StockTable {
    pub(crate) fn new(view: StockView, df: DataFrame) -> Self {
        Self { view, df }
    }

    pub(crate) fn empty(view: StockView) -> Self {
        Self {
            view,
            df: DataFrame::empty_with_schema(&Self::to_schema()),
        }
    }

    pub fn view(&self) -> StockView {
        self.view
    }
}

impl Report for StockTable {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }
}

impl ReportName for StockTable {
    fn base_name(&self) -> String {
        format!("{}_stock", self.view)
    }
}

impl ToSchema for StockTable {
    fn to_schema() -> SchemaRef {
        let fields = [OfferCol::HotelName, OfferCol::CheckIn, OfferCol::Stock]
            .into_iter()
            .map(|c| Field::new(c.name(), c.dtype()));
        Arc::new(Schema::from_iter(fields))
    }
}

impl Chart for StockTable {
    fn chart_spec(&self) -> ChartSpec {
        let title = match self.view {
            StockView::Latest => "Stock for all hotels vs selected hotel",
            StockView::Competitive => "Stock to beat for all hotels vs selected hotel",
        };
        ChartSpec::new(ChartKind::Bar, title, OfferCol::CheckIn, OfferCol::Stock)
            .with_color(OfferCol::HotelName)
    }
}

/// Sums the last observed stock of every room per (hotel, check-in).
///
/// "Last" is decided by `observation_seq`; null stock observations are skipped. The output
/// is ordered by check-in, then hotel.
pub(crate) fn latest_stock_lf(offers: LazyFrame) -> LazyFrame {
    offers
        .group_by([
            col(OfferCol::HotelName),
            col(OfferCol::RoomId),
            col(OfferCol::CheckIn),
        ])
        .agg([col(OfferCol::Stock)
            .sort_by([col(OfferCol::ObservationSeq)], SortMultipleOptions::default())
            .drop_nulls()
            .last()])
        .group_by([col(OfferCol::HotelName), col(OfferCol::CheckIn)])
        .agg([col(OfferCol::Stock).sum()])
        .sort(
            [OfferCol::CheckIn.as_str(), OfferCol::HotelName.as_str()],
            SortMultipleOptions::default(),
        )
        .select([
            col(OfferCol::HotelName),
            col(OfferCol::CheckIn),
            col(OfferCol::Stock),
        ])
}
