use polars::{frame::DataFrame, prelude::SchemaRef};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    data::{offer::OfferCol, selection::HotelName},
    report::{
        chart::{Chart, ChartKind, ChartSpec},
        io::{Report, ReportName, ToSchema},
    },
};

/// Which categorical column the selected hotel's prices are split by.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum ColorBy {
    RoomType,
    Cancellation,
}

impl ColorBy {
    pub fn column(&self) -> OfferCol {
        match self {
            Self::RoomType => OfferCol::RoomType,
            Self::Cancellation => OfferCol::Cancellation,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::RoomType => "Room Type",
            Self::Cancellation => "Cancellation type",
        }
    }
}

/// Every offer of the selected hotel for the selected party size, unaggregated.
///
/// The same rows back both the room type view and the cancellation view; only the coloring
/// column differs.
#[derive(Debug, Clone)]
pub struct SelectedOffers {
    hotel: HotelName,
    color: ColorBy,
    df: DataFrame,
}

impl SelectedOffers {
    pub(crate) fn new(hotel: HotelName, color: ColorBy, df: DataFrame) -> Self {
        Self { hotel, color, df }
    }

    pub(crate) fn empty(hotel: HotelName, color: ColorBy) -> Self {
        Self::new(
            hotel,
            color,
            DataFrame::empty_with_schema(&Self::to_schema()),
        )
    }

    pub fn hotel(&self) -> &HotelName {
        &self.hotel
    }

    pub fn color(&self) -> ColorBy {
        self.color
    }
}

impl Report for SelectedOffers {
    fn as_df(&self) -> &DataFrame {
        &self.df
    }
}

impl ReportName for SelectedOffers {
    fn base_name(&self) -> String {
        format!("selected_by_{}", self.color)
    }
}

impl ToSchema for SelectedOffers {
    /// The normalized offer schema without the internal sequence column.
    fn to_schema() -> SchemaRef {
        let mut schema = (*OfferCol::to_schema()).clone();
        schema.shift_remove(OfferCol::ObservationSeq.as_str());
        schema.into()
    }
}

impl Chart for SelectedOffers {
    fn chart_spec(&self) -> ChartSpec {
        ChartSpec::new(
            ChartKind::Scatter,
            format!("Prices for {} (Colored by {})", self.hotel, self.color.label()),
            OfferCol::CheckIn,
            OfferCol::Price,
        )
        .with_color(self.color.column())
    }
}
