use std::sync::Arc;

use chrono::NaiveDate;
use polars::prelude::{DataType, Field, IDX_DTYPE, PlSmallStr, Schema, SchemaRef};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::data::selection::{HotelName, PartySize};

/// The column vocabulary of an offer snapshot.
///
/// Every variant except [`OfferCol::Review`] and [`OfferCol::ObservationSeq`] is required
/// in the input file.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    PartialOrd,
    Ord,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OfferCol {
    // === Identifiers ===
    /// The hotel the offer belongs to.
    HotelName,
    /// The room the offer was quoted for. Kept as a string regardless of source type.
    RoomId,

    // === Stay ===
    /// The check-in date.
    CheckIn,
    /// The party size, canonicalized to its integer string form (e.g. `"2"`).
    #[serde(rename = "n_person")]
    #[strum(serialize = "n_person")]
    NPerson,

    // === Quote ===
    /// The quoted price.
    Price,
    /// Rooms of this type still available when observed.
    Stock,
    /// The hotel's quality rating.
    Score,
    /// Room category (e.g. `double`, `suite`).
    RoomType,
    /// Cancellation policy (e.g. `free`, `non_refundable`).
    Cancellation,

    // === Optional ===
    /// Number of reviews of the hotel when observed.
    Review,

    // === Internal ===
    /// Monotonic observation index; larger means observed later.
    ObservationSeq,
}

impl From<OfferCol> for PlSmallStr {
    fn from(value: OfferCol) -> Self {
        value.as_str().into()
    }
}

impl OfferCol {
    pub fn name(&self) -> PlSmallStr {
        (*self).into()
    }

    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Self::Review | Self::ObservationSeq)
    }

    /// Columns that must be present in every input dataset.
    pub fn required() -> impl Iterator<Item = OfferCol> {
        Self::iter().filter(OfferCol::is_required)
    }

    /// The dtype a column has after normalization.
    pub fn dtype(&self) -> DataType {
        match self {
            Self::HotelName | Self::RoomId | Self::NPerson | Self::RoomType | Self::Cancellation => {
                DataType::String
            }
            Self::CheckIn => DataType::Date,
            Self::Price | Self::Score | Self::Review => DataType::Float64,
            Self::Stock => DataType::Int64,
            Self::ObservationSeq => IDX_DTYPE,
        }
    }

    /// Canonical schema of a normalized offer book (without the optional review column).
    pub fn to_schema() -> SchemaRef {
        let fields: Vec<Field> = Self::iter()
            .filter(|c| !matches!(c, Self::Review))
            .map(|c| Field::new(c.into(), c.dtype()))
            .collect();
        Arc::new(Schema::from_iter(fields))
    }
}

/// A single typed offer observation, for building books in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub hotel_name: HotelName,
    pub room_id: String,
    pub check_in: NaiveDate,
    pub n_person: PartySize,
    pub price: f64,
    pub stock: i64,
    pub score: f64,
    pub room_type: String,
    pub cancellation: String,
    pub review: Option<f64>,
}
