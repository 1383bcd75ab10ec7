use std::{fmt, num::NonZeroU16, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    config::PipelineConfig,
    data::book::OfferBook,
    error::{DataError, RatescopeError, RatescopeResult},
};

// ================================================================================================
// Hotel Name
// ================================================================================================

/// A hotel identifier as it appears in the `hotel_name` column.
///
/// Surrounding whitespace is trimmed; blank names are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HotelName(String);

impl HotelName {
    pub fn new(name: impl AsRef<str>) -> RatescopeResult<Self> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DataError::InvalidHotelName(name.as_ref().to_string()).into());
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HotelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for HotelName {
    type Err = RatescopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for HotelName {
    type Error = RatescopeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<HotelName> for String {
    fn from(value: HotelName) -> Self {
        value.0
    }
}

// ================================================================================================
// Party Size
// ================================================================================================

/// Number of guests an offer was quoted for.
///
/// The dataset stores party sizes as strings; this type is the validated bridge between
/// user input (`2`, `"2"`, `" 2 "`) and the canonical string form used for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct PartySize(NonZeroU16);

impl PartySize {
    pub fn new(n: u16) -> RatescopeResult<Self> {
        NonZeroU16::new(n)
            .map(Self)
            .ok_or_else(|| DataError::InvalidPartySize(n.to_string()).into())
    }

    pub fn get(&self) -> u16 {
        self.0.get()
    }

    /// The canonical string the dataset's `n_person` column is compared against.
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl Default for PartySize {
    fn default() -> Self {
        Self(NonZeroU16::MIN.saturating_add(1))
    }
}

impl fmt::Display for PartySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PartySize {
    type Err = RatescopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<NonZeroU16>()
            .map(Self)
            .map_err(|_| DataError::InvalidPartySize(s.to_string()).into())
    }
}

impl TryFrom<u16> for PartySize {
    type Error = RatescopeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<i64> for PartySize {
    type Error = RatescopeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .map_err(|_| RatescopeError::from(DataError::InvalidPartySize(value.to_string())))
            .and_then(Self::new)
    }
}

impl From<PartySize> for u16 {
    fn from(value: PartySize) -> Self {
        value.get()
    }
}

// ================================================================================================
// Selection
// ================================================================================================

/// The pair of user choices a comparison is computed for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub hotel: HotelName,
    pub party_size: PartySize,
}

impl Selection {
    pub fn new(hotel: HotelName, party_size: PartySize) -> Self {
        Self { hotel, party_size }
    }

    /// Parses both parts from raw user input.
    pub fn parse(hotel: &str, party_size: &str) -> RatescopeResult<Self> {
        Ok(Self {
            hotel: hotel.parse()?,
            party_size: party_size.parse()?,
        })
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (party of {})", self.hotel, self.party_size)
    }
}

/// The values a dashboard would offer in its selection controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionOptions {
    /// Distinct hotels, in order of first appearance.
    pub hotels: Vec<HotelName>,
    /// Distinct party sizes, in order of first appearance.
    pub party_sizes: Vec<PartySize>,
    /// First hotel with the configured default party size; `None` for an empty book.
    pub default: Option<Selection>,
}

impl SelectionOptions {
    pub fn from_book(book: &OfferBook, cfg: &PipelineConfig) -> RatescopeResult<Self> {
        let hotels = book.hotels()?;
        let party_sizes = book.party_sizes()?;
        let default = hotels
            .first()
            .cloned()
            .map(|hotel| Selection::new(hotel, cfg.default_party_size()));

        Ok(Self {
            hotels,
            party_sizes,
            default,
        })
    }
}
