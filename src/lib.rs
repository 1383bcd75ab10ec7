//! Competitor price and availability comparison for hotel pricing snapshots.
//!
//! Load an offer snapshot once into an [`OfferBook`](data::book::OfferBook), then ask it for a
//! [`Comparison`](report::comparison::Comparison) per (hotel, party size) selection:
//!
//! ```no_run
//! use ratescope::prelude::*;
//!
//! # fn main() -> RatescopeResult<()> {
//! let cfg = PipelineConfig::default();
//! let book = OfferBook::read_csv("offers.csv", &cfg)?;
//! let cmp = book.compare(&Selection::parse("Hotel Aurora", "2")?, &cfg)?;
//! println!("{}", cmp.to_json()?);
//! # Ok(())
//! # }
//! ```
pub mod config;
pub mod data;
pub mod error;
pub mod prelude;
pub mod report;

pub use report::comparison::compute_comparison;
