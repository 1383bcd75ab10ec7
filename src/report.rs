pub mod chart;
pub mod comparison;
pub mod io;
pub mod market_summary;
pub mod min_price;
pub(crate) mod polars_ext;
pub mod selected_offers;
pub mod stock;
