// 1. Traits
pub use crate::report::chart::Chart;
pub use crate::report::io::{AsFormattedLazyFrame, Report, ReportName, ToCsv, ToJson, ToSchema};

// 2. Inputs
pub use crate::config::{ObservationOrder, PipelineConfig};
pub use crate::data::book::OfferBook;
pub use crate::data::offer::{Offer, OfferCol};
pub use crate::data::selection::{HotelName, PartySize, Selection, SelectionOptions};

// 3. Tables
pub use crate::report::chart::{ChartKind, ChartSpec};
pub use crate::report::comparison::{Comparison, compute_comparison};
pub use crate::report::market_summary::MarketSummary;
pub use crate::report::min_price::MinPriceTable;
pub use crate::report::selected_offers::{ColorBy, SelectedOffers};
pub use crate::report::stock::{StockTable, StockView};

// 4. Errors
pub use crate::error::{ConfigError, DataError, IoError, RatescopeError, RatescopeResult};
