use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use polars::{
    frame::DataFrame,
    prelude::{IntoLazy, JoinArgs, JoinType, LazyFrame, SortMultipleOptions, col, lit},
};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    config::PipelineConfig,
    data::{book::OfferBook, offer::OfferCol, selection::Selection},
    error::{IoError, RatescopeResult},
    report::{
        chart::Chart,
        io::{FileExtension, Report, ReportName, ToCsv, ToJson},
        min_price::{MinPriceTable, min_price_lf},
        polars_ext::{ExprExt, polars_to_ratescope_error},
        selected_offers::{ColorBy, SelectedOffers},
        stock::{StockTable, StockView, latest_stock_lf},
    },
};

const CHEAPEST_PRICE: &str = "cheapest_price";

/// Everything the dashboard shows for one (hotel, party size) selection.
#[derive(Debug, Clone)]
pub struct Comparison {
    selection: Selection,
    hotel_score: Option<f64>,
    min_price: MinPriceTable,
    latest_stock: StockTable,
    competitive_stock: StockTable,
    by_room_type: SelectedOffers,
    by_cancellation: SelectedOffers,
}

impl Comparison {
    fn empty(selection: &Selection) -> Self {
        Self {
            selection: selection.clone(),
            hotel_score: None,
            min_price: MinPriceTable::default(),
            latest_stock: StockTable::empty(StockView::Latest),
            competitive_stock: StockTable::empty(StockView::Competitive),
            by_room_type: SelectedOffers::empty(selection.hotel.clone(), ColorBy::RoomType),
            by_cancellation: SelectedOffers::empty(selection.hotel.clone(), ColorBy::Cancellation),
        }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Score of the selected hotel's most recent observation.
    pub fn hotel_score(&self) -> Option<f64> {
        self.hotel_score
    }

    pub fn min_price(&self) -> &MinPriceTable {
        &self.min_price
    }

    pub fn latest_stock(&self) -> &StockTable {
        &self.latest_stock
    }

    pub fn competitive_stock(&self) -> &StockTable {
        &self.competitive_stock
    }

    pub fn by_room_type(&self) -> &SelectedOffers {
        &self.by_room_type
    }

    pub fn by_cancellation(&self) -> &SelectedOffers {
        &self.by_cancellation
    }

    /// `true` when the selected hotel has no offers for the selected party size.
    pub fn is_empty_selection(&self) -> bool {
        self.by_room_type.as_df().height() == 0
    }

    /// All tables as one JSON object keyed by table name.
    ///
    /// Every entry has the shape `{ "chart": ChartSpec, "rows": [...] }`.
    pub fn to_json(&self) -> RatescopeResult<Value> {
        let mut out = Map::new();
        for (name, entry) in [
            chart_entry(&self.min_price)?,
            chart_entry(&self.latest_stock)?,
            chart_entry(&self.competitive_stock)?,
            chart_entry(&self.by_room_type)?,
            chart_entry(&self.by_cancellation)?,
        ] {
            out.insert(name, entry);
        }
        Ok(Value::Object(out))
    }

    /// Writes `<dir>/comparison.json` and returns its path.
    pub fn write_json(&self, dir: impl AsRef<Path>) -> RatescopeResult<PathBuf> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| {
            IoError::FileSystem(format!(
                "Failed to create directory {}: {}",
                dir.display(),
                e
            ))
        })?;

        let path = dir.join(self.filename(FileExtension::Json));
        let file = File::create(&path).map_err(IoError::Io)?;
        serde_json::to_writer_pretty(BufWriter::new(file), &self.to_json()?)
            .map_err(IoError::Json)?;
        Ok(path)
    }

    /// Writes one CSV per table into `dir`.
    pub fn to_csv(&self, dir: impl AsRef<Path>) -> RatescopeResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        Ok(vec![
            self.min_price.to_csv(dir)?,
            self.latest_stock.to_csv(dir)?,
            self.competitive_stock.to_csv(dir)?,
            self.by_room_type.to_csv(dir)?,
            self.by_cancellation.to_csv(dir)?,
        ])
    }
}

impl ReportName for Comparison {
    fn base_name(&self) -> String {
        "comparison".to_string()
    }
}

fn chart_entry<T>(table: &T) -> RatescopeResult<(String, Value)>
where
    T: Report + ReportName + Chart,
{
    let chart = serde_json::to_value(table.chart_spec()).map_err(IoError::Json)?;
    let mut entry = Map::new();
    entry.insert("chart".to_string(), chart);
    entry.insert("rows".to_string(), table.to_json()?);
    Ok((table.base_name(), Value::Object(entry)))
}

/// Builds every table of the dashboard for one selection.
///
/// Party sizes are matched on their canonical string form, so a selection of `2` matches
/// offers loaded as `"2"`, `2` or `2.0`. An unknown hotel or a party size the hotel does
/// not offer yields an empty comparison rather than an error.
#[tracing::instrument(skip_all, fields(hotel = %selection.hotel, party_size = %selection.party_size))]
pub fn compute_comparison(
    book: &OfferBook,
    selection: &Selection,
    cfg: &PipelineConfig,
) -> RatescopeResult<Comparison> {
    let hotel = selection.hotel.as_str();
    let to_err = |e| polars_to_ratescope_error("comparison", e);

    let party = book
        .as_df()
        .clone()
        .lazy()
        .filter(col(OfferCol::NPerson).eq(lit(selection.party_size.as_key())));

    let selected = party
        .clone()
        .filter(col(OfferCol::HotelName).eq(lit(hotel)))
        .collect()
        .map_err(to_err)?;

    if selected.height() == 0 {
        warn!("No offers for selected hotel and party size");
        return Ok(Comparison::empty(selection));
    }

    let min_price = min_price_lf(party.clone())
        .with_column(col(OfferCol::HotelName).relabel_others(hotel, cfg.other_label()))
        .collect()
        .map_err(to_err)?;

    let latest_stock = latest_stock_lf(party.clone())
        .with_column(col(OfferCol::HotelName).relabel_others(hotel, cfg.other_label()))
        .collect()
        .map_err(to_err)?;

    let hotel_score = last_score(&selected)?;
    let competitive_stock = match hotel_score {
        Some(score) => {
            let lf = competitive_stock_lf(party, selected.clone().lazy(), hotel, score);
            let lf = if cfg.relabel_competitive() {
                lf.with_column(col(OfferCol::HotelName).relabel_others(hotel, cfg.other_label()))
            } else {
                lf
            };
            StockTable::new(StockView::Competitive, lf.collect().map_err(to_err)?)
        }
        None => StockTable::empty(StockView::Competitive),
    };

    let offers = selected
        .drop(OfferCol::ObservationSeq.as_str())
        .map_err(to_err)?;

    debug!(
        selected_offers = offers.height(),
        min_price_rows = min_price.height(),
        latest_stock_rows = latest_stock.height(),
        competitive_rows = competitive_stock.as_df().height(),
        "Computed comparison"
    );

    Ok(Comparison {
        selection: selection.clone(),
        hotel_score,
        min_price: MinPriceTable::new(min_price),
        latest_stock: StockTable::new(StockView::Latest, latest_stock),
        competitive_stock,
        by_room_type: SelectedOffers::new(
            selection.hotel.clone(),
            ColorBy::RoomType,
            offers.clone(),
        ),
        by_cancellation: SelectedOffers::new(selection.hotel.clone(), ColorBy::Cancellation, offers),
    })
}

/// Score of the most recent observation that carries one.
fn last_score(selected: &DataFrame) -> RatescopeResult<Option<f64>> {
    let to_err = |e| polars_to_ratescope_error("hotel score", e);
    let df = selected
        .clone()
        .lazy()
        .select([col(OfferCol::Score)
            .sort_by([col(OfferCol::ObservationSeq)], SortMultipleOptions::default())
            .drop_nulls()
            .last()])
        .collect()
        .map_err(to_err)?;

    let score = df
        .column(OfferCol::Score.as_str())
        .and_then(|c| c.f64().map(|ca| ca.get(0)))
        .map_err(to_err)?;
    Ok(score)
}

/// Competitor stock that is cheaper-or-equal and rated equal-or-higher, per check-in date.
///
/// Each party offer is joined to the selected hotel's cheapest price on the same date, so a
/// date on which the selected hotel has no offers, or no competitor qualifies, yields no rows.
fn competitive_stock_lf(
    party: LazyFrame,
    selected: LazyFrame,
    hotel: &str,
    hotel_score: f64,
) -> LazyFrame {
    let cheapest = selected
        .group_by([col(OfferCol::CheckIn)])
        .agg([col(OfferCol::Price).min().alias(CHEAPEST_PRICE)]);

    let beating = party
        .join(
            cheapest,
            [col(OfferCol::CheckIn)],
            [col(OfferCol::CheckIn)],
            JoinArgs::new(JoinType::Inner),
        )
        .filter(
            col(OfferCol::Price)
                .lt_eq(col(CHEAPEST_PRICE))
                .and(col(OfferCol::Score).gt_eq(lit(hotel_score)))
                .and(col(OfferCol::HotelName).neq(lit(hotel))),
        );

    latest_stock_lf(beating)
}
