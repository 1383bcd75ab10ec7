#![allow(dead_code)]

use std::path::PathBuf;

use polars::frame::DataFrame;
use ratescope::prelude::*;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn load_offers(cfg: &PipelineConfig) -> OfferBook {
    OfferBook::read_csv(fixture("offers.csv"), cfg).expect("Failed to load offers fixture")
}

pub fn scraped_order() -> PipelineConfig {
    PipelineConfig::default()
        .with_observation_order(ObservationOrder::Column("scraped_at".to_string()))
}

pub fn selection(hotel: &str, party_size: &str) -> Selection {
    Selection::parse(hotel, party_size).expect("Failed to parse selection")
}

pub fn strings(df: &DataFrame, column: &str) -> Vec<String> {
    df.column(column)
        .expect("Missing column")
        .cast(&polars::prelude::DataType::String)
        .expect("Failed to cast column to string")
        .str()
        .expect("Column is not a string column")
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect()
}

pub fn floats(df: &DataFrame, column: &str) -> Vec<f64> {
    df.column(column)
        .expect("Missing column")
        .f64()
        .expect("Column is not a float column")
        .into_iter()
        .flatten()
        .collect()
}

pub fn ints(df: &DataFrame, column: &str) -> Vec<i64> {
    df.column(column)
        .expect("Missing column")
        .i64()
        .expect("Column is not an integer column")
        .into_iter()
        .flatten()
        .collect()
}
