use std::{env, path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use ratescope::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Usage: `cargo run --example dashboard -- [offers.csv] [hotel] [party_size] [out_dir]`
fn main() -> Result<()> {
    init_tracing();

    let mut args = env::args().skip(1);
    let dataset = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/fixtures/offers.csv"));

    let cfg = PipelineConfig::default();
    let load_start = Instant::now();
    let book = OfferBook::read_csv(&dataset, &cfg)
        .with_context(|| format!("Failed to load {}", dataset.display()))?;
    let load_time = load_start.elapsed();

    let options = book.selection_options(&cfg)?;
    let selection = match (args.next(), args.next()) {
        (Some(hotel), Some(party)) => Selection::parse(&hotel, &party)?,
        (Some(hotel), None) => Selection::new(hotel.parse()?, cfg.default_party_size()),
        _ => options
            .default
            .clone()
            .context("Dataset contains no offers")?,
    };
    info!(%selection, hotels = options.hotels.len(), "Selected");

    let compare_start = Instant::now();
    let cmp = book.compare(&selection, &cfg)?;
    let compare_time = compare_start.elapsed();

    if cmp.is_empty_selection() {
        println!("No offers for {selection}");
    }

    match args.next().map(PathBuf::from) {
        Some(out_dir) => {
            for path in cmp.to_csv(&out_dir)? {
                println!("Wrote {}", path.display());
            }
            println!("Wrote {}", cmp.write_json(&out_dir)?.display());
            if let Ok(summary) = book.market_summary() {
                println!("Wrote {}", summary.to_csv(&out_dir)?.display());
            }
        }
        None => println!("{}", serde_json::to_string_pretty(&cmp.to_json()?)?),
    }

    println!("\n--- Timings ---");
    println!("1. Load time:       {load_time:?}");
    println!("2. Comparison time: {compare_time:?}");

    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_current_span(true)
        .with_thread_names(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}
