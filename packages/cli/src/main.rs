#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! `postcodes`: load the Australian postcode directory into `DuckDB` and
//! query it from the terminal.
//!
//! Logging goes through [`progress::init_logger`], so set `RUST_LOG=debug`
//! to see ranking and fallback decisions.

mod progress;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use postcodes_database::{DuckDbGazetteer, Gazetteer, paths};
use postcodes_gazetteer_models::{NameRecord, State};
use postcodes_matching::{MatchStrategy, rank};
use postcodes_spatial::{ProximityIndex, round_km};
use postcodes_tools::{config_from_env, execute_tool};
use postcodes_tools_models::tool_definitions;

use crate::progress::{IndicatifProgress, init_logger};

#[derive(Parser)]
#[command(name = "postcodes", about = "Australian postcode and locality directory")]
struct Cli {
    /// Gazetteer database path (defaults to `POSTCODES_DB_PATH` or
    /// `data/postcodes.duckdb`)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download (if needed) and load the postcodes CSV, replacing the directory
    Load {
        /// CSV to load instead of `data/postcodes.csv`
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Download the CSV even if it already exists
        #[arg(long)]
        update: bool,
        /// Source URL (defaults to `DATA_URL` or the public dataset)
        #[arg(long)]
        url: Option<String>,
    },
    /// Print directory counts
    Stats,
    /// Rank locality names against a possibly misspelled query
    Match {
        query: String,
        /// Restrict candidates to one state (code or full name)
        #[arg(long)]
        state: Option<String>,
        /// `exact_only`, `fuzzy_only`, `phonetic_only`, or `combined`
        #[arg(long)]
        strategy: Option<MatchStrategy>,
    },
    /// List localities near a postcode or locality
    Nearby {
        /// Postcode or locality name
        center: String,
        /// Search radius in kilometres
        #[arg(long, default_value = "10")]
        radius: f64,
        /// Restrict results to one state (code or full name)
        #[arg(long)]
        state: Option<String>,
    },
    /// Run a tool by name with JSON parameters
    Tool {
        /// Tool name (see `postcodes tools`)
        name: String,
        /// Parameters as a JSON object
        json: Option<String>,
    },
    /// List the available tools
    Tools,
}

fn open_db(path: Option<&Path>) -> Result<DuckDbGazetteer, Box<dyn std::error::Error>> {
    Ok(match path {
        Some(path) => DuckDbGazetteer::open(path)?,
        None => DuckDbGazetteer::open_default()?,
    })
}

fn state_arg(state: Option<&str>) -> Result<Option<State>, Box<dyn std::error::Error>> {
    state
        .map(|s| {
            State::parse(s).ok_or_else(|| {
                Box::<dyn std::error::Error>::from(format!(
                    "Invalid state: {s}. Valid states are: {}",
                    State::valid_codes()
                ))
            })
        })
        .transpose()
}

/// First record for `center` that has coordinates, looked up as a postcode
/// when it is four digits and as a locality name otherwise.
fn center_record(
    db: &dyn Gazetteer,
    center: &str,
    state: Option<State>,
) -> Result<NameRecord, Box<dyn std::error::Error>> {
    let center = center.trim();
    let records = if center.len() == 4 && center.chars().all(|c| c.is_ascii_digit()) {
        db.lookup_postcode(center)?
    } else {
        db.lookup_exact(center, state)?
    };

    records
        .into_iter()
        .filter(|r| state.is_none_or(|s| r.state == s))
        .find(|r| r.coordinates().is_some())
        .ok_or_else(|| format!("No location with coordinates found for '{center}'").into())
}

fn print_stats(db: &dyn Gazetteer) -> Result<(), Box<dyn std::error::Error>> {
    let stats = db.statistics()?;

    println!("Records:   {}", stats.total_records);
    println!("Postcodes: {}", stats.unique_postcodes);
    println!("Suburbs:   {}", stats.unique_suburbs);
    println!("LGAs:      {}", stats.unique_lgas);
    if let Some(loaded_at) = db.loaded_at()? {
        println!("Loaded:    {loaded_at}");
    }
    println!();
    println!("{:<6} {:>10} {:>10}", "STATE", "POSTCODES", "SUBURBS");
    for counts in &stats.by_state {
        println!(
            "{:<6} {:>10} {:>10}",
            counts.state, counts.postcodes, counts.suburbs
        );
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Load { csv, update, url } => {
            let db = open_db(cli.db.as_deref())?;
            let csv = csv.unwrap_or_else(paths::csv_path);
            let url = url.unwrap_or_else(postcodes_ingest::data_url);

            let progress = IndicatifProgress::records(&multi, "Loading postcodes");
            let summary =
                postcodes_ingest::refresh(&db, &url, &csv, update, progress.as_ref()).await?;

            println!(
                "Loaded {} record(s), skipped {} duplicate(s)",
                summary.inserted, summary.duplicates
            );
        }
        Commands::Stats => {
            let db = open_db(cli.db.as_deref())?;
            print_stats(&db)?;
        }
        Commands::Match {
            query,
            state,
            strategy,
        } => {
            let db = open_db(cli.db.as_deref())?;
            let config = config_from_env();
            let state = state_arg(state.as_deref())?;

            let mut options = config.match_options();
            if let Some(strategy) = strategy {
                options = options.with_strategy(strategy);
            }

            let names = db.all_names(state)?;
            let candidates = rank(&query, &names, &options, &config.tables);

            if candidates.is_empty() {
                println!("No matches for '{query}'");
            }
            for candidate in &candidates {
                println!(
                    "{:<30} {:>5.3} {}",
                    candidate.matched_name, candidate.confidence, candidate.match_kind
                );
            }
        }
        Commands::Nearby {
            center,
            radius,
            state,
        } => {
            let db = open_db(cli.db.as_deref())?;
            let state = state_arg(state.as_deref())?;

            let center = center_record(&db, &center, state)?;
            let (lat, lon) = center
                .coordinates()
                .ok_or_else(|| format!("No coordinates for '{}'", center.name))?;

            let index = ProximityIndex::new(db.all_records_with_coordinates(state)?);
            let results = index.search(lat, lon, radius)?;

            println!(
                "{} localities within {radius}km of {} {} {}",
                results.len(),
                center.name,
                center.state,
                center.postcode
            );
            for result in &results {
                let postcodes: Vec<&str> = result.postcodes.iter().map(String::as_str).collect();
                println!(
                    "{:>7.1}km  {:<30} {:<4} {}",
                    round_km(result.distance_km, 1),
                    result.name,
                    result.state,
                    postcodes.join(", ")
                );
            }
        }
        Commands::Tool { name, json } => {
            let db = open_db(cli.db.as_deref())?;
            let config = config_from_env();
            let input = match json {
                Some(json) => serde_json::from_str(&json)?,
                None => serde_json::Value::Null,
            };

            let result = execute_tool(&db, &config, &name, &input)?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Commands::Tools => {
            for definition in tool_definitions() {
                println!(
                    "{:<24} {}",
                    definition["name"].as_str().unwrap_or_default(),
                    definition["description"].as_str().unwrap_or_default()
                );
            }
        }
    }

    Ok(())
}
