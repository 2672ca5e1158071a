//! Geofilter CLI
//!
//! Command-line tooling around filter generation:
//! - Print the covering filters for a rectangle
//! - Show the precision selected for an extent
//! - Test a filter against topics
//! - Parse a flight position topic
//! - Generate a default config file

use anyhow::Context;
use clap::{Parser, Subcommand};
use geofilter::feed::FlightPositionEvent;
use geofilter::filter::{select_precision, AxisPrecision, GridGenerator, TopicLayout};
use geofilter::geometry::Rectangle;
use geofilter::matcher::WildcardTranslator;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "geofilter-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect geofilter topic filters")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the topic filters covering a rectangle
    Filters {
        #[arg(long, allow_negative_numbers = true)]
        min_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        max_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        min_lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        max_lon: f64,
        /// Topic root level
        #[arg(long, default_value = "FDPS")]
        root: String,
        /// Topic feed level
        #[arg(long, default_value = "position")]
        feed: String,
    },

    /// Show the wildcard precision chosen for an extent in degrees
    Precision {
        extent: f64,
    },

    /// Test a topic filter against one or more topics
    Match {
        filter: String,
        topics: Vec<String>,
    },

    /// Parse a flight position topic
    Parse {
        topic: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct FiltersOutput {
    latitude_precision: AxisPrecision,
    longitude_precision: AxisPrecision,
    columns: usize,
    rows: usize,
    filters: Vec<String>,
}

#[derive(Serialize)]
struct MatchOutput<'a> {
    topic: &'a str,
    matched: bool,
}

#[derive(Serialize)]
struct ParseOutput {
    #[serde(flatten)]
    event: FlightPositionEvent,
    heading: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let json = cli.format.eq_ignore_ascii_case("json");

    match cli.command {
        Commands::Filters {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            root,
            feed,
        } => {
            let rectangle = Rectangle::from_bounds(min_lat, max_lat, min_lon, max_lon)
                .context("Invalid rectangle")?;
            let generator = GridGenerator::new(TopicLayout::new(root, feed));
            let precisions = generator.precisions(&rectangle);
            let grid = generator.grid(&rectangle, precisions);
            let filters = generator.generate_with_precision(&rectangle, precisions);

            if json {
                let output = FiltersOutput {
                    latitude_precision: precisions.latitude,
                    longitude_precision: precisions.longitude,
                    columns: grid.columns.len(),
                    rows: grid.rows.len(),
                    filters: filters.into_iter().map(|f| f.into_string()).collect(),
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                eprintln!(
                    "precision lat={} lon={} ({} x {})",
                    precisions.latitude,
                    precisions.longitude,
                    grid.columns.len(),
                    grid.rows.len()
                );
                for filter in filters {
                    println!("{}", filter);
                }
            }
        }

        Commands::Precision { extent } => {
            let precision = select_precision(extent);
            if json {
                println!("{}", serde_json::json!({ "extent": extent, "precision": precision }));
            } else {
                println!("{}", precision);
            }
        }

        Commands::Match { filter, topics } => {
            let matcher = WildcardTranslator::compile(&filter)
                .with_context(|| format!("Invalid filter '{}'", filter))?;
            let results: Vec<MatchOutput> = topics
                .iter()
                .map(|topic| MatchOutput {
                    topic,
                    matched: matcher.is_match(topic),
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                for result in &results {
                    let verdict = if result.matched { "match" } else { "no match" };
                    println!("{:<8}  {}", verdict, result.topic);
                }
            }
        }

        Commands::Parse { topic } => {
            let event = FlightPositionEvent::parse(&topic).context("Not a flight position topic")?;
            let heading = event.heading();
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&ParseOutput { event, heading })?
                );
            } else {
                println!("Aircraft:  {}", event.aircraft_id);
                println!("Status:    {}", event.status);
                println!("Position:  {}, {}", event.latitude, event.longitude);
                println!("Speed:     {}", event.speed);
                println!("Altitude:  {}", event.altitude);
                match heading {
                    Some(h) => println!("Heading:   {:.1}°", h),
                    None => println!("Heading:   -"),
                }
            }
        }

        Commands::Config { output } => {
            let config = geofilter::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}
