//! Geofilter runtime
//!
//! Runs the subscription synchronizer against a loopback broker session fed
//! from stdin. Each input line is either a topic to publish, or
//! `regions <json>` with a JSON array of drawn shapes to replace the
//! current regions.
//!
//! ```text
//! FDPS/position/ID/ACTIVE/UAL1/35.5/-99.5/420/31000/10/20
//! regions [{"shape":"Rectangle","ring":[[-100,35],[-99,35],[-99,36],[-100,36]]}]
//! ```
//!
//! A session summary is printed as JSON at end of input.

use anyhow::Context;
use clap::Parser;
use geofilter::config::Config;
use geofilter::feed::FeedSession;
use geofilter::filter::GridGenerator;
use geofilter::geometry::DrawnShape;
use geofilter::logging::init_logging;
use geofilter::messaging::{LoopbackClient, MessageHandler, MessagingClient};
use geofilter::sync::SubscriptionSynchronizer;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "geofilter")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Geofiltered flight position feed over stdin")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

const REGIONS_PREFIX: &str = "regions ";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_logging(&config.logging)?;
    tracing::info!("Geofilter v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        broker = %config.broker.url,
        vpn = %config.broker.vpn_name,
        username = %config.broker.username,
        regions = config.regions.len(),
        "Configuration loaded"
    );

    let session = Arc::new(FeedSession::new());
    let recorder = Arc::clone(&session);
    let handler: MessageHandler = Arc::new(move |topic: &str, _payload: &[u8]| {
        match recorder.handle_topic(topic) {
            Ok(event) => tracing::info!(
                aircraft = %event.aircraft_id,
                lat = event.latitude,
                lon = event.longitude,
                heading = ?event.heading(),
                altitude = %event.altitude,
                "Flight position"
            ),
            Err(e) => tracing::warn!(topic = %topic, error = %e, "Rejected flight position"),
        }
    });

    let clearer = Arc::clone(&session);
    let sync = Arc::new(
        SubscriptionSynchronizer::new(
            config.sync.options(),
            GridGenerator::new(config.topic.layout()),
            handler,
        )
        .with_regions(config.region_shapes())
        .with_commit_hook(Arc::new(move |_regions: &[DrawnShape]| clearer.clear_aircraft())),
    );
    let debounce = sync.clone().start_background_debounce();

    let client = Arc::new(LoopbackClient::new());
    client.connect().await?;
    sync.attach(client.clone()).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                None
            }
        };
        let Some(line) = line else { break };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(json) = line.strip_prefix(REGIONS_PREFIX) {
            match serde_json::from_str::<Vec<DrawnShape>>(json) {
                Ok(regions) => sync.on_regions_changed(regions),
                Err(e) => tracing::warn!(error = %e, "Ignoring malformed regions line"),
            }
            continue;
        }

        client.publish(line, &[]).await?;
    }

    tracing::info!("Shutting down...");
    sync.flush().await;
    sync.shutdown();
    debounce.await?;

    let summary = session.summary();
    tracing::info!(
        received = summary.messages_received,
        rejected = summary.messages_rejected,
        aircraft = summary.aircraft_tracked,
        rounds = sync.rounds(),
        "Session complete"
    );
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
