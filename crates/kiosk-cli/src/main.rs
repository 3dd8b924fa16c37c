//! kiosk-demo: runs a scripted use case against the mock kiosk runtime and
//! prints every screen the application renders, then the journal of runtime
//! calls.

mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use kiosk_core::KioskConfig;
use kiosk_flow::{KioskDriver, Screen};
use kiosk_peripherals::mock::{JournalEntry, MockKiosk, MockKioskHandle};
use kiosk_peripherals::{HttpLivenessProbe, LivenessProbe};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::scenario::Scenario;

/// Kiosk application demo on a simulated host runtime
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario to play
    #[arg(short, long, value_enum, default_value = "card-pay")]
    scenario: Scenario,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Print screens as JSON lines
    #[arg(long)]
    json: bool,

    /// Check delivery against the configured liveness URL instead of the mock
    #[arg(long)]
    live_probe: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = KioskConfig::load(args.config.as_deref()).context("loading configuration")?;
    info!("playing scenario {:?}", args.scenario);

    if args.live_probe {
        let probe = HttpLivenessProbe::new(config.liveness.url.clone(), config.liveness.timeout())
            .context("building liveness probe")?;
        run(args.scenario, config, probe, args.json).await
    } else {
        let probe = args.scenario.liveness();
        run(args.scenario, config, probe, args.json).await
    }
}

async fn run<P>(scenario: Scenario, config: KioskConfig, probe: P, json: bool) -> Result<()>
where
    P: LivenessProbe + Clone + 'static,
{
    let (kiosk, handle) = MockKiosk::builder()
        .services(scenario.services())
        .description("Borne de démonstration")
        .build();

    let mut driver = KioskDriver::new(kiosk, probe, config);
    driver.initialize().await;
    let screens = driver.subscribe_screen();
    let (actions, rx) = mpsc::channel(16);

    let script = async {
        let outcome = scenario::play(scenario.steps(), &handle, &actions, screens.clone()).await;
        if actions.send(kiosk_flow::UiAction::Shutdown).await.is_err() {
            warn!("driver already stopped");
        }
        outcome
    };

    let (controller, outcome, ()) =
        tokio::join!(driver.run(rx), script, print_screens(screens.clone(), json));

    print_journal(&handle);
    info!("final page: {}", controller.page());
    outcome
}

/// Print each screen as it changes, until the driver stops.
async fn print_screens(mut screens: watch::Receiver<Screen>, json: bool) {
    loop {
        let screen = screens.borrow_and_update().clone();
        if json {
            match serde_json::to_string(&screen) {
                Ok(line) => println!("{line}"),
                Err(err) => warn!("cannot encode screen: {}", err),
            }
        } else {
            println!("{screen}\n");
        }
        if screens.changed().await.is_err() {
            break;
        }
    }
}

fn print_journal(handle: &MockKioskHandle) {
    println!("--- runtime calls ---");
    for (at, entry) in handle.journal().timed_entries() {
        println!("{} {}", timestamp(at), describe(entry));
    }
}

fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%H:%M:%S%.3f").to_string()
}

fn describe(entry: &JournalEntry) -> String {
    match entry {
        JournalEntry::Subscribed(subscription) => format!("+ {subscription}"),
        JournalEntry::Unsubscribed(subscription) => format!("- {subscription}"),
        JournalEntry::Executed(command) => {
            format!("> {} {}", command, command.arguments())
        }
    }
}
