use anyhow::Context;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use daqstream::config;
use daqstream::daq::run_acquisition;
use daqstream::plan::resolve_plan;

#[cfg(feature = "nidaq")]
use daqstream::daq::nidaq::Nidaq;
#[cfg(not(feature = "nidaq"))]
use daqstream::daq::sim::SimDaq;

/// Configuration file describing channels and sampling, relative to the
/// working directory unless overridden by the first CLI argument.
const CONFIG_PATH: &str = "config.ini";

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("setting default tracing subscriber failed");

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| CONFIG_PATH.to_owned());
    let mapping = config::load(&path)?;
    let plan = resolve_plan(&mapping)
        .with_context(|| format!("resolving acquisition plan from {path}"))?;
    info!("resolved {} channel(s) from {path}", plan.channels.len());

    #[cfg(feature = "nidaq")]
    let mut hardware = Nidaq::new();
    #[cfg(not(feature = "nidaq"))]
    let mut hardware = SimDaq::new();

    run_acquisition(&mut hardware, &plan)?;
    Ok(())
}
