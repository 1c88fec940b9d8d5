use anyhow::{Context, Result};
use pem_cluster_sim::{config, simulation, telemetry};
use config::Config;
use simulation::ClusterSimulationEngine;
use std::io::{self, Read, Write};
use telemetry::init_tracing;
use tracing::info;

/// Reads a JSON array of input power (kW per timestep) on stdin and writes
/// the simulation result as JSON on stdout.
fn main() -> Result<()> {
    init_tracing();

    let cfg = Config::load()?;
    let engine =
        ClusterSimulationEngine::new(cfg.cluster).context("failed to build cluster engine")?;

    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read input power from stdin")?;
    let power_kw: Vec<f64> = serde_json::from_str(&input)
        .context("input must be a JSON array of power values in kW")?;
    info!(steps = power_kw.len(), "read input power series");

    let result = engine.run(&power_kw)?;

    let mut out = io::stdout().lock();
    serde_json::to_writer(&mut out, &result)?;
    writeln!(out)?;
    Ok(())
}
