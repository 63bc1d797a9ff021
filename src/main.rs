//! Churnlens: member churn analytics backend
//!
//! Entry point that dispatches to the API server, the one-shot audit report
//! or the segmentation plot.

use anyhow::{Context, Result};
use churnlens::cli::{Args, Command};
use churnlens::logging::{init_subscriber, Verbosity};
use churnlens::server::ChurnServer;
use churnlens::{audit_members, read_members, segment_members, viz, ClusterPersonas};
use clap::Parser;
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_subscriber(Verbosity::from_flags(args.verbose, args.quiet));

    match args.command() {
        Command::Serve { host, port, no_cors } => {
            let server = ChurnServer::new(args.server_config(host, port, no_cors));
            server.run().await.with_context(|| format!("server on {} failed", server.address()))?;
        }
        Command::Audit => run_audit(&args)?,
        Command::Plot { output } => run_plot(&args, &output)?,
    }

    Ok(())
}

/// Print the quality report for the raw dataset
fn run_audit(args: &Args) -> Result<()> {
    let table = read_members(&args.data)?;
    let report = audit_members(&table)?;
    tracing::info!(
        records = report.total_records,
        health_score = report.health_score,
        "audit completed"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Project members and render the persona scatter plot
fn run_plot(args: &Args, output: &std::path::Path) -> Result<()> {
    let start_time = Instant::now();

    let table = read_members(&args.data)?;
    let points = segment_members(&table, &ClusterPersonas::default())?;
    viz::render_segmentation(&points, output)
        .with_context(|| format!("failed to render {}", output.display()))?;

    tracing::info!(
        points = points.len(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "segmentation plot written"
    );
    println!("Segmentation plot saved to: {}", output.display());
    Ok(())
}
