//! Alert Normalizer - Main Entry Point

use alert_cli::{run, CliArgs};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    let rendered = run(&args)?;
    println!("{rendered}");

    Ok(())
}
