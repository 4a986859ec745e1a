// Copyright (c) Mysten Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

//! Controller unit instrumentation CLI
//!
//! Validates every unit of a package against the policy tables and writes
//! metered copies to `<build>/instrumented/<package>`.
//!
//! Usage:
//!     instrumenter --engine pirates --build build --package mybot --policy resources

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use instrumenter::{InstrumentConfig, engine_api_library, instrument_dir};
use policy::{PolicyStore, load_policy};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Validate and meter controller units
#[derive(Parser, Debug)]
#[command(name = "instrumenter")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Engine package providing the API and the metering hook
    #[arg(short, long)]
    engine: String,

    /// Build directory containing the compiled package
    #[arg(short, long, default_value = ".")]
    build: PathBuf,

    /// Package to instrument
    #[arg(short, long)]
    package: String,

    /// Directory holding the policy tables
    #[arg(long, default_value = "resources")]
    policy: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(&cli) {
        Ok(count) => {
            info!("Instrumentation completed successfully ({count} unit(s))");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<usize> {
    let engine = cli.engine.trim();
    let config = InstrumentConfig::new(cli.package.trim(), engine);

    let policy = load_policy(&cli.policy, PolicyStore::builder())
        .with_context(|| format!("loading policy from {}", cli.policy.display()))?
        .approve_library(&engine_api_library(engine))
        .build();
    info!(
        "Policy: {} approved libraries, {} disallowed classes, {} disallowed methods, {} weighted methods",
        policy.approved_library_count(),
        policy.disallowed_class_count(),
        policy.disallowed_method_count(),
        policy.weighted_method_count()
    );

    let input = cli.build.join(&config.package);
    let output = cli.build.join("instrumented").join(&config.package);
    let count = instrument_dir(&input, &output, &policy, &config)
        .with_context(|| format!("instrumenting package `{}`", config.package))?;
    Ok(count)
}
