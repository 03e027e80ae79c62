// SPDX-FileCopyrightText: 2025 KVPROVE Project Team
// SPDX-License-Identifier: PMPL-1.0-or-later

//! KVPROVE CLI - Main binary entry point
//!
//! Discharges the proof obligations of one kernel property with the
//! configured automated provers

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use kvprove::provers;
use kvprove::{
    BasicSimplifier, JsonObligationFile, ObligationSource, ProverKind, VerificationPipeline,
    VerifyConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

mod output;

use output::{OutputFormat, OutputFormatter};

/// KVPROVE - proof obligations for parallel kernels, raced across automated provers
#[derive(Parser)]
#[command(name = "kvprove")]
#[command(version, about, long_about = None)]
#[command(author = "KVPROVE Project Team")]
struct Cli {
    /// Output format (text, json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify one property of a kernel
    Verify {
        /// Path to the obligation file (JSON)
        file: PathBuf,

        /// Property to verify
        #[arg(short, long)]
        target: String,

        /// Prover to race (repeatable; replaces the configured set)
        #[arg(short, long = "prover")]
        provers: Vec<ProverKind>,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Per-call time limit of the transformation phases in seconds
        #[arg(long)]
        time_limit: Option<u64>,

        /// Per-call time limit of the direct phase in seconds
        #[arg(long)]
        direct_time_limit: Option<u64>,

        /// Per-call memory limit in megabytes
        #[arg(long)]
        memory_limit: Option<u64>,

        /// Only run the direct phase
        #[arg(long)]
        no_transformations: bool,

        /// Helper symbol removed by auxiliary elimination
        #[arg(long)]
        aux_symbol: Option<String>,
    },

    /// Print the SMT-LIB problems of a property without running any prover
    Render {
        /// Path to the obligation file (JSON)
        file: PathBuf,

        /// Property to render
        #[arg(short, long)]
        target: String,
    },

    /// List supported provers
    ListProvers {
        /// Show executables and availability
        #[arg(short, long)]
        detailed: bool,

        /// Configuration file (TOML) with executable overrides
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Command-line overrides of the configuration file
struct VerifyOverrides {
    provers: Vec<ProverKind>,
    time_limit: Option<u64>,
    direct_time_limit: Option<u64>,
    memory_limit: Option<u64>,
    no_transformations: bool,
    aux_symbol: Option<String>,
}

impl VerifyOverrides {
    fn apply(self, config: &mut VerifyConfig) {
        if !self.provers.is_empty() {
            config.provers = self.provers;
        }
        if let Some(secs) = self.time_limit {
            config.time_limit_secs = secs;
        }
        if let Some(secs) = self.direct_time_limit {
            config.direct_time_limit_secs = secs;
        }
        if let Some(mb) = self.memory_limit {
            config.memory_limit_mb = mb;
        }
        if self.no_transformations {
            config.transformations = false;
        }
        if let Some(symbol) = self.aux_symbol {
            config.auxiliary_symbol = symbol;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    let formatter = OutputFormatter::new(cli.format);

    let result = match cli.command {
        Commands::Verify {
            file,
            target,
            provers,
            config,
            time_limit,
            direct_time_limit,
            memory_limit,
            no_transformations,
            aux_symbol,
        } => {
            let overrides = VerifyOverrides {
                provers,
                time_limit,
                direct_time_limit,
                memory_limit,
                no_transformations,
                aux_symbol,
            };
            match verify_command(file, target, config, overrides, &formatter).await {
                Ok(true) => Ok(()),
                Ok(false) => std::process::exit(1),
                Err(e) => Err(e),
            }
        }

        Commands::Render { file, target } => render_command(file, target, &formatter),

        Commands::ListProvers { detailed, config } => {
            list_provers_command(detailed, config, &formatter)
        }
    };

    if let Err(e) = result {
        formatter.error(&format!("Error: {:#}", e))?;
        std::process::exit(2);
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::{fmt, prelude::*};

    let filter = if verbose {
        EnvFilter::new("kvprove=debug,info")
    } else {
        EnvFilter::new("kvprove=info,warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<VerifyConfig> {
    match path {
        Some(path) => VerifyConfig::from_file(&path),
        None => Ok(VerifyConfig::default()),
    }
}

/// Verify command implementation; `Ok(false)` when obligations remain
async fn verify_command(
    file: PathBuf,
    target: String,
    config_path: Option<PathBuf>,
    overrides: VerifyOverrides,
    formatter: &OutputFormatter,
) -> Result<bool> {
    let mut config = load_config(config_path)?;
    overrides.apply(&mut config);
    config.validate()?;

    let source = JsonObligationFile::from_path(&file)?;
    let obligations = source
        .generate_obligations(&target)
        .with_context(|| format!("No obligations for {} in {}", target, file.display()))?;
    info!(
        "Verifying {} ({} obligation(s)) with {}",
        target,
        obligations.len(),
        config
            .provers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let launchers = provers::launchers_for(
        &config.provers,
        |kind| config.executable(kind),
        config.kill_grace(),
    );
    let pipeline = VerificationPipeline::new(&config, launchers, Arc::new(BasicSimplifier::new()))?;

    let pb = (formatter.format() == OutputFormat::Text)
        .then(|| create_progress_bar(&format!("Verifying {}...", target)));
    let report = pipeline.verify(obligations).await;
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if formatter.format() == OutputFormat::Text {
        formatter.header(&format!("Verification of {}", target))?;
    }
    formatter.report(&target, &report)?;

    if !report.is_verified() {
        warn!("{}: {} obligation(s) unverified", target, report.unsolved().len());
    }
    Ok(report.is_verified())
}

/// Render command implementation
fn render_command(file: PathBuf, target: String, formatter: &OutputFormatter) -> Result<()> {
    let source = JsonObligationFile::from_path(&file)?;
    let obligations = source.generate_obligations(&target)?;
    formatter.smtlib(&obligations)
}

/// List provers command
fn list_provers_command(
    detailed: bool,
    config_path: Option<PathBuf>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let config = load_config(config_path)?;
    let kinds = ProverKind::all();

    formatter.header("Supported Provers")?;
    formatter.info(&format!("Total: {} provers\n", kinds.len()))?;

    for kind in kinds {
        let selected = if config.provers.contains(&kind) { "*" } else { " " };
        if detailed {
            let executable = config.executable(kind);
            let status = if provers::is_available(&executable) {
                "available"
            } else {
                "not found"
            };
            formatter.result(&format!(
                "{} {:10} {} ({})",
                selected,
                kind.to_string(),
                executable.display(),
                status
            ))?;
        } else {
            formatter.result(&format!("{} {}", selected, kind))?;
        }
    }

    if !detailed {
        formatter.info("\nUse --detailed flag to check executables")?;
    }

    Ok(())
}

/// Create a progress bar with standard styling
fn create_progress_bar(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
