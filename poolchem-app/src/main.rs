use anyhow::Result;
use clap::{Parser, Subcommand};
use std::{env, io::IsTerminal, path::PathBuf};
use tracing_subscriber::EnvFilter;

mod config;
mod plotting;
mod workflow;

#[derive(Parser)]
#[command(name = "poolchem", version, about = "Pool water chemistry analysis and treatment planning")]
struct Cli {
    /// Directory holding chemistry.yaml, chemical_safety.json and calibration.json
    #[arg(long, global = true, default_value = "./data")]
    data_dir: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assess a readings file and write a treatment plan
    Analyze {
        /// Readings file (YAML or JSON)
        readings: PathBuf,
        #[arg(long, default_value = "./data/runs")]
        output_dir: String,
        /// Treatment history CSV to append to
        #[arg(long, default_value = "./data/history.csv")]
        history: String,
        /// Do not append this test to the history
        #[arg(long)]
        no_history: bool,
        /// Draw history charts into the run directory
        #[arg(long)]
        plot: bool,
    },
    /// Read test strip pad colors
    Strip {
        /// JSON map of pad name to [r, g, b]
        pads: PathBuf,
        /// Pads below this confidence (percent) are flagged
        #[arg(long, default_value_t = 50.0)]
        min_confidence: f64,
    },
    /// Chemical safety data
    Safety {
        #[command(subcommand)]
        action: SafetyCommand,
    },
    /// Langelier Saturation Index for one set of values
    Balance {
        #[arg(long)]
        ph: f64,
        #[arg(long)]
        alkalinity: f64,
        #[arg(long)]
        hardness: f64,
        /// Water temperature in Fahrenheit
        #[arg(long, default_value_t = 78.0)]
        temperature: f64,
    },
    /// Trends from the treatment history
    Trend {
        #[arg(long, default_value = "./data/history.csv")]
        history: String,
        /// Only this pool's readings
        #[arg(long)]
        pool: Option<String>,
        /// Draw charts into this directory
        #[arg(long)]
        plot_dir: Option<String>,
    },
}

#[derive(Subcommand)]
enum SafetyCommand {
    /// Check whether chemicals may be used together
    Check {
        #[arg(required = true, num_args = 2..)]
        chemicals: Vec<String>,
    },
    /// Hazard rating, precautions and storage for one chemical
    Info { chemical: String },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let kb = config::KnowledgeBase::load(&cli.data_dir)?;

    match cli.command {
        Command::Analyze {
            readings,
            output_dir,
            history,
            no_history,
            plot,
        } => {
            let options = workflow::AnalysisOptions {
                output_dir: &output_dir,
                history_path: (!no_history).then_some(history.as_str()),
                plot,
            };
            workflow::run_analysis(&kb, &readings, &options)?;
        }
        Command::Strip { pads, min_confidence } => workflow::run_strip(&kb, &pads, min_confidence)?,
        Command::Safety { action } => match action {
            SafetyCommand::Check { chemicals } => workflow::run_safety_check(&kb, &chemicals)?,
            SafetyCommand::Info { chemical } => workflow::run_safety_info(&kb, &chemical)?,
        },
        Command::Balance {
            ph,
            alkalinity,
            hardness,
            temperature,
        } => workflow::run_balance(ph, alkalinity, hardness, temperature)?,
        Command::Trend {
            history,
            pool,
            plot_dir,
        } => workflow::run_trend(&kb, &history, pool.as_deref(), plot_dir.as_deref())?,
    }

    Ok(())
}

fn init_tracing() {
    // ---
    let use_color = match env::var("FORCE_COLOR").as_deref() {
        Ok("1") | Ok("true") | Ok("yes") => true,
        Ok("0") | Ok("false") | Ok("no") => false,
        _ => std::io::stderr().is_terminal(),
    };

    // Use RUST_LOG if available, otherwise fall back to POOLCHEM_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("POOLCHEM_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("info") => "info",
            Some("error") => "error",
            _ => "warn",
        };
        EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(env_filter)
        .with_ansi(use_color)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
