use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use weifilter::builder::PipelineBuilder;
use weifilter::config::Config;
use weifilter::exporter::CsvDialect;

const COOKIE_ENV: &str = "WEIFILTER_COOKIE";

/// Export the weibo.com filtered (muted) user list, with profile details, to CSV.
#[derive(Debug, Parser)]
#[command(name = "filtered-users-export", version)]
struct Args {
    /// Config file, defaults to weifilter/config.json in the config directory
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Raw cookie header of a logged-in weibo.com session
    #[arg(long)]
    cookie: Option<String>,
    /// Browser cookie export (JSON) or a file holding the raw cookie header
    #[arg(long)]
    cookie_file: Option<PathBuf>,
    /// Output CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Pause between list pages, 0 disables
    #[arg(long)]
    page_interval_ms: Option<u64>,
    /// Pause between profile lookups, 0 disables
    #[arg(long)]
    profile_interval_ms: Option<u64>,
    /// First retry delay, doubled on every further retry
    #[arg(long)]
    initial_backoff_ms: Option<u64>,
    /// Per-request timeout; a timed out request is retried
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Join fields with plain commas, without CSV quoting
    #[arg(long)]
    naive_csv: bool,
    /// -v for debug, -vv for trace
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logger(args.verbose) {
        eprintln!("failed to init logger: {e:#}");
        return ExitCode::FAILURE;
    }

    match start(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn start(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {path:?}"))?,
        None => Config::find_and_load()?,
    };
    let config = apply_overrides(config, &args, std::env::var(COOKIE_ENV).ok());
    info!("Exporting filtered users to {}", config.output_path.display());

    let builder = PipelineBuilder::new(config);
    let pipeline = builder.build()?;
    let sink = builder.build_sink();
    let summary = pipeline.run(sink).await?;

    tracing::info!(
        rows = summary.rows,
        empty_profiles = summary.empty_profiles,
        "done"
    );
    Ok(())
}

fn apply_overrides(mut config: Config, args: &Args, env_cookie: Option<String>) -> Config {
    if let Some(cookie) = args.cookie.clone().or(env_cookie) {
        config.cookie = Some(cookie);
    }
    if let Some(path) = &args.cookie_file {
        config.cookie_file = Some(path.clone());
        if args.cookie.is_none() {
            config.cookie = None;
        }
    }
    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if let Some(ms) = args.page_interval_ms {
        config.page_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = args.profile_interval_ms {
        config.profile_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = args.initial_backoff_ms {
        config.initial_backoff = Duration::from_millis(ms);
    }
    if let Some(ms) = args.timeout_ms {
        config.request_timeout = Some(Duration::from_millis(ms));
    }
    if args.naive_csv {
        config.csv_dialect = CsvDialect::Naive;
    }
    config
}

fn init_logger(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level))
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}
