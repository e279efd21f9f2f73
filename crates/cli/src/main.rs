mod cli;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidshift_core::{
    build_args, load_config, load_config_from_env, plan, resolve_output_path, validate_config,
    Config, ContainerFormat, ConversionRequest, ConversionSettings, ConvertError, FfprobeProber,
    JobOrchestrator, JobSnapshot, JobState, Prober, Tool, ToolLocator,
};

use cli::Cli;

/// Config file picked up from the working directory when none is given.
const DEFAULT_CONFIG: &str = "vidshift.toml";

/// Exit status after a cancelled conversion, as for SIGINT.
const EXIT_CANCELLED: i32 = 130;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            error!("Fatal error: {:#}", e);
            eprintln!("vidshift: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    // Initialize logging; stdout is reserved for progress output.
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = resolve_config(cli.config.as_deref())?;
    validate_config(&config).context("Configuration validation failed")?;

    if cli.check_tools {
        return Ok(check_tools(&config));
    }

    let (Some(input), Some(format)) = (cli.input.clone(), cli.format) else {
        anyhow::bail!("An input file and --format are required");
    };
    let settings = cli.settings(config.defaults.clone());
    settings.validate().context("Invalid conversion settings")?;

    if cli.dry_run {
        dry_run(&config, &input, format, &settings).await?;
        return Ok(0);
    }

    convert(config, ConversionRequest::new(input, format).with_settings(settings), cli.json).await
}

/// Explicit `--config`, then `VIDSHIFT_CONFIG`, then `./vidshift.toml`, then
/// built-in defaults. Environment overrides apply in every case.
fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    let config_path = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var("VIDSHIFT_CONFIG").ok().map(PathBuf::from));

    match config_path {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config from {:?}", path))
        }
        None if Path::new(DEFAULT_CONFIG).exists() => {
            info!("Loading configuration from {}", DEFAULT_CONFIG);
            load_config(Path::new(DEFAULT_CONFIG))
                .with_context(|| format!("Failed to load config from {}", DEFAULT_CONFIG))
        }
        None => load_config_from_env().context("Failed to load default configuration"),
    }
}

fn check_tools(config: &Config) -> i32 {
    let statuses = ToolLocator::new(config.tools.clone()).check_all();
    for status in &statuses {
        match &status.path {
            Some(path) => println!("{:<8} {}", status.tool.binary_name(), path.display()),
            None => println!("{:<8} not found", status.tool.binary_name()),
        }
    }
    if statuses.iter().all(|s| s.available()) {
        0
    } else {
        1
    }
}

/// Probes and plans without spawning the transcoder.
async fn dry_run(
    config: &Config,
    input: &Path,
    format: ContainerFormat,
    settings: &ConversionSettings,
) -> Result<()> {
    if !input.is_file() {
        return Err(ConvertError::invalid_input(format!(
            "Not a readable file: {}",
            input.display()
        ))
        .into());
    }

    let locator = ToolLocator::new(config.tools.clone());
    let prober = FfprobeProber::new(locator.clone());
    let codecs = prober.probe(input).await?;
    let plan = plan(&codecs, format, settings);
    let target = resolve_output_path(input, format, settings, &config.output.suffix)?;
    let args = build_args(&plan, settings, input, &target.write_path);

    let ffmpeg = locator
        .locate(Tool::Ffmpeg)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| Tool::Ffmpeg.binary_name().to_string());

    println!("{}", plan.summary());
    println!("Output: {}", target.final_path.display());
    println!("{} {}", ffmpeg, shell_join(&args));
    Ok(())
}

async fn convert(config: Config, request: ConversionRequest, json: bool) -> Result<i32> {
    let orchestrator = Arc::new(JobOrchestrator::new(config));
    let mut handle = orchestrator.start(request).await?;

    let canceller = Arc::clone(&orchestrator);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling conversion");
            canceller.cancel().await;
        }
    });

    loop {
        let snapshot = handle.updates.borrow_and_update().clone();
        render(&snapshot, json);
        if snapshot.state.is_terminal() || handle.updates.changed().await.is_err() {
            break;
        }
    }
    if !json {
        println!();
    }

    match handle.wait().await {
        Ok(outcome) => {
            info!(
                "Converted {:?} -> {:?} in {} ms",
                outcome.input_path, outcome.output_path, outcome.elapsed_ms
            );
            Ok(0)
        }
        Err(ConvertError::Cancelled) => Ok(EXIT_CANCELLED),
        Err(e) => {
            eprintln!("vidshift: {}", e);
            Ok(e.exit_code().filter(|c| *c > 0).unwrap_or(1))
        }
    }
}

fn render(snapshot: &JobSnapshot, json: bool) {
    if json {
        if let Ok(line) = serde_json::to_string(snapshot) {
            println!("{}", line);
        }
        return;
    }
    if snapshot.state == JobState::Idle {
        return;
    }

    let mut stdout = std::io::stdout().lock();
    let _ = write!(
        stdout,
        "\r\x1b[2K{:>5.1}%  {}",
        snapshot.progress * 100.0,
        snapshot.status
    );
    let _ = stdout.flush();
}

/// Joins arguments for display, quoting any that need it.
fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|arg| {
            if !arg.is_empty()
                && arg
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,".contains(c))
            {
                arg.clone()
            } else {
                format!("'{}'", arg.replace('\'', r"'\''"))
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
