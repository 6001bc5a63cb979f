//! podsplice binary.

use anyhow::Context;
use clap::Parser;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use podsplice_cli::{commands, diagnostic_for, exit_code_for, Cli, Command, SpliceSettings};

fn init_tracing(verbose: bool) {
    // Colored output for terminals, JSON for log shippers
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "podsplice={level},podsplice_media={level},podsplice_cli={level}"
        ))
    });

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(verbose)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

fn install_metrics(settings: &SpliceSettings) -> Option<PrometheusHandle> {
    settings.metrics_path.as_ref()?;
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to install metrics recorder: {}", e);
            None
        }
    }
}

fn write_metrics(settings: &SpliceSettings, handle: Option<PrometheusHandle>) {
    if let (Some(path), Some(handle)) = (&settings.metrics_path, handle) {
        if let Err(e) = std::fs::write(path, handle.render()) {
            warn!(path = %path.display(), "Failed to write metrics snapshot: {}", e);
        }
    }
}

async fn run(cli: Cli, settings: &SpliceSettings) -> anyhow::Result<()> {
    match cli.command {
        Command::Cut(args) => commands::cut(args, settings).await.context("cut"),
        Command::Plan(args) => commands::plan(args, settings).await.context("plan"),
        Command::TrimSilences(args) => commands::trim_silences(args, settings)
            .await
            .context("trim-silences"),
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match SpliceSettings::from_env() {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            std::process::exit(e.exit_code());
        }
    };
    info!(work_dir = %settings.work_dir.display(), "Starting podsplice");

    let metrics = install_metrics(&settings);
    let result = run(cli, &settings).await;
    write_metrics(&settings, metrics);

    if let Err(e) = result {
        error!("{:#}", e);
        if let Some(diagnostic) = diagnostic_for(&e) {
            eprintln!("{}", diagnostic);
        }
        std::process::exit(exit_code_for(&e));
    }
}
