use anyhow::{Context, Result};
use benchdiff::analysis::Analysis;
use benchdiff::cli::{Cli, OutputFormat};
use benchdiff::config::AnalysisConfig;
use benchdiff::report::{self, ReportKind, Table};
use benchdiff::store::SnapshotStore;
use clap::Parser;
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber: DEBUG with --verbose, otherwise WARN or RUST_LOG
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Load the configuration file if one was given
fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    match &cli.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration {}", path.display())),
        None => Ok(AnalysisConfig::default()),
    }
}

/// Render all tables in the requested format
fn render(tables: &[Table], format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Text => report::render_text(tables),
        OutputFormat::Json => report::to_json(tables)?,
        OutputFormat::Csv => tables
            .iter()
            .map(report::to_csv)
            .collect::<Vec<_>>()
            .join("\n"),
    };
    Ok(rendered)
}

fn write_output(cli: &Cli, content: &str) -> Result<()> {
    if cli.writes_stdout() {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
    } else {
        std::fs::write(&cli.output, content)
            .with_context(|| format!("Failed to write {}", cli.output.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = load_config(&cli)?;

    let kinds = cli
        .reports
        .iter()
        .map(|name| name.parse::<ReportKind>())
        .collect::<Result<Vec<_>, _>>()?;

    let store = SnapshotStore::from_file(&cli.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", cli.snapshot.display()))?;

    let analysis = Analysis::from_store(&store, &cli.environments, &config)?;
    let tables = report::build_reports(&analysis, &config, &kinds);

    if let Some(dir) = &cli.output_dir {
        let written = report::write_csv_dir(&tables, dir)
            .with_context(|| format!("Failed to write reports to {}", dir.display()))?;
        tracing::info!("Wrote {} CSV reports to {}", written.len(), dir.display());
    }

    let content = render(&tables, cli.format)?;
    write_output(&cli, &content)
}
