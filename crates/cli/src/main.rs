#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use cmdq::{
    AppError, Application, Config, ConfigError, ConfigFlags, HELP, ManifestRegistry, Outcome,
    TerminalAdapter, init_logging,
};
use cmdq_core::{MatchTier, Resolution};
use cmdq_storage::CatalogStore;
use serde::Serialize;
use std::io::Write;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "cmdq", version, about = "Find and run documented commands by name or description")]
struct Cli {
    #[command(flatten)]
    config: ConfigFlags,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Rebuild the catalog from the manifest.
    Index,
    /// Resolve a query against the current catalog.
    Query {
        text: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Interactive selection over stdin; invokes the confirmed command.
    Run,
    /// Show catalog build information.
    Stats,
    /// Drop the catalog.
    Clear,
}

#[derive(Serialize)]
struct QueryReport<'a> {
    query: &'a str,
    tier: &'static str,
    names: &'a [String],
    degraded: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.config.log_level.as_deref());

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "cmdq failed");
            eprintln!("cmdq: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, AppError> {
    let config = Config::load(&cli.config)?;
    match cli.command {
        Cmd::Index => {
            let mut app = Application::new(config.catalog(), load_registry(&config)?)?;
            if let Some(report) = app.initialize()? {
                println!(
                    "indexed {} commands in {} batches (generation {})",
                    report.record_count, report.batches, report.generation
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Query { text, json } => {
            let store = CatalogStore::open(config.catalog())?;
            let query = text.join(" ");
            let (resolution, degraded) = match store.resolve(&query) {
                Ok(resolution) => (resolution, false),
                Err(err) => {
                    eprintln!("cmdq: {err}");
                    (Resolution::empty(), true)
                }
            };
            print_resolution(&query, &resolution, degraded, json);
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Run => {
            let mut app = Application::new(config.catalog(), load_registry(&config)?)?;
            app.initialize()?;
            eprintln!("{HELP}");
            let stdin = std::io::stdin();
            let mut adapter = TerminalAdapter::new(stdin.lock(), std::io::stdout());
            match app.invoke_interactive(&mut adapter)? {
                Outcome::Invoked(name) => {
                    tracing::info!(command = %name, "command finished");
                    Ok(ExitCode::SUCCESS)
                }
                Outcome::NoSelection => {
                    eprintln!("cmdq: nothing selected");
                    Ok(ExitCode::from(2))
                }
                Outcome::Cancelled => Ok(ExitCode::from(130)),
            }
        }
        Cmd::Stats => {
            let store = CatalogStore::open(config.catalog())?;
            match store.stats()? {
                Some(stats) => println!(
                    "path: {}\nrecords: {}\ngeneration: {}\nbuilt_at_ms: {}",
                    store.path().display(),
                    stats.record_count,
                    stats.generation,
                    stats.built_at_ms
                ),
                None => println!("path: {}\ncatalog not built", store.path().display()),
            }
            Ok(ExitCode::SUCCESS)
        }
        Cmd::Clear => {
            CatalogStore::open(config.catalog())?.clear()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_registry(config: &Config) -> Result<ManifestRegistry, ConfigError> {
    let path = config
        .manifest_path
        .as_deref()
        .ok_or(ConfigError::MissingManifest)?;
    ManifestRegistry::load(path)
}

fn print_resolution(query: &str, resolution: &Resolution, degraded: bool, json: bool) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let written = if json {
        let report = QueryReport {
            query,
            tier: resolution.tier.as_str(),
            names: &resolution.names,
            degraded,
        };
        match serde_json::to_string(&report) {
            Ok(line) => writeln!(out, "{line}"),
            Err(err) => Err(std::io::Error::other(err)),
        }
    } else if resolution.tier == MatchTier::None {
        writeln!(out, "[no match]")
    } else {
        writeln!(out, "# tier: {}", resolution.tier.as_str())
            .and_then(|()| resolution.names.iter().try_for_each(|name| writeln!(out, "{name}")))
    };
    if let Err(err) = written {
        tracing::warn!(error = %err, "failed to write query output");
    }
}
