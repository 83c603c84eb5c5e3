use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bibxref_core::sources::CrossRefSource;
use bibxref_core::{XrefConfig, XrefError, run};

#[derive(Parser)]
#[command(
    name = "bibxref",
    about = "Cross-reference a local publication catalog against Crossref",
    version,
    long_about = None
)]
struct Cli {
    /// Input catalog (delimited text with a header row).
    input: Option<PathBuf>,

    /// Output catalog, overwritten on every run.
    output: Option<PathBuf>,

    /// Email advertised to the Crossref polite pool.
    #[arg(long)]
    email: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = XrefConfig::from_env();
    if let Some(input) = cli.input {
        config.input_path = input;
    }
    if let Some(output) = cli.output {
        config.output_path = output;
    }
    config.polite_email = cli.email;

    info!(
        input = %config.input_path.display(),
        output = %config.output_path.display(),
        "starting reconciliation"
    );

    let source = Arc::new(CrossRefSource::new(config.polite_email.clone()));
    match run(&config, source).await {
        Ok(summary) => {
            println!("found {}/{}", summary.found, summary.total);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            match e {
                XrefError::InputNotFound(_) => ExitCode::from(2),
                XrefError::MissingColumn(_) => ExitCode::from(3),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
