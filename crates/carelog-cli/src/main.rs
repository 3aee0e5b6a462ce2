//! carelog CLI - care-record preprocessing and ICF annotation.

mod cli;
mod commands;
mod server;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Split {
            file,
            output_dir,
            suffix,
        } => commands::split::run(file, output_dir, suffix),

        Commands::Evaluate {
            input,
            output,
            mock_llm,
            concurrency,
            limit,
        } => commands::evaluate::run(input, output, mock_llm, concurrency, limit),

        Commands::Serve {
            host,
            port,
            mock_llm,
        } => commands::serve::run(host, port, mock_llm),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Log to stderr; stdout is reserved for command output.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "carelog={default_level},carelog_cli={default_level},tower_http=warn"
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
