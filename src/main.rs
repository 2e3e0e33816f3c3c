mod advisor;
mod categorizer;
mod cli;
mod error;
mod fmt;
mod importer;
mod models;
mod reports;
mod session;
mod settings;

use clap::Parser;
use tracing_subscriber::{fmt as log_fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    // RUST_LOG > --verbose > warn. Logs go to stderr so stdout stays the conversation.
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            log_fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command.unwrap_or(Commands::Chat { file: None }) {
        Commands::Chat { file } => cli::chat::run(file),
        Commands::Analyze { file } => cli::analyze::run(&file),
        Commands::Transactions { file, category } => cli::transactions::run(&file, category),
        Commands::Categorize { description } => cli::categorize::run(&description),
        Commands::Categories => cli::categorize::list(),
        Commands::Init => cli::init::run(),
        Commands::Credentials { username } => cli::credentials::run(username),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
