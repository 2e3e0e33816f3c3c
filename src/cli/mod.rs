pub mod analyze;
pub mod categorize;
pub mod chat;
pub mod credentials;
pub mod init;
pub mod transactions;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::models::Category;

#[derive(Parser)]
#[command(
    name = "purse",
    about = "Chat with your bank statement: spending summaries, budgeting tips and free-form questions."
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and chat about a bank statement (default).
    Chat {
        /// CSV/XLS/XLSX statement to load after login
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Print total and per-category spending for a statement.
    Analyze {
        /// Path to CSV or Excel statement
        file: PathBuf,
    },
    /// List the normalized transactions of a statement with their categories.
    Transactions {
        /// Path to CSV or Excel statement
        file: PathBuf,
        /// Only show transactions in this category
        #[arg(long)]
        category: Option<Category>,
    },
    /// Show which category a transaction description falls into.
    Categorize {
        /// Transaction description, e.g. "WHOLE FOODS MARKET #123"
        description: String,
    },
    /// List the categories and the keywords that select them, in match order.
    Categories,
    /// Write a default settings file if none exists.
    Init,
    /// Change the login credentials.
    Credentials {
        /// New username (default: keep the current one)
        #[arg(long)]
        username: Option<String>,
    },
}
