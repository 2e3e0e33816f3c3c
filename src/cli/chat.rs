use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;

use crate::advisor;
use crate::models::Role;
use crate::session::{Command, Credentials, SessionController, SessionState};
use crate::settings::load_settings;

const WRAP_WIDTH: usize = 80;

/// Print `prompt`, then read one line. `None` means end of input.
fn prompt_line(input: &mut impl BufRead, prompt: &str) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn prompt_password(input: &mut impl BufRead) -> io::Result<Option<String>> {
    if io::stdin().is_terminal() {
        rpassword::prompt_password("Password: ").map(Some)
    } else {
        prompt_line(input, "Password: ")
    }
}

/// Ask for credentials until login succeeds. Returns false on end of input.
fn login(controller: &mut SessionController, input: &mut impl BufRead) -> anyhow::Result<bool> {
    println!("{}", "Login".bold());
    loop {
        let Some(username) = prompt_line(input, "Username: ")? else {
            return Ok(false);
        };
        let Some(password) = prompt_password(input).context("reading password")? else {
            return Ok(false);
        };
        match controller.login(username.trim(), password) {
            Ok(()) => {
                println!("{}", "Logged in successfully!".green());
                return Ok(true);
            }
            Err(e) => println!("{}", e.to_string().red()),
        }
    }
}

fn try_load(controller: &mut SessionController, path: &Path) {
    match controller.load_file(path) {
        Ok(count) => println!(
            "{}",
            format!("Loaded {count} transactions from {}", path.display()).green()
        ),
        Err(e) => println!("{}", format!("Error: {e}").red()),
    }
}

/// Keep asking for a statement until one loads. Returns false on end of input.
fn ensure_dataset(
    controller: &mut SessionController,
    input: &mut impl BufRead,
    pending: &mut Option<PathBuf>,
) -> anyhow::Result<bool> {
    if let Some(path) = pending.take() {
        try_load(controller, &path);
    }
    while controller.state() == SessionState::AuthenticatedNoData {
        let Some(path) = prompt_line(input, "Bank statement (CSV or Excel): ")? else {
            return Ok(false);
        };
        let path = path.trim();
        if path.is_empty() {
            println!("{}", "Please upload your bank statement to start.".yellow());
            continue;
        }
        try_load(controller, Path::new(path));
    }
    Ok(true)
}

fn print_turn(role: Role, content: &str) {
    match role {
        Role::User => println!("{} {content}", "you:".bold()),
        Role::Assistant => println!("{}\n{content}", "purse:".cyan().bold()),
    }
}

pub fn run(file: Option<PathBuf>) -> anyhow::Result<()> {
    let settings = load_settings();
    let gateway = advisor::from_settings(&settings.advisor)?;
    let mut controller = SessionController::new(Credentials::from_settings(&settings), gateway);
    let mut pending = file;

    let stdin = io::stdin();
    let mut input = stdin.lock();

    println!("{}", "AI Personal Finance Assistant".bold());
    loop {
        if !controller.session().is_authenticated() && !login(&mut controller, &mut input)? {
            return Ok(());
        }
        if !ensure_dataset(&mut controller, &mut input, &mut pending)? {
            return Ok(());
        }

        let history = controller.session().history();
        if !history.is_empty() {
            if let Some(dataset) = controller.session().dataset() {
                println!(
                    "{}",
                    format!("Using the {} transactions already loaded.", dataset.len()).dimmed()
                );
            }
            println!("{}", "Previous conversation:".dimmed());
            for turn in history {
                print_turn(turn.role, &turn.content);
            }
        }
        println!("Ask me about your finances. Enter 'help' to see available commands.");

        while controller.state() == SessionState::AuthenticatedHasData {
            let Some(line) = prompt_line(&mut input, "> ")? else {
                return Ok(());
            };
            if line.trim().is_empty() {
                continue;
            }
            let reply = controller.handle(&line)?;
            if Command::parse(&line) == Command::Query {
                print_turn(Role::Assistant, &textwrap::fill(&reply, WRAP_WIDTH));
            } else {
                print_turn(Role::Assistant, &reply);
            }
        }
    }
}
