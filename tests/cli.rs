use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STATEMENT: &str = "\
Date,Description,Amount
2024-01-05,Whole Foods Market,-100.00
2024-01-06,Netflix Subscription,-15.00
";

fn purse(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("purse").unwrap();
    cmd.env("PURSE_CONFIG_DIR", config)
        .env("NO_COLOR", "1")
        .env_remove("PURSE_ADVISOR_HOST")
        .env_remove("PURSE_ADVISOR_MODEL")
        .env_remove("PURSE_ADVISOR_API_KEY")
        .env_remove("RUST_LOG");
    cmd
}

fn write_statement(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn analyze_prints_totals() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_statement(&dir, "statement.csv", STATEMENT);
    purse(dir.path())
        .arg("analyze")
        .arg(&csv)
        .assert()
        .success()
        .stdout(predicate::str::contains("groceries"))
        .stdout(predicate::str::contains("subscription"))
        .stdout(predicate::str::contains("$115.00"));
}

#[test]
fn analyze_rejects_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_statement(&dir, "statement.txt", STATEMENT);
    purse(dir.path())
        .arg("analyze")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}

#[test]
fn analyze_reports_missing_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_statement(&dir, "statement.csv", "Date,Amount\n2024-01-05,-1.00\n");
    purse(dir.path())
        .arg("analyze")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required column 'description'"));
}

#[test]
fn categorize_prints_category() {
    let dir = tempfile::tempdir().unwrap();
    purse(dir.path())
        .args(["categorize", "Whole Foods Market"])
        .assert()
        .success()
        .stdout(predicate::str::diff("groceries\n"));
}

#[test]
fn categories_lists_in_match_order() {
    let dir = tempfile::tempdir().unwrap();
    purse(dir.path())
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("utilities"))
        .stdout(predicate::str::contains("(anything else)"));
}

#[test]
fn transactions_filters_by_category() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_statement(&dir, "statement.csv", STATEMENT);
    purse(dir.path())
        .arg("transactions")
        .arg(&csv)
        .args(["--category", "subscription"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 transactions"))
        .stdout(predicate::str::contains("Netflix Subscription"))
        .stdout(predicate::str::contains("Whole Foods").not())
        .stdout(predicate::str::contains("Spending in subscription: $15.00"));
}

#[test]
fn transactions_rejects_unknown_category() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_statement(&dir, "statement.csv", STATEMENT);
    purse(dir.path())
        .arg("transactions")
        .arg(&csv)
        .args(["--category", "yachts"])
        .assert()
        .failure();
}

#[test]
fn init_writes_settings_once() {
    let dir = tempfile::tempdir().unwrap();
    purse(dir.path()).arg("init").assert().success();
    let settings = dir.path().join("settings.json");
    assert!(settings.exists());
    let content = std::fs::read_to_string(&settings).unwrap();
    assert!(content.contains("\"username\": \"user\""));

    purse(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exist"));
}

#[test]
fn chat_session_without_advisor() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_statement(&dir, "statement.csv", STATEMENT);
    let script = format!(
        "user\npassword\n{}\nanalyze\nhelp\nwhat should I cut?\nexit\n",
        csv.display()
    );
    purse(dir.path())
        .arg("chat")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged in successfully!"))
        .stdout(predicate::str::contains("Loaded 2 transactions"))
        .stdout(predicate::str::contains("Total spending: $115.00"))
        .stdout(predicate::str::contains("Available commands"))
        .stdout(predicate::str::contains(
            "Sorry, I encountered an error processing your request.",
        ))
        .stdout(predicate::str::contains("Exiting the chat."));
}

#[test]
fn chat_rejects_wrong_password_then_accepts() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_statement(&dir, "statement.csv", STATEMENT);
    purse(dir.path())
        .args(["chat", "--file"])
        .arg(&csv)
        .write_stdin("user\nwrong\nuser\npassword\nanalyze\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Incorrect username or password."))
        .stdout(predicate::str::contains("Total spending: $115.00"));
}

#[test]
fn chat_keeps_asking_after_bad_statement() {
    let dir = tempfile::tempdir().unwrap();
    let bad = write_statement(&dir, "notes.txt", "hello");
    let good = write_statement(&dir, "statement.csv", STATEMENT);
    let script = format!("user\npassword\n{}\n{}\nanalyze\n", bad.display(), good.display());
    purse(dir.path())
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Unsupported file format"))
        .stdout(predicate::str::contains("Total spending: $115.00"));
}

#[test]
fn analyze_reports_overflow_without_panicking() {
    let dir = tempfile::tempdir().unwrap();
    let csv = write_statement(
        &dir,
        "statement.csv",
        "Date,Description,Amount\n\
         2024-01-05,Hotel,-50000000000000000000000000000\n\
         2024-01-06,Hotel,-50000000000000000000000000000\n",
    );
    purse(dir.path())
        .arg("analyze")
        .arg(&csv)
        .assert()
        .failure()
        .stderr(predicate::str::contains("too large to compute"))
        .stderr(predicate::str::contains("panicked").not());
}
