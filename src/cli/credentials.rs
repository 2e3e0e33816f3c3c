use anyhow::{bail, Context};
use colored::Colorize;
use zeroize::Zeroize;

use crate::settings::{load_stored_settings, password_digest, save_settings};

pub fn run(username: Option<String>) -> anyhow::Result<()> {
    let mut settings = load_stored_settings();
    if let Some(name) = username {
        let name = name.trim().to_string();
        if name.is_empty() {
            bail!("username must not be empty");
        }
        settings.username = name;
    }

    let mut password = rpassword::prompt_password("New password: ").context("reading password")?;
    let mut confirm = rpassword::prompt_password("Confirm password: ").context("reading password")?;
    let matches = password == confirm;
    let empty = password.is_empty();
    let digest = password_digest(&password);
    password.zeroize();
    confirm.zeroize();

    if empty {
        bail!("password must not be empty");
    }
    if !matches {
        bail!("passwords do not match");
    }

    settings.password_sha256 = digest;
    save_settings(&settings)?;
    println!("{}", format!("Credentials updated for {}", settings.username).green());
    Ok(())
}
