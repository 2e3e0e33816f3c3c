use crate::settings::{save_settings, settings_file_exists, settings_path, Settings};

pub fn run() -> anyhow::Result<()> {
    let path = settings_path();
    if settings_file_exists() {
        println!("Settings already exist at {}", path.display());
        return Ok(());
    }
    save_settings(&Settings::default())?;
    println!("Wrote default settings to {}", path.display());
    println!("Default login is user / password; change it with `purse credentials`.");
    Ok(())
}
