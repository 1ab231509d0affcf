//! `personachat config`: Configuration inspection commands.

use personachat_config::AppConfig;

/// Print the effective configuration (file + environment), secrets masked.
pub fn show() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if config.backend.remote.api_key.is_some() {
        config.backend.remote.api_key = Some("***".into());
    }
    println!("{}", config.to_toml());
    Ok(())
}

/// Print the built-in defaults as a starting config file.
pub fn show_default() {
    println!("{}", AppConfig::default_toml());
}

pub fn path() {
    println!("{}", AppConfig::config_path().display());
}
