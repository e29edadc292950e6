mod config;

pub use config::{BackendConfig, Config, OAuthConfig};

use std::path::PathBuf;

/// Returns `~/.config/bassist[-dev]/` based on BASSIST_ENV.
///
/// Set BASSIST_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("BASSIST_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("bassist-dev")
    } else {
        base_dir.join("bassist")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
