//! Shared utility functions for Metalyzr crates

use crate::error::{Error, Result};
use camino::Utf8PathBuf;

/// Get the user's home directory
///
/// The HOME variable wins over `dirs::home_dir()` so that containers and
/// tests can redirect the state directory.
pub fn get_home_dir() -> Result<Utf8PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Ok(Utf8PathBuf::from(home));
    }

    let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
    Utf8PathBuf::from_path_buf(home)
        .map_err(|p| Error::invalid_config(format!("Home directory is not UTF-8: {}", p.display())))
}

/// Default Metalyzr state directory (`~/.metalyzr`)
pub fn default_state_dir() -> Result<Utf8PathBuf> {
    Ok(get_home_dir()?.join(".metalyzr"))
}
