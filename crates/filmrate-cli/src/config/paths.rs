//! Config file location.

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Application directory name under the user config root.
const APP_DIR: &str = "filmrate";

/// Resolves the config file path.
///
/// - `{dir}/config.toml` when `dir` is given.
/// - `$XDG_CONFIG_HOME/filmrate/config.toml` when that variable is set.
/// - `~/.config/filmrate/config.toml` otherwise.
///
/// # Errors
///
/// Returns an error if neither `dir`, `XDG_CONFIG_HOME` nor `HOME` is available.
pub fn resolve_config_path(dir: Option<&Path>) -> Result<PathBuf> {
    config_path_from(
        dir,
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn config_path_from(
    dir: Option<&Path>,
    xdg_config_home: Option<PathBuf>,
    home: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(d) = dir {
        return Ok(d.join(CONFIG_FILE));
    }
    if let Some(root) = xdg_config_home.filter(|p| p.is_absolute()) {
        return Ok(root.join(APP_DIR).join(CONFIG_FILE));
    }
    match home {
        Some(home) => Ok(home.join(".config").join(APP_DIR).join(CONFIG_FILE)),
        None => bail!("HOME environment variable is not set"),
    }
}
