use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

const APPLICATION_DIR_NAME: &str = "kal";
const LEGACY_DIR_NAME: &str = ".kal";

/// Resolves the state directory for kal and makes sure it exists. An existing `~/.kal` from
/// older installs is preferred over the platform state directory.
pub fn create_application_default_path() -> Result<PathBuf> {
    let home = env::var_os("HOME").map(PathBuf::from);

    let path = match home.as_deref().and_then(legacy_dir) {
        Some(path) => path,
        None => {
            #[cfg(windows)]
            {
                let mut path = PathBuf::from(
                    env::var("APPDATA").context("APPDATA should be present on Windows")?,
                );
                path.push(APPLICATION_DIR_NAME);
                path
            }
            #[cfg(not(windows))]
            {
                state_dir(env::var_os("XDG_STATE_HOME").map(PathBuf::from), home)
                    .context("Couldn't find neither XDG_STATE_HOME nor HOME")?
            }
        }
    };

    ensure_dir(path)
}

/// `home/.kal` if it is already a directory.
fn legacy_dir(home: &Path) -> Option<PathBuf> {
    let path = home.join(LEGACY_DIR_NAME);
    path.is_dir().then_some(path)
}

#[cfg_attr(windows, allow(dead_code))]
fn state_dir(xdg_state_home: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    let mut path = xdg_state_home.or_else(|| home.map(|v| v.join(".local/state")))?;
    path.push(APPLICATION_DIR_NAME);
    Some(path)
}

/// Creates `path` (and its parents) unless it's already there.
pub fn ensure_dir(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v).with_context(|| format!("Failed to create directory {path:?}")),
    }
}
