use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const TOOL_DIR: &str = "keyfob";

/// Per-tool configuration directory (e.g. ~/.config/keyfob on Linux).
/// All three credential files live directly under it.
pub fn config_dir() -> Result<PathBuf> {
    let mut dir = dirs::config_dir().ok_or(Error::ConfigDirUnavailable)?;
    dir.push(TOOL_DIR);
    Ok(dir)
}

/// Create the directory if it does not exist yet, owner-only on unix.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        return Ok(());
    }
    create_dir_restrictive(dir).map_err(|source| Error::CreateConfigDir {
        path: dir.to_path_buf(),
        source,
    })
}

#[cfg(unix)]
fn create_dir_restrictive(dir: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
}

#[cfg(not(unix))]
fn create_dir_restrictive(dir: &Path) -> std::io::Result<()> {
    fs::create_dir_all(dir)
}
