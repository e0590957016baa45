//! Profile search path resolution for the CLI
//!
//! Directories given on the command line come first, then the per-user
//! profile directory. Built-in profiles are served by the core after all of
//! these miss.

use anyhow::{anyhow, Result};
use std::path::PathBuf;

/// Per-user profile directory (~/.local/share/verifyflow/profiles on Unix)
pub fn user_profile_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let base = dirs::data_local_dir()
            .ok_or_else(|| anyhow!("Could not determine local data directory"))?;
        Ok(base.join("verifyflow").join("profiles"))
    }

    #[cfg(not(windows))]
    {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Ok(home
            .join(".local")
            .join("share")
            .join("verifyflow")
            .join("profiles"))
    }
}

/// Ordered search directories: CLI-given ones, then the user directory.
///
/// Missing directories are dropped; duplicates keep their first position.
pub fn resolve_search_dirs(cli_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut resolved: Vec<PathBuf> = Vec::new();
    let user_dir = user_profile_dir().ok();

    for dir in cli_dirs.iter().cloned().chain(user_dir) {
        if dir.is_dir() && !resolved.contains(&dir) {
            resolved.push(dir);
        }
    }
    resolved
}
