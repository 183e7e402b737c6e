//! Detection of the directory the running program was installed in.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::debug;

use crate::error::{Error, Result};

static PROGRAM_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the install directory for an executable at `exe`.
///
/// That is the directory containing the executable, except inside a cargo
/// `target` tree (`target/<profile>/` or `target/<profile>/deps/`), where the
/// project directory holding `target` is returned instead.
pub fn resolve_program_dir(exe: &Path) -> PathBuf {
    let dir = exe.parent().unwrap_or(Path::new(""));

    let mut candidate = dir;
    if candidate.file_name().is_some_and(|name| name == "deps") {
        candidate = candidate.parent().unwrap_or(candidate);
    }

    if let Some(target) = candidate.parent() {
        if target.file_name().is_some_and(|name| name == "target") {
            if let Some(project) = target.parent() {
                return project.to_path_buf();
            }
        }
    }

    dir.to_path_buf()
}

/// Install directory of the running program.
///
/// Resolved from [`std::env::current_exe`] on first use and cached for the
/// rest of the process.
pub fn program_dir() -> Result<PathBuf> {
    if let Some(dir) = PROGRAM_DIR.get() {
        return Ok(dir.clone());
    }

    let exe = std::env::current_exe().map_err(|e| Error::ProgramDir(e.to_string()))?;
    let dir = resolve_program_dir(&exe);
    debug!("Program directory resolved to {}", dir.display());

    Ok(PROGRAM_DIR.get_or_init(|| dir).clone())
}
