use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info, warn};

use crate::error::Result;

/// `NN-name`: two digits, a dash, then at least one word character.
pub fn is_hook_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    bytes.len() >= 4
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2] == b'-'
        && (bytes[3].is_ascii_alphanumeric() || bytes[3] == b'_')
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path).map_or(false, |meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Hooks in `dir`, in the order they run.
pub fn list_hooks(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut hooks: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|e| e.path())
        .filter(|p| p.file_name().and_then(|n| n.to_str()).map_or(false, is_hook_name))
        .filter(|p| is_executable(p))
        .collect();
    hooks.sort();
    Ok(hooks)
}

/// Run every hook with `"true"`/`"false"` for the light variant.
///
/// Output is discarded. A hook that fails to start or exits non-zero is
/// logged and the remaining hooks still run. Returns how many succeeded.
pub fn run_hooks(dir: &Path, light: bool) -> Result<usize> {
    if !dir.is_dir() {
        debug!("no hooks directory at {}", dir.display());
        return Ok(0);
    }

    let mode = if light { "true" } else { "false" };
    let mut succeeded = 0;
    for hook in list_hooks(dir)? {
        let status = Command::new(&hook)
            .arg(mode)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(s) if s.success() => {
                info!("hook {} finished", hook.display());
                succeeded += 1;
            }
            Ok(s) => warn!("hook {} exited with {}", hook.display(), s),
            Err(e) => warn!("hook {} could not be started: {}", hook.display(), e),
        }
    }
    Ok(succeeded)
}
