//! Lookup of named camera config files under a search root.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Extension of camera config files
pub const CONFIG_EXTENSION: &str = "json";

/// Environment variable overriding the default search root
pub const CONFIG_DIR_ENV: &str = "REACHY2_CAMERA_CONFIG_DIR";

/// Search root used when none is given on the command line.
///
/// Resolution order:
/// 1. `REACHY2_CAMERA_CONFIG_DIR` env var
/// 2. The `config_files` directory shipped with this crate
pub fn default_search_root() -> PathBuf {
    std::env::var_os(CONFIG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("config_files"))
}

/// Files under `root`, recursively, in sorted traversal order.
///
/// Unreadable entries (including a missing root) are skipped.
fn files(root: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
}

fn stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

fn is_config(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(CONFIG_EXTENSION)
}

/// Names (file stems) of every config file found under `search_root`.
pub fn list_available(search_root: impl AsRef<Path>) -> Vec<String> {
    files(search_root.as_ref())
        .filter(|entry| is_config(entry.path()))
        .filter_map(|entry| stem(entry.path()).map(str::to_string))
        .collect()
}

/// Path of the file under `search_root` whose stem is `name`.
///
/// The first `.json` match in traversal order wins; files with another
/// extension are only returned when no `.json` file carries that name.
/// `None` means no such file; it is not an error.
pub fn resolve_path(name: &str, search_root: impl AsRef<Path>) -> Option<PathBuf> {
    let mut fallback = None;
    let mut found = None;
    for entry in files(search_root.as_ref()).filter(|entry| stem(entry.path()) == Some(name)) {
        if is_config(entry.path()) {
            found = Some(entry.into_path());
            break;
        }
        if fallback.is_none() {
            fallback = Some(entry.into_path());
        }
    }

    let found = found.or(fallback)?;
    Some(found.canonicalize().unwrap_or(found))
}
