//! Camera rig configuration for Reachy 2.
//!
//! A camera config is a small JSON file describing which physical socket
//! carries which camera, and whether the images are inverted, fisheye or
//! monochrome. Config files are looked up by name under a search root.

mod config;
mod discovery;

pub use config::{CameraConfig, CameraFlag, ConfigError, REQUIRED_FIELDS};
pub use discovery::{
    default_search_root, list_available, resolve_path, CONFIG_DIR_ENV, CONFIG_EXTENSION,
};

/// Resolve `name` under `search_root` and load it.
///
/// Returns `Ok(None)` when no file carries that name.
pub fn load_named(
    name: &str,
    search_root: impl AsRef<std::path::Path>,
) -> Result<Option<CameraConfig>, ConfigError> {
    match resolve_path(name, search_root) {
        Some(path) => CameraConfig::from_file(path).map(Some),
        None => Ok(None),
    }
}
