//! Throwaway ament prefix exposing source packages to ROS 2 tools.
//!
//! ROS 2 xacro resolves `$(find pkg)` through the ament resource index found
//! on `AMENT_PREFIX_PATH`, so an unbuilt workspace is invisible to it. The
//! prefix built here registers every indexed package with an empty marker
//! under `share/ament_index/resource_index/packages/` and links
//! `share/<pkg>` to the package source directory.

use crate::error::Result;
use crate::packages::PackageIndex;
use std::path::Path;
use tempfile::TempDir;

/// Resource index directory of package markers, relative to a prefix
pub const PACKAGES_RESOURCE_DIR: &str = "share/ament_index/resource_index/packages";

/// Temporary install prefix; removed when dropped
#[derive(Debug)]
pub struct AmentPrefix {
    dir: TempDir,
}

impl AmentPrefix {
    /// Build a prefix registering every package of `index`
    pub fn create(index: &PackageIndex) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix("reachy2_ament_").tempdir()?;
        let markers = dir.path().join(PACKAGES_RESOURCE_DIR);
        std::fs::create_dir_all(&markers)?;
        let share = dir.path().join("share");

        for (name, package_dir) in index.iter() {
            std::fs::write(markers.join(name), "")?;
            let target = package_dir
                .canonicalize()
                .unwrap_or_else(|_| package_dir.to_path_buf());
            link_dir(&target, &share.join(name))?;
        }

        log::debug!(
            "Ament prefix with {} packages at {}",
            index.len(),
            dir.path().display()
        );
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(unix)]
fn link_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn link_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_prefix_registers_packages() {
        let ws = tempdir().unwrap();
        let description = ws.path().join("src/reachy_description");
        std::fs::create_dir_all(description.join("urdf")).unwrap();
        std::fs::write(
            description.join("package.xml"),
            "<package><name>reachy_description</name></package>",
        )
        .unwrap();
        std::fs::write(description.join("urdf/reachy.urdf.xacro"), "<robot/>").unwrap();

        let index = PackageIndex::discover(&[ws.path()]);
        let prefix = AmentPrefix::create(&index).unwrap();

        assert!(prefix
            .path()
            .join(PACKAGES_RESOURCE_DIR)
            .join("reachy_description")
            .is_file());
        assert_eq!(
            std::fs::read_to_string(
                prefix
                    .path()
                    .join("share/reachy_description/urdf/reachy.urdf.xacro")
            )
            .unwrap(),
            "<robot/>"
        );

        let path = prefix.path().to_path_buf();
        drop(prefix);
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_index() {
        let prefix = AmentPrefix::create(&PackageIndex::default()).unwrap();
        let markers = prefix.path().join(PACKAGES_RESOURCE_DIR);
        assert_eq!(std::fs::read_dir(markers).unwrap().count(), 0);
    }
}
