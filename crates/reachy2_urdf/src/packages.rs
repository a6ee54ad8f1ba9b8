//! ROS package discovery inside a workspace.
//!
//! A package is any directory holding a `package.xml`. The index maps package
//! names to their directories so `package://` URIs found in xacro and URDF
//! files can be resolved without a sourced ROS environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const MANIFEST: &str = "package.xml";
const PACKAGE_SCHEME: &str = "package://";
const FILE_SCHEME: &str = "file://";

/// Package name to package directory
#[derive(Debug, Clone, Default)]
pub struct PackageIndex {
    packages: BTreeMap<String, PathBuf>,
}

impl PackageIndex {
    /// Scan `roots` recursively for `package.xml` manifests.
    ///
    /// Hidden directories are skipped. When two packages share a name, the
    /// first one found wins.
    pub fn discover<P: AsRef<Path>>(roots: &[P]) -> Self {
        let mut packages = BTreeMap::new();

        for root in roots {
            let walker = WalkDir::new(root.as_ref())
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

            for entry in walker.filter_map(|e| e.ok()) {
                if entry.file_name() != MANIFEST {
                    continue;
                }
                let Some(dir) = entry.path().parent() else {
                    continue;
                };
                let name = std::fs::read_to_string(entry.path())
                    .ok()
                    .and_then(|xml| package_name(&xml))
                    .or_else(|| dir.file_name().map(|n| n.to_string_lossy().to_string()));

                if let Some(name) = name {
                    log::debug!("Found ROS package '{}' at {}", name, dir.display());
                    packages.entry(name).or_insert_with(|| dir.to_path_buf());
                }
            }
        }

        Self { packages }
    }

    /// Directory of a package
    pub fn get(&self, name: &str) -> Option<&Path> {
        self.packages.get(name).map(PathBuf::as_path)
    }

    /// Number of packages found
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Package names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    /// Package names with their directories, sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.packages
            .iter()
            .map(|(name, dir)| (name.as_str(), dir.as_path()))
    }

    /// Resolve a resource URI to a filesystem path.
    ///
    /// Supports `package://<pkg>/<path>`, `file://<path>` and plain paths
    /// (relative ones are joined onto `base_dir`). Returns `None` for an
    /// unknown package.
    pub fn resolve_uri(&self, uri: &str, base_dir: &Path) -> Option<PathBuf> {
        if let Some(rest) = uri.strip_prefix(PACKAGE_SCHEME) {
            let (package, relative) = rest.split_once('/').unwrap_or((rest, ""));
            return self.get(package).map(|dir| dir.join(relative));
        }

        let path = Path::new(uri.strip_prefix(FILE_SCHEME).unwrap_or(uri));
        if path.is_absolute() {
            Some(path.to_path_buf())
        } else {
            Some(base_dir.join(path))
        }
    }
}

/// Text of the `<name>` child of the root `<package>` element
fn package_name(manifest: &str) -> Option<String> {
    let doc = match roxmltree::Document::parse(manifest) {
        Ok(doc) => doc,
        Err(e) => {
            log::debug!("Invalid package manifest: {}", e);
            return None;
        }
    };

    let root = doc.root_element();
    if !root.has_tag_name("package") {
        return None;
    }
    let name = root
        .children()
        .find(|n| n.has_tag_name("name"))?
        .text()?
        .trim();
    (!name.is_empty()).then(|| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_package(root: &Path, dir: &str, name: &str) {
        let path = root.join(dir);
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(
            path.join(MANIFEST),
            format!("<?xml version=\"1.0\"?>\n<package format=\"3\">\n  <name> {name} </name>\n</package>\n"),
        )
        .unwrap();
    }

    #[test]
    fn test_package_name() {
        assert_eq!(
            package_name("<package><name>reachy_description</name></package>"),
            Some("reachy_description".to_string())
        );
        assert_eq!(package_name("<package></package>"), None);
        assert_eq!(package_name("<package><name>  </name></package>"), None);
        assert_eq!(package_name("<robot><name>arm</name></robot>"), None);
        assert_eq!(package_name("<package><name>broken</package>"), None);
    }

    #[test]
    fn test_package_name_ignores_comments() {
        let manifest = "<?xml version=\"1.0\"?>\n\
            <!-- forked from <name>upstream_description</name> -->\n\
            <package format=\"3\">\n\
              <!-- <name>old_name</name> -->\n\
              <name>reachy_description</name>\n\
              <version>1.0.0</version>\n\
            </package>\n";
        assert_eq!(package_name(manifest), Some("reachy_description".to_string()));
    }

    #[test]
    fn test_package_name_skips_nested_name() {
        let manifest = "<package><export><name>plugin</name></export><name>reachy_bringup</name></package>";
        assert_eq!(package_name(manifest), Some("reachy_bringup".to_string()));
    }

    #[test]
    fn test_discover_nested_packages() {
        let dir = tempdir().unwrap();
        write_package(dir.path(), "reachy2_core/reachy_description", "reachy_description");
        write_package(dir.path(), "reachy2_core/reachy_bringup", "reachy_bringup");
        write_package(dir.path(), ".hidden/shadow", "shadow");

        let index = PackageIndex::discover(&[dir.path()]);
        assert_eq!(index.len(), 2);
        assert_eq!(
            index.names().collect::<Vec<_>>(),
            vec!["reachy_bringup", "reachy_description"]
        );
        assert!(index
            .get("reachy_description")
            .unwrap()
            .ends_with("reachy2_core/reachy_description"));
        assert!(index.get("shadow").is_none());
    }

    #[test]
    fn test_resolve_uri() {
        let dir = tempdir().unwrap();
        write_package(dir.path(), "src/reachy_description", "reachy_description");
        let index = PackageIndex::discover(&[dir.path()]);
        let base = Path::new("/robots/urdf");

        let mesh = index
            .resolve_uri("package://reachy_description/meshes/torso.dae", base)
            .unwrap();
        assert!(mesh.ends_with("src/reachy_description/meshes/torso.dae"));

        assert_eq!(index.resolve_uri("package://unknown/mesh.stl", base), None);
        assert_eq!(
            index.resolve_uri("file:///opt/meshes/arm.stl", base),
            Some(PathBuf::from("/opt/meshes/arm.stl"))
        );
        assert_eq!(
            index.resolve_uri("meshes/arm.stl", base),
            Some(PathBuf::from("/robots/urdf/meshes/arm.stl"))
        );
    }

    #[test]
    fn test_discover_missing_root() {
        assert!(PackageIndex::discover(&["/nonexistent/ros_ws"]).is_empty());
    }
}
