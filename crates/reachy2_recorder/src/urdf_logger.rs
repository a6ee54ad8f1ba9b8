//! Logging of a kinematic model into a rerun recording.
//!
//! Every link and joint gets an entity under a fixed prefix, following the
//! chain from the root link (`<prefix>/world/world_joint/base_link/...`).
//! Joints are logged as transforms, link visuals as static geometry.

use crate::error::Result;
use crate::model::{Joint, KinematicModel};
use reachy2_urdf::PackageIndex;
use rerun::RecordingStream;
use std::path::{Path, PathBuf};

/// Mesh formats rerun can display
const MESH_EXTENSIONS: [&str; 4] = ["glb", "gltf", "obj", "stl"];

/// Owns the model and logs it under an entity prefix
pub struct UrdfLogger {
    model: KinematicModel,
    prefix: String,
    packages: PackageIndex,
    /// Directory of the URDF file, for relative mesh paths
    base_dir: PathBuf,
}

impl UrdfLogger {
    /// Load `urdf_path` and root its entities at `prefix`
    pub fn from_file(urdf_path: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let urdf_path = urdf_path.as_ref();
        let model = KinematicModel::from_file(urdf_path)?;
        let base_dir = urdf_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        log::info!(
            "Loaded URDF '{}' ({} joints, {} links)",
            model.name(),
            model.joints().len(),
            model.links().len()
        );
        Ok(Self::new(model, prefix).with_base_dir(base_dir))
    }

    pub fn new(model: KinematicModel, prefix: &str) -> Self {
        Self {
            model,
            prefix: prefix.trim_matches('/').to_string(),
            packages: PackageIndex::default(),
            base_dir: PathBuf::new(),
        }
    }

    /// Packages used to resolve `package://` mesh URIs
    pub fn with_packages(mut self, packages: PackageIndex) -> Self {
        self.packages = packages;
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    pub fn model(&self) -> &KinematicModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut KinematicModel {
        &mut self.model
    }

    fn prefixed(&self, chain: &[&str]) -> String {
        let path = chain.join("/");
        if self.prefix.is_empty() {
            path
        } else {
            format!("{}/{}", self.prefix, path)
        }
    }

    /// Entity path of a joint (the chain down to its child link)
    pub fn joint_entity_path(&self, joint: &str) -> Result<String> {
        Ok(self.prefixed(&self.model.chain_to_joint(joint)?))
    }

    /// Entity path of a link
    pub fn link_entity_path(&self, link: &str) -> Result<String> {
        Ok(self.prefixed(&self.model.chain_to_link(link)?))
    }

    /// Log the current origin of a joint
    pub fn log_joint(&self, rec: &RecordingStream, joint: &str) -> Result<()> {
        let entity_path = self.joint_entity_path(joint)?;
        rec.log(entity_path, &joint_transform(self.model.joint(joint)?))?;
        Ok(())
    }

    /// Log every joint transform and, once, every link visual
    pub fn log(&self, rec: &RecordingStream) -> Result<()> {
        for link in self.model.links() {
            self.log_link_visuals(rec, &link.name)?;
        }
        for joint in self.model.joints() {
            self.log_joint(rec, &joint.name)?;
        }
        Ok(())
    }

    fn log_link_visuals(&self, rec: &RecordingStream, link: &str) -> Result<()> {
        let link_path = self.link_entity_path(link)?;

        for (i, visual) in self.model.link(link)?.visuals.iter().enumerate() {
            let entity_path = format!("{}/visual_{}", link_path, i);
            let color = visual
                .material
                .as_ref()
                .and_then(|m| {
                    m.color
                        .as_ref()
                        .map(|c| c.rgba.0)
                        .or_else(|| self.model.material_color(&m.name))
                })
                .map(to_color);

            let origin = &visual.origin;
            let mut transform = pose_transform(
                [origin.xyz[0], origin.xyz[1], origin.xyz[2]],
                [origin.rpy[0], origin.rpy[1], origin.rpy[2]],
            );

            match &visual.geometry {
                urdf_rs::Geometry::Box { size } => {
                    rec.log_static(entity_path.as_str(), &transform)?;
                    let mut boxes = rerun::Boxes3D::from_sizes([[
                        size[0] as f32,
                        size[1] as f32,
                        size[2] as f32,
                    ]]);
                    if let Some(color) = color {
                        boxes = boxes.with_colors([color]);
                    }
                    rec.log_static(entity_path.as_str(), &boxes)?;
                }
                urdf_rs::Geometry::Cylinder { radius, length } => {
                    rec.log_static(entity_path.as_str(), &transform)?;
                    let mut cylinders =
                        rerun::Cylinders3D::from_lengths_and_radii([*length as f32], [*radius as f32]);
                    if let Some(color) = color {
                        cylinders = cylinders.with_colors([color]);
                    }
                    rec.log_static(entity_path.as_str(), &cylinders)?;
                }
                urdf_rs::Geometry::Sphere { radius } => {
                    rec.log_static(entity_path.as_str(), &transform)?;
                    let r = *radius as f32;
                    let mut spheres = rerun::Ellipsoids3D::from_half_sizes([[r, r, r]]);
                    if let Some(color) = color {
                        spheres = spheres.with_colors([color]);
                    }
                    rec.log_static(entity_path.as_str(), &spheres)?;
                }
                urdf_rs::Geometry::Mesh { filename, scale } => {
                    let Some(path) = self.packages.resolve_uri(filename, &self.base_dir) else {
                        log::warn!("Cannot resolve mesh '{}' of link '{}'", filename, link);
                        continue;
                    };
                    if !is_displayable_mesh(&path) {
                        log::warn!("Skipping unsupported mesh format: {}", path.display());
                        continue;
                    }
                    let contents = match std::fs::read(&path) {
                        Ok(contents) => contents,
                        Err(e) => {
                            log::warn!("Cannot read mesh {}: {}", path.display(), e);
                            continue;
                        }
                    };

                    if let Some(scale) = scale {
                        transform =
                            transform.with_scale([scale[0] as f32, scale[1] as f32, scale[2] as f32]);
                    }
                    rec.log_static(entity_path.as_str(), &transform)?;

                    let mut asset =
                        rerun::Asset3D::from_file_contents(contents, rerun::MediaType::guess_from_path(&path));
                    if let Some(color) = color {
                        asset = asset.with_albedo_factor(*color);
                    }
                    rec.log_static(entity_path.as_str(), &asset)?;
                }
                #[allow(unreachable_patterns)]
                other => {
                    log::warn!("Skipping unsupported geometry of link '{}': {:?}", link, other);
                }
            }
        }

        Ok(())
    }
}

fn is_displayable_mesh(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| MESH_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn to_color(rgba: [f64; 4]) -> rerun::Color {
    let [r, g, b, a] = rgba.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    rerun::Color::from_unmultiplied_rgba(r, g, b, a)
}

fn pose_transform(xyz: [f64; 3], rpy: [f64; 3]) -> rerun::Transform3D {
    let [qx, qy, qz, qw] = crate::model::rpy_to_quaternion(rpy);
    rerun::Transform3D::from_translation_rotation(
        [xyz[0] as f32, xyz[1] as f32, xyz[2] as f32],
        rerun::Quaternion::from_xyzw([qx as f32, qy as f32, qz as f32, qw as f32]),
    )
}

/// Transform from the parent link to the child link of a joint
pub fn joint_transform(joint: &Joint) -> rerun::Transform3D {
    pose_transform(joint.xyz, joint.rpy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const URDF: &str = r#"<?xml version="1.0"?>
<robot name="mini">
  <link name="world"/>
  <link name="torso">
    <visual>
      <geometry><box size="0.1 0.2 0.3"/></geometry>
    </visual>
  </link>
  <joint name="world_joint" type="fixed">
    <parent link="world"/><child link="torso"/>
  </joint>
</robot>
"#;

    #[test]
    fn test_entity_paths() {
        let model = KinematicModel::parse(URDF).unwrap();
        let logger = UrdfLogger::new(model, "/robot/");
        assert_eq!(
            logger.joint_entity_path("world_joint").unwrap(),
            "robot/world/world_joint/torso"
        );
        assert_eq!(logger.link_entity_path("world").unwrap(), "robot/world");
        assert!(logger.joint_entity_path("neck_roll").is_err());

        let unprefixed = UrdfLogger::new(KinematicModel::parse(URDF).unwrap(), "");
        assert_eq!(unprefixed.link_entity_path("torso").unwrap(), "world/world_joint/torso");
    }

    #[test]
    fn test_is_displayable_mesh() {
        assert!(is_displayable_mesh(Path::new("meshes/arm.STL")));
        assert!(is_displayable_mesh(Path::new("meshes/head.glb")));
        assert!(!is_displayable_mesh(Path::new("meshes/torso.dae")));
        assert!(!is_displayable_mesh(Path::new("meshes/no_extension")));
    }

    #[test]
    fn test_to_color() {
        let color = to_color([1.0, 0.5, 0.0, 2.0]);
        assert_eq!(color, rerun::Color::from_unmultiplied_rgba(255, 128, 0, 255));
    }

    #[test]
    fn test_log_to_memory() {
        let (rec, storage) = rerun::RecordingStreamBuilder::new("urdf_logger_test")
            .memory()
            .unwrap();
        let logger = UrdfLogger::new(KinematicModel::parse(URDF).unwrap(), "robot");
        logger.log(&rec).unwrap();
        let _ = rec.flush_blocking();
        assert!(!storage.take().is_empty());
    }
}
