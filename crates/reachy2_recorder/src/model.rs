//! Kinematic model loaded from a URDF file.
//!
//! Joints are indexed by name at load time. The recorder overwrites joint
//! origin rotations in place every tick; the model is never written back.

use crate::error::{RecorderError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Joint of the model, with a mutable origin
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    pub joint_type: urdf_rs::JointType,
    pub parent: String,
    pub child: String,
    /// Origin translation in meters
    pub xyz: [f64; 3],
    /// Origin rotation as fixed-axis roll, pitch, yaw in radians
    pub rpy: [f64; 3],
}

impl Joint {
    fn from_urdf(joint: &urdf_rs::Joint) -> Self {
        Self {
            name: joint.name.clone(),
            joint_type: joint.joint_type.clone(),
            parent: joint.parent.link.clone(),
            child: joint.child.link.clone(),
            xyz: [joint.origin.xyz[0], joint.origin.xyz[1], joint.origin.xyz[2]],
            rpy: [joint.origin.rpy[0], joint.origin.rpy[1], joint.origin.rpy[2]],
        }
    }

    /// Origin rotation as an `[x, y, z, w]` quaternion
    pub fn quaternion(&self) -> [f64; 4] {
        rpy_to_quaternion(self.rpy)
    }
}

/// Link of the model with its visual elements
#[derive(Debug, Clone)]
pub struct Link {
    pub name: String,
    pub visuals: Vec<urdf_rs::Visual>,
}

/// Joint and link tree of a robot
#[derive(Debug, Clone)]
pub struct KinematicModel {
    name: String,
    root: String,
    joints: Vec<Joint>,
    links: Vec<Link>,
    joint_index: HashMap<String, usize>,
    link_index: HashMap<String, usize>,
    /// Child link name to the joint that moves it
    parent_joint: HashMap<String, usize>,
    /// Named material colors, RGBA in [0, 1]
    materials: HashMap<String, [f64; 4]>,
}

impl KinematicModel {
    /// Load a model from a URDF file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_robot(urdf_rs::read_file(path)?)
    }

    /// Load a model from a URDF document
    pub fn parse(urdf: &str) -> Result<Self> {
        Self::from_robot(urdf_rs::read_from_string(urdf)?)
    }

    pub fn from_robot(robot: urdf_rs::Robot) -> Result<Self> {
        let joints: Vec<Joint> = robot.joints.iter().map(Joint::from_urdf).collect();
        let links: Vec<Link> = robot
            .links
            .into_iter()
            .map(|link| Link {
                name: link.name,
                visuals: link.visual,
            })
            .collect();

        let joint_index = joints
            .iter()
            .enumerate()
            .map(|(i, j)| (j.name.clone(), i))
            .collect();
        let link_index = links
            .iter()
            .enumerate()
            .map(|(i, l)| (l.name.clone(), i))
            .collect();
        let parent_joint: HashMap<String, usize> = joints
            .iter()
            .enumerate()
            .map(|(i, j)| (j.child.clone(), i))
            .collect();

        let root = links
            .iter()
            .find(|l| !parent_joint.contains_key(&l.name))
            .map(|l| l.name.clone())
            .ok_or(RecorderError::NoRootLink)?;

        let materials = robot
            .materials
            .iter()
            .filter_map(|m| m.color.as_ref().map(|c| (m.name.clone(), c.rgba.0)))
            .collect();

        Ok(Self {
            name: robot.name,
            root,
            joints,
            links,
            joint_index,
            link_index,
            parent_joint,
            materials,
        })
    }

    /// Robot name from the URDF
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Link that no joint moves
    pub fn root_link(&self) -> &str {
        &self.root
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn joint(&self, name: &str) -> Result<&Joint> {
        self.joint_index
            .get(name)
            .map(|&i| &self.joints[i])
            .ok_or_else(|| RecorderError::UnknownJoint(name.to_string()))
    }

    pub fn joint_mut(&mut self, name: &str) -> Result<&mut Joint> {
        match self.joint_index.get(name) {
            Some(&i) => Ok(&mut self.joints[i]),
            None => Err(RecorderError::UnknownJoint(name.to_string())),
        }
    }

    pub fn link(&self, name: &str) -> Result<&Link> {
        self.link_index
            .get(name)
            .map(|&i| &self.links[i])
            .ok_or_else(|| RecorderError::UnknownLink(name.to_string()))
    }

    /// Overwrite the origin rotation of a joint
    pub fn set_rotation(&mut self, joint: &str, rpy: [f64; 3]) -> Result<()> {
        self.joint_mut(joint)?.rpy = rpy;
        Ok(())
    }

    /// RGBA color of a named material
    pub fn material_color(&self, name: &str) -> Option<[f64; 4]> {
        self.materials.get(name).copied()
    }

    /// Names from the root link down to `link`, alternating links and joints
    pub fn chain_to_link(&self, link: &str) -> Result<Vec<&str>> {
        let link = self.link(link)?.name.as_str();

        let mut chain = vec![link];
        let mut current = link;
        // Each step climbs one joint; more steps than joints means a cycle
        for _ in 0..=self.joints.len() {
            let Some(&i) = self.parent_joint.get(current) else {
                chain.reverse();
                return Ok(chain);
            };
            let joint = &self.joints[i];
            chain.push(joint.name.as_str());
            chain.push(joint.parent.as_str());
            current = joint.parent.as_str();
        }

        Err(RecorderError::UnknownLink(format!(
            "{} (cycle in joint tree)",
            link
        )))
    }

    /// Names from the root link down to the child link of `joint`
    pub fn chain_to_joint(&self, joint: &str) -> Result<Vec<&str>> {
        let child = &self.joint(joint)?.child;
        self.chain_to_link(child)
    }
}

/// Fixed-axis roll, pitch, yaw to an `[x, y, z, w]` quaternion
pub fn rpy_to_quaternion([roll, pitch, yaw]: [f64; 3]) -> [f64; 4] {
    let (sr, cr) = (roll / 2.0).sin_cos();
    let (sp, cp) = (pitch / 2.0).sin_cos();
    let (sy, cy) = (yaw / 2.0).sin_cos();

    [
        sr * cp * cy - cr * sp * sy,
        cr * sp * cy + sr * cp * sy,
        cr * cp * sy - sr * sp * cy,
        cr * cp * cy + sr * sp * sy,
    ]
}
