//! Mapping of robot readings onto URDF joints.
//!
//! Each reading drives one rotation component of one joint origin. The
//! tables below are calibration data for the Reachy 2 description and are
//! kept as-is.

use crate::error::Result;
use crate::model::KinematicModel;
use crate::robot::{Robot, Side};

/// Rotation axis of a joint origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Roll, pitch, yaw triple rotating `angle` around this axis only
    pub fn rotation(&self, angle: f64) -> [f64; 3] {
        match self {
            Axis::X => [angle, 0.0, 0.0],
            Axis::Y => [0.0, angle, 0.0],
            Axis::Z => [0.0, 0.0, angle],
        }
    }
}

/// One joint driven by one entry of a position reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JointMapping {
    pub joint: &'static str,
    pub axis: Axis,
    /// Index into the reading
    pub index: usize,
}

const fn mapping(joint: &'static str, axis: Axis, index: usize) -> JointMapping {
    JointMapping { joint, axis, index }
}

/// Neck joints, driven by head roll, pitch, yaw
pub const HEAD_JOINTS: [JointMapping; 3] = [
    mapping("neck_roll", Axis::X, 0),
    mapping("neck_pitch", Axis::Y, 1),
    mapping("neck_yaw", Axis::Z, 2),
];

/// Arm joints without their side prefix, driven by the seven arm positions
pub const ARM_JOINTS: [JointMapping; 7] = [
    mapping("shoulder_pitch", Axis::Y, 0),
    mapping("shoulder_roll", Axis::X, 1),
    mapping("elbow_pitch", Axis::Y, 3),
    mapping("elbow_yaw", Axis::Z, 2),
    mapping("wrist_roll", Axis::X, 4),
    mapping("wrist_pitch", Axis::Y, 5),
    mapping("wrist_yaw", Axis::Z, 6),
];

/// Finger rotation at full opening or closing, from the URDF limits
pub const GRIPPER_SCALE: f64 = 0.4689;

/// Finger joint following the gripper opening
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerMapping {
    /// Joint name without its side prefix
    pub joint: &'static str,
    /// Sign applied to the scaled opening
    pub sign: f64,
    /// Constant yaw of the joint origin
    pub yaw: f64,
}

/// Finger joints of a gripper (visual rendering only)
pub const FINGER_JOINTS: [FingerMapping; 4] = [
    FingerMapping {
        joint: "hand_finger_proximal",
        sign: -1.0,
        yaw: 0.0,
    },
    FingerMapping {
        joint: "hand_finger_distal",
        sign: 1.0,
        yaw: 0.0,
    },
    FingerMapping {
        joint: "hand_finger_proximal_mimic",
        sign: -1.0,
        yaw: std::f64::consts::PI,
    },
    FingerMapping {
        joint: "hand_finger_distal_mimic",
        sign: 1.0,
        yaw: 0.0,
    },
];

/// Gripper opening from [0, 100] percent to [-1, 1]
pub fn scaled_opening(opening: f64) -> f64 {
    opening / 100.0 * 2.0 - 1.0
}

impl FingerMapping {
    /// Origin rotation of this finger for a gripper opening in percent
    pub fn rotation(&self, opening: f64) -> [f64; 3] {
        [scaled_opening(opening) * (self.sign * GRIPPER_SCALE), 0.0, self.yaw]
    }
}

/// Name of a sided joint (`l_wrist_yaw`, `r_hand_finger_distal`)
pub fn sided(side: Side, joint: &str) -> String {
    format!("{}_{}", side.prefix(), joint)
}

/// One polling tick of robot readings
#[derive(Debug, Clone, PartialEq)]
pub struct JointSample {
    /// Robot time of the readings, in nanoseconds
    pub timestamp_ns: i64,
    /// Neck roll, pitch, yaw in radians
    pub head: [f64; 3],
    pub l_arm: [f64; 7],
    pub r_arm: [f64; 7],
    /// Gripper openings in percent
    pub l_gripper: f64,
    pub r_gripper: f64,
}

impl JointSample {
    /// Read every limb from the robot
    pub fn read<R: Robot + ?Sized>(robot: &R) -> Result<Self> {
        let timestamp_ns = robot.update_timestamp_ns()?;
        let head = robot.head_positions_deg()?.map(f64::to_radians);
        Ok(Self {
            timestamp_ns,
            head,
            l_arm: robot.arm_positions_rad(Side::Left)?,
            r_arm: robot.arm_positions_rad(Side::Right)?,
            l_gripper: robot.gripper_opening(Side::Left)?,
            r_gripper: robot.gripper_opening(Side::Right)?,
        })
    }

    pub fn arm(&self, side: Side) -> &[f64; 7] {
        match side {
            Side::Left => &self.l_arm,
            Side::Right => &self.r_arm,
        }
    }

    pub fn gripper(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.l_gripper,
            Side::Right => self.r_gripper,
        }
    }
}

/// Set the neck joints; returns the updated joint names
pub fn apply_head(model: &mut KinematicModel, rpy: &[f64; 3]) -> Result<Vec<String>> {
    HEAD_JOINTS
        .iter()
        .map(|m| {
            model.set_rotation(m.joint, m.axis.rotation(rpy[m.index]))?;
            Ok(m.joint.to_string())
        })
        .collect()
}

/// Set the joints of one arm; returns the updated joint names
pub fn apply_arm(model: &mut KinematicModel, side: Side, positions: &[f64; 7]) -> Result<Vec<String>> {
    ARM_JOINTS
        .iter()
        .map(|m| {
            let name = sided(side, m.joint);
            model.set_rotation(&name, m.axis.rotation(positions[m.index]))?;
            Ok(name)
        })
        .collect()
}

/// Set the finger joints of one gripper; returns the updated joint names
pub fn apply_gripper(model: &mut KinematicModel, side: Side, opening: f64) -> Result<Vec<String>> {
    FINGER_JOINTS
        .iter()
        .map(|f| {
            let name = sided(side, f.joint);
            model.set_rotation(&name, f.rotation(opening))?;
            Ok(name)
        })
        .collect()
}

/// Apply a whole sample; returns every updated joint name
pub fn apply_sample(model: &mut KinematicModel, sample: &JointSample) -> Result<Vec<String>> {
    let mut updated = apply_head(model, &sample.head)?;
    for side in Side::BOTH {
        updated.extend(apply_arm(model, side, sample.arm(side))?);
    }
    for side in Side::BOTH {
        updated.extend(apply_gripper(model, side, sample.gripper(side))?);
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gripper_boundaries() {
        assert_eq!(scaled_opening(0.0), -1.0);
        assert_eq!(scaled_opening(100.0), 1.0);
        assert_eq!(scaled_opening(50.0), 0.0);

        let proximal = FINGER_JOINTS[0];
        assert_eq!(proximal.rotation(0.0), [GRIPPER_SCALE, 0.0, 0.0]);
        assert_eq!(proximal.rotation(100.0), [-GRIPPER_SCALE, 0.0, 0.0]);

        let distal = FINGER_JOINTS[1];
        assert_eq!(distal.rotation(0.0), [-0.4689, 0.0, 0.0]);
        assert_eq!(distal.rotation(100.0), [0.4689, 0.0, 0.0]);
    }

    #[test]
    fn test_proximal_mimic_is_flipped() {
        let mimic = FINGER_JOINTS[2];
        assert_eq!(mimic.joint, "hand_finger_proximal_mimic");
        assert_eq!(mimic.rotation(100.0), [-0.4689, 0.0, std::f64::consts::PI]);
    }

    #[test]
    fn test_arm_table() {
        // Elbow yaw reads index 2 and elbow pitch index 3
        let positions = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        let rotations: Vec<_> = ARM_JOINTS
            .iter()
            .map(|m| (m.joint, m.axis.rotation(positions[m.index])))
            .collect();
        assert_eq!(rotations[0], ("shoulder_pitch", [0.0, 0.1, 0.0]));
        assert_eq!(rotations[1], ("shoulder_roll", [0.2, 0.0, 0.0]));
        assert_eq!(rotations[2], ("elbow_pitch", [0.0, 0.4, 0.0]));
        assert_eq!(rotations[3], ("elbow_yaw", [0.0, 0.0, 0.3]));
        assert_eq!(rotations[6], ("wrist_yaw", [0.0, 0.0, 0.7]));
    }

    #[test]
    fn test_sided() {
        assert_eq!(sided(Side::Left, "wrist_yaw"), "l_wrist_yaw");
        assert_eq!(sided(Side::Right, "hand_finger_distal"), "r_hand_finger_distal");
    }
}
