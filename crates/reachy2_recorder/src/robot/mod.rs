//! Access to a live Reachy 2.
//!
//! The recorder only needs a handful of read-only queries, gathered in the
//! [`Robot`] trait. [`ZenohRobot`] implements it against the robot-side zenoh
//! bridge; tests substitute their own implementation.

mod bridge;

pub use bridge::{keys, ZenohRobot, DEFAULT_PORT};

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arm side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// Joint and entity name prefix (`l` / `r`)
    pub fn prefix(&self) -> &'static str {
        match self {
            Side::Left => "l",
            Side::Right => "r",
        }
    }

    /// Arm part name (`l_arm` / `r_arm`)
    pub fn arm(&self) -> &'static str {
        match self {
            Side::Left => "l_arm",
            Side::Right => "r_arm",
        }
    }
}

/// Camera device mounted on the robot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraKind {
    /// Stereo head camera used for teleoperation
    Teleop,
    /// Torso RGB-D camera
    Depth,
}

impl CameraKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraKind::Teleop => "teleop",
            CameraKind::Depth => "depth",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CameraKind::Teleop => "Teleop",
            CameraKind::Depth => "Depth",
        }
    }
}

impl fmt::Display for CameraKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image stream of a camera device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraView {
    Left,
    Right,
    Depth,
}

impl CameraView {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraView::Left => "left",
            CameraView::Right => "right",
            CameraView::Depth => "depth",
        }
    }
}

/// Calibration of one camera stream, as published by ROS `CameraInfo`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraParameters {
    pub height: u32,
    pub width: u32,
    pub distortion_model: String,
    /// Distortion coefficients
    #[serde(rename = "D")]
    pub d: Vec<f64>,
    /// Intrinsic matrix, row-major 3x3
    #[serde(rename = "K")]
    pub k: [f64; 9],
    /// Rectification matrix, row-major 3x3
    #[serde(rename = "R")]
    pub r: [f64; 9],
    /// Projection matrix, row-major 3x4
    #[serde(rename = "P")]
    pub p: [f64; 12],
}

/// Compressed (JPEG) image with its capture time
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub data: Vec<u8>,
    pub timestamp_ns: i64,
}

/// Depth image in millimeters
#[derive(Debug, Clone, PartialEq)]
pub struct DepthFrame {
    pub width: u32,
    pub height: u32,
    /// Row-major depth values
    pub data: Vec<u16>,
    pub timestamp_ns: i64,
}

impl DepthFrame {
    /// Little-endian byte view of the depth values
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

/// Read-only view of the robot needed for recording
pub trait Robot {
    /// Whether the robot answers and reports itself connected
    fn is_connected(&self) -> bool;

    /// Whether a camera device is present and streaming
    fn has_camera(&self, kind: CameraKind) -> bool;

    /// Robot time of the latest state update, in nanoseconds
    fn update_timestamp_ns(&self) -> Result<i64>;

    /// Neck roll, pitch, yaw in degrees
    fn head_positions_deg(&self) -> Result<[f64; 3]>;

    /// Seven arm joint positions in radians
    fn arm_positions_rad(&self, side: Side) -> Result<[f64; 7]>;

    /// Gripper opening in percent (0 closed, 100 open)
    fn gripper_opening(&self, side: Side) -> Result<f64>;

    fn camera_parameters(&self, kind: CameraKind, view: CameraView) -> Result<CameraParameters>;

    fn compressed_frame(&self, kind: CameraKind, view: CameraView) -> Result<Frame>;

    fn depth_frame(&self) -> Result<DepthFrame>;
}
