//! Reachy 2 joint pose recorder.
//!
//! Polls a live robot at a fixed rate, drives the joints of its URDF model
//! from the readings and publishes the resulting poses, gripper openings and
//! optional camera streams to a rerun recording.

pub mod cameras;
mod error;
pub mod joints;
pub mod model;
pub mod recorder;
pub mod robot;
pub mod urdf_logger;

pub use error::{RecorderError, Result};
pub use model::KinematicModel;
pub use recorder::{check_robot, Recorder, RecorderConfig, DEFAULT_REC_FREQ, TORSO_ENTITY};
pub use robot::{Robot, ZenohRobot};
pub use urdf_logger::UrdfLogger;

/// Rerun application id
pub const APPLICATION_ID: &str = "recorder_example";

/// Timeline of robot time
pub const TIMELINE: &str = "reachy_ROS_time";
