//! Reachy 2 URDF generation.
//!
//! The robot description lives in the Reachy 2 ROS workspace as a xacro
//! template. This crate expands it through the external `xacro` executable
//! with the hardware revision bound as `robot_model`, and indexes the ROS
//! packages of the workspace so `package://` resources can be resolved.

mod ament;
pub mod cli;
mod error;
mod packages;
mod xacro;

pub use ament::{AmentPrefix, PACKAGES_RESOURCE_DIR};
pub use error::{Result, UrdfError};
pub use packages::PackageIndex;
pub use xacro::{
    generate, GenerateRequest, RobotModel, XacroProcessor, DEFAULT_OUTPUT,
    DEFAULT_XACRO_TEMPLATE, MODEL_ARG, XACRO_BIN_ENV,
};
