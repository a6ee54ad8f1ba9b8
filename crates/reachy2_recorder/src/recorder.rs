//! Polling loop publishing the robot pose to rerun.

use crate::cameras::{CameraLogger, CameraStream};
use crate::error::{RecorderError, Result};
use crate::joints::{apply_sample, JointSample};
use crate::robot::{CameraKind, Robot, Side};
use crate::urdf_logger::UrdfLogger;
use crate::TIMELINE;
use reachy2_urdf::PackageIndex;
use rerun::RecordingStream;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// Entity the URDF tree is rooted at
pub const TORSO_ENTITY: &str = "world/world_joint/base_link/back_bar_joint/back_bar/torso_base/torso";

/// Default polling frequency in Hz
pub const DEFAULT_REC_FREQ: u32 = 5;

/// Recording options
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// URDF of the robot
    pub urdf: PathBuf,
    pub teleop_camera: bool,
    pub depth_camera: bool,
    /// Polling frequency in Hz
    pub rec_freq: u32,
    /// ROS workspace used to resolve `package://` meshes
    pub ros_path: Option<PathBuf>,
}

impl RecorderConfig {
    pub fn new(urdf: impl Into<PathBuf>) -> Self {
        Self {
            urdf: urdf.into(),
            teleop_camera: false,
            depth_camera: false,
            rec_freq: DEFAULT_REC_FREQ,
            ros_path: None,
        }
    }

    /// Wait between two ticks
    pub fn period(&self) -> Result<Duration> {
        if self.rec_freq == 0 {
            return Err(RecorderError::InvalidFrequency);
        }
        Ok(Duration::from_secs_f64(1.0 / f64::from(self.rec_freq)))
    }

    /// Camera streams to record
    pub fn streams(&self) -> Vec<CameraStream> {
        let mut streams = Vec::new();
        if self.teleop_camera {
            streams.extend(CameraStream::TELEOP);
        }
        if self.depth_camera {
            streams.extend(CameraStream::DEPTH);
        }
        streams
    }
}

/// Fail unless the robot and every requested camera are available
pub fn check_robot<R: Robot + ?Sized>(robot: &R, config: &RecorderConfig) -> Result<()> {
    if !robot.is_connected() {
        return Err(RecorderError::Disconnected);
    }
    if config.teleop_camera && !robot.has_camera(CameraKind::Teleop) {
        return Err(RecorderError::CameraUnavailable(CameraKind::Teleop));
    }
    if config.depth_camera && !robot.has_camera(CameraKind::Depth) {
        return Err(RecorderError::CameraUnavailable(CameraKind::Depth));
    }
    Ok(())
}

/// Entity of the opening plot of a gripper
pub fn gripper_entity(side: Side) -> String {
    format!("reachy/{}/wrist/gripper", side.arm())
}

fn gripper_series(side: Side) -> rerun::SeriesLines {
    let (color, name) = match side {
        Side::Left => ([255, 0, 0], "left gripper"),
        Side::Right => ([0, 255, 0], "right gripper"),
    };
    rerun::SeriesLines::new()
        .with_colors([color])
        .with_names([name])
        .with_widths([2.0])
}

/// Robot pose publisher
pub struct Recorder<R: Robot> {
    robot: R,
    rec: RecordingStream,
    urdf: UrdfLogger,
    cameras: Vec<CameraLogger>,
    period: Duration,
    ticks: u64,
}

impl<R: Robot> Recorder<R> {
    /// Load the model and log everything static: the initial pose, camera
    /// calibrations and plot styles.
    pub fn new(robot: R, rec: RecordingStream, config: &RecorderConfig) -> Result<Self> {
        let period = config.period()?;

        let mut urdf = UrdfLogger::from_file(&config.urdf, TORSO_ENTITY)?;
        if let Some(ros_path) = &config.ros_path {
            let packages = PackageIndex::discover(&[ros_path]);
            log::info!("Found {} ROS packages in {}", packages.len(), ros_path.display());
            urdf = urdf.with_packages(packages);
        }

        let timestamp_ns = robot.update_timestamp_ns()?;
        rec.set_time(
            TIMELINE,
            rerun::TimeCell::from_timestamp_nanos_since_epoch(timestamp_ns),
        );
        urdf.log(&rec)?;

        let cameras = config
            .streams()
            .into_iter()
            .map(|stream| CameraLogger::new(&robot, &rec, &urdf, stream))
            .collect::<Result<Vec<_>>>()?;

        for side in Side::BOTH {
            rec.log_static(gripper_entity(side), &gripper_series(side))?;
        }

        Ok(Self {
            robot,
            rec,
            urdf,
            cameras,
            period,
            ticks: 0,
        })
    }

    pub fn urdf(&self) -> &UrdfLogger {
        &self.urdf
    }

    pub fn cameras(&self) -> &[CameraLogger] {
        &self.cameras
    }

    /// Completed polling iterations
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Read the robot once and log the new pose and frames
    pub fn tick(&mut self) -> Result<()> {
        let sample = JointSample::read(&self.robot)?;
        self.rec.set_time(
            TIMELINE,
            rerun::TimeCell::from_timestamp_nanos_since_epoch(sample.timestamp_ns),
        );

        let updated = apply_sample(self.urdf.model_mut(), &sample)?;

        for side in Side::BOTH {
            self.rec.log(
                gripper_entity(side),
                &rerun::Scalars::new([sample.gripper(side)]),
            )?;
        }
        for joint in &updated {
            self.urdf.log_joint(&self.rec, joint)?;
        }
        for camera in &self.cameras {
            camera.log_frame(&self.robot, &self.rec)?;
        }

        self.ticks += 1;
        Ok(())
    }

    /// Tick every period until `stop` fires or its sender is dropped
    pub fn run(&mut self, stop: &Receiver<()>) -> Result<()> {
        log::info!(
            "Recording at {:.1} Hz ({} cameras)",
            1.0 / self.period.as_secs_f64(),
            self.cameras.len()
        );

        loop {
            self.tick()?;
            match stop.recv_timeout(self.period) {
                Err(RecvTimeoutError::Timeout) => continue,
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        log::info!("User interrupt");
        log::debug!("Stopped after {} ticks", self.ticks);
        Ok(())
    }
}
