//! Camera calibration and frame logging.

use crate::error::{RecorderError, Result};
use crate::robot::{CameraKind, CameraParameters, CameraView, Robot};
use crate::urdf_logger::UrdfLogger;
use rerun::external::ndarray::{Array1, Array2};
use rerun::RecordingStream;

/// Image stream logged by the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraStream {
    TeleopLeft,
    TeleopRight,
    DepthColor,
    Depth,
}

impl CameraStream {
    pub const TELEOP: [CameraStream; 2] = [CameraStream::TeleopLeft, CameraStream::TeleopRight];
    pub const DEPTH: [CameraStream; 2] = [CameraStream::DepthColor, CameraStream::Depth];

    pub fn kind(&self) -> CameraKind {
        match self {
            CameraStream::TeleopLeft | CameraStream::TeleopRight => CameraKind::Teleop,
            CameraStream::DepthColor | CameraStream::Depth => CameraKind::Depth,
        }
    }

    /// View queried for parameters and frames
    pub fn view(&self) -> CameraView {
        match self {
            CameraStream::TeleopLeft | CameraStream::DepthColor => CameraView::Left,
            CameraStream::TeleopRight => CameraView::Right,
            CameraStream::Depth => CameraView::Depth,
        }
    }

    /// Entity root of the static calibration data
    pub fn info_path(&self) -> &'static str {
        match self {
            CameraStream::TeleopLeft => "/teleop_camera/left/camera_info",
            CameraStream::TeleopRight => "/teleop_camera/right/camera_info",
            CameraStream::DepthColor => "/depth_camera/color/camera_info",
            CameraStream::Depth => "/depth_camera/depth/camera_info",
        }
    }

    /// Optical joint the image is attached to
    pub fn optical_joint(&self) -> &'static str {
        match self {
            CameraStream::TeleopLeft => "left_camera_optical_joint",
            CameraStream::TeleopRight => "right_camera_optical_joint",
            CameraStream::DepthColor => "depth_cam_l_optical_joint",
            CameraStream::Depth => "depth_cam_r_optical_joint",
        }
    }

    /// Distance of the drawn image plane from the camera, in meters
    pub fn image_plane_distance(&self) -> f32 {
        match self.kind() {
            CameraKind::Teleop => 0.7,
            CameraKind::Depth => 0.8,
        }
    }
}

fn tensor_2d(rows: usize, cols: usize, values: &[f64]) -> Result<rerun::Tensor> {
    let array = Array2::from_shape_vec((rows, cols), values.to_vec())
        .map_err(|e| RecorderError::Tensor(e.to_string()))?;
    rerun::Tensor::try_from(array).map_err(|e| RecorderError::Tensor(e.to_string()))
}

fn tensor_1d(values: &[f64]) -> Result<rerun::Tensor> {
    rerun::Tensor::try_from(Array1::from_vec(values.to_vec()))
        .map_err(|e| RecorderError::Tensor(e.to_string()))
}

/// Log the calibration of a stream as static data under its info path
pub fn log_camera_parameters(rec: &RecordingStream, stream: CameraStream, params: &CameraParameters) -> Result<()> {
    let root = stream.info_path();

    rec.log_static(
        format!("{}/height", root),
        &rerun::Scalars::new([f64::from(params.height)]),
    )?;
    rec.log_static(
        format!("{}/width", root),
        &rerun::Scalars::new([f64::from(params.width)]),
    )?;
    rec.log_static(
        format!("{}/distortion_model", root),
        &rerun::TextLog::new(params.distortion_model.as_str()).with_level(rerun::TextLogLevel::INFO),
    )?;

    rec.log_static(format!("{}/D", root), &tensor_1d(&params.d)?)?;
    rec.log_static(format!("{}/K", root), &tensor_2d(3, 3, &params.k)?)?;
    rec.log_static(format!("{}/R", root), &tensor_2d(3, 3, &params.r)?)?;
    rec.log_static(format!("{}/P", root), &tensor_2d(3, 4, &params.p)?)?;

    Ok(())
}

/// Pinhole of a stream from its row-major intrinsics
pub fn pinhole(stream: CameraStream, params: &CameraParameters) -> rerun::Pinhole {
    let k = params.k.map(|v| v as f32);
    let columns = [[k[0], k[3], k[6]], [k[1], k[4], k[7]], [k[2], k[5], k[8]]];

    rerun::Pinhole::new(columns)
        .with_resolution([params.width as f32, params.height as f32])
        .with_image_plane_distance(stream.image_plane_distance())
        .with_camera_xyz(rerun::components::ViewCoordinates::RDF)
}

/// One camera stream with its calibration and image entity
pub struct CameraLogger {
    stream: CameraStream,
    params: CameraParameters,
    image_path: String,
}

impl CameraLogger {
    /// Fetch and log the calibration of `stream`, and locate its optical joint
    pub fn new<R: Robot + ?Sized>(
        robot: &R,
        rec: &RecordingStream,
        urdf: &UrdfLogger,
        stream: CameraStream,
    ) -> Result<Self> {
        let params = robot.camera_parameters(stream.kind(), stream.view())?;
        log_camera_parameters(rec, stream, &params)?;

        let image_path = format!("{}/image", urdf.joint_entity_path(stream.optical_joint())?);
        log::debug!("{:?} images at {}", stream, image_path);

        Ok(Self {
            stream,
            params,
            image_path,
        })
    }

    pub fn stream(&self) -> CameraStream {
        self.stream
    }

    pub fn image_path(&self) -> &str {
        &self.image_path
    }

    /// Log the latest frame at its own capture time
    pub fn log_frame<R: Robot + ?Sized>(&self, robot: &R, rec: &RecordingStream) -> Result<()> {
        match self.stream {
            CameraStream::Depth => {
                let frame = robot.depth_frame()?;
                rec.set_time(
                    crate::TIMELINE,
                    rerun::TimeCell::from_timestamp_nanos_since_epoch(frame.timestamp_ns),
                );
                let format = rerun::components::ImageFormat::depth(
                    [frame.width, frame.height],
                    rerun::datatypes::ChannelDatatype::U16,
                );
                rec.log(
                    self.image_path.as_str(),
                    &rerun::DepthImage::new(frame.to_le_bytes(), format)
                        .with_meter(1000.0)
                        .with_colormap(rerun::components::Colormap::Viridis),
                )?;
            }
            _ => {
                let frame = robot.compressed_frame(self.stream.kind(), self.stream.view())?;
                rec.set_time(
                    crate::TIMELINE,
                    rerun::TimeCell::from_timestamp_nanos_since_epoch(frame.timestamp_ns),
                );
                rec.log(
                    self.image_path.as_str(),
                    &rerun::EncodedImage::from_file_contents(frame.data)
                        .with_media_type(rerun::MediaType::JPEG),
                )?;
            }
        }

        rec.log(self.image_path.as_str(), &pinhole(self.stream, &self.params))?;
        Ok(())
    }
}
