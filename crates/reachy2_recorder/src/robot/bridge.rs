//! Robot access over zenoh queries.
//!
//! The robot runs a bridge answering queries under `reachy2/`. State and
//! camera parameters are JSON; frames carry the raw image bytes as payload
//! and their metadata as a JSON attachment.

use super::{CameraKind, CameraParameters, CameraView, DepthFrame, Frame, Robot, Side};
use crate::error::{RecorderError, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use zenoh::sample::Sample;
use zenoh::{Session, Wait};

/// Port of the zenoh router running on the robot
pub const DEFAULT_PORT: u16 = 7447;

const QUERY_TIMEOUT: Duration = Duration::from_secs(2);

/// Key expressions served by the robot bridge
pub mod keys {
    use super::{CameraKind, CameraView, Side};

    pub const PREFIX: &str = "reachy2";

    /// Connection state (bool)
    pub const CONNECTED: &str = "reachy2/state/connected";

    /// Latest state update time in nanoseconds (i64)
    pub const UPDATE_TIMESTAMP: &str = "reachy2/state/timestamp";

    /// Neck positions in degrees ([f64; 3])
    pub const HEAD_POSITIONS: &str = "reachy2/head/positions";

    /// Arm positions in radians ([f64; 7])
    pub fn arm_positions(side: Side) -> String {
        format!("{}/{}/positions", PREFIX, side.arm())
    }

    /// Gripper opening in percent (f64)
    pub fn gripper_opening(side: Side) -> String {
        format!("{}/{}/gripper/opening", PREFIX, side.arm())
    }

    /// Camera presence (bool)
    pub fn camera_available(kind: CameraKind) -> String {
        format!("{}/cameras/{}/available", PREFIX, kind)
    }

    /// Camera calibration (`CameraParameters`)
    pub fn camera_parameters(kind: CameraKind, view: CameraView) -> String {
        format!("{}/cameras/{}/{}/parameters", PREFIX, kind, view.as_str())
    }

    /// Latest JPEG frame
    pub fn compressed_frame(kind: CameraKind, view: CameraView) -> String {
        format!("{}/cameras/{}/{}/compressed", PREFIX, kind, view.as_str())
    }

    /// Latest depth frame (little-endian u16 millimeters)
    pub const DEPTH_FRAME: &str = "reachy2/cameras/depth/depth/raw";
}

/// Metadata attached to frame replies
#[derive(Debug, Clone, Default, Deserialize)]
struct FrameMeta {
    timestamp_ns: i64,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

/// Robot reached through its zenoh bridge
pub struct ZenohRobot {
    session: Session,
    timeout: Duration,
}

impl ZenohRobot {
    /// Open a client session to the router at `host`.
    ///
    /// `host` is an IP address or hostname, optionally with a port.
    pub fn connect(host: &str) -> Result<Self> {
        let endpoint = endpoint(host);
        log::info!("Connecting to Reachy at {}", endpoint);

        let mut config = zenoh::Config::default();
        config.insert_json5("mode", "\"client\"")?;
        config.insert_json5("connect/endpoints", &format!("[\"{}\"]", endpoint))?;
        config.insert_json5("scouting/multicast/enabled", "false")?;

        let session = zenoh::open(config).wait()?;

        Ok(Self {
            session,
            timeout: QUERY_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// First successful reply to a query on `key`
    fn query(&self, key: &str) -> Result<Sample> {
        let replies = self.session.get(key).timeout(self.timeout).wait()?;
        let reply = replies
            .recv()
            .map_err(|_| RecorderError::Robot(format!("no reply on '{}'", key)))?;

        reply.into_result().map_err(|err| {
            let reason = err
                .payload()
                .try_to_string()
                .map(|s| s.to_string())
                .unwrap_or_else(|_| "undecodable error".to_string());
            RecorderError::Robot(format!("'{}' failed: {}", key, reason))
        })
    }

    fn query_json<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        let sample = self.query(key)?;
        Ok(serde_json::from_slice(&sample.payload().to_bytes())?)
    }

    /// Payload and decoded attachment of a frame reply
    fn query_frame(&self, key: &str) -> Result<(Vec<u8>, FrameMeta)> {
        let sample = self.query(key)?;
        let meta = match sample.attachment() {
            Some(attachment) => serde_json::from_slice(&attachment.to_bytes())?,
            None => {
                return Err(RecorderError::Robot(format!(
                    "frame on '{}' has no metadata",
                    key
                )))
            }
        };
        Ok((sample.payload().to_bytes().into_owned(), meta))
    }
}

/// Zenoh endpoint for a host, adding the default port when missing
fn endpoint(host: &str) -> String {
    if host.contains("/") {
        return host.to_string();
    }
    if host.parse::<std::net::Ipv6Addr>().is_ok() {
        return format!("tcp/[{}]:{}", host, DEFAULT_PORT);
    }
    if host.parse::<std::net::SocketAddr>().is_ok() {
        return format!("tcp/{}", host);
    }
    if host.starts_with('[') && host.ends_with(']') {
        return format!("tcp/{}:{}", host, DEFAULT_PORT);
    }
    let has_port = match host.rsplit_once(':') {
        Some((addr, port)) => !addr.is_empty() && !addr.contains(':') && port.parse::<u16>().is_ok(),
        None => false,
    };
    if has_port {
        format!("tcp/{}", host)
    } else {
        format!("tcp/{}:{}", host, DEFAULT_PORT)
    }
}

/// Decode little-endian u16 depth values
fn depth_values(bytes: &[u8], meta: &FrameMeta) -> Result<Vec<u16>> {
    let expected = meta.width as usize * meta.height as usize * 2;
    if bytes.len() != expected {
        return Err(RecorderError::Robot(format!(
            "depth frame is {} bytes, expected {} for {}x{}",
            bytes.len(),
            expected,
            meta.width,
            meta.height
        )));
    }
    Ok(bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect())
}

impl Robot for ZenohRobot {
    fn is_connected(&self) -> bool {
        match self.query_json::<bool>(keys::CONNECTED) {
            Ok(connected) => connected,
            Err(e) => {
                log::debug!("Connection check failed: {}", e);
                false
            }
        }
    }

    fn has_camera(&self, kind: CameraKind) -> bool {
        self.query_json::<bool>(&keys::camera_available(kind))
            .unwrap_or(false)
    }

    fn update_timestamp_ns(&self) -> Result<i64> {
        self.query_json(keys::UPDATE_TIMESTAMP)
    }

    fn head_positions_deg(&self) -> Result<[f64; 3]> {
        self.query_json(keys::HEAD_POSITIONS)
    }

    fn arm_positions_rad(&self, side: Side) -> Result<[f64; 7]> {
        self.query_json(&keys::arm_positions(side))
    }

    fn gripper_opening(&self, side: Side) -> Result<f64> {
        self.query_json(&keys::gripper_opening(side))
    }

    fn camera_parameters(&self, kind: CameraKind, view: CameraView) -> Result<CameraParameters> {
        self.query_json(&keys::camera_parameters(kind, view))
    }

    fn compressed_frame(&self, kind: CameraKind, view: CameraView) -> Result<Frame> {
        let (data, meta) = self.query_frame(&keys::compressed_frame(kind, view))?;
        Ok(Frame {
            data,
            timestamp_ns: meta.timestamp_ns,
        })
    }

    fn depth_frame(&self) -> Result<DepthFrame> {
        let (bytes, meta) = self.query_frame(keys::DEPTH_FRAME)?;
        let data = depth_values(&bytes, &meta)?;
        Ok(DepthFrame {
            width: meta.width,
            height: meta.height,
            data,
            timestamp_ns: meta.timestamp_ns,
        })
    }
}
