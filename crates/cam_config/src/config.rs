use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Keys every camera config file must define
pub const REQUIRED_FIELDS: [&str; 4] = ["socket_to_name", "inverted", "fisheye", "mono"];

/// A boolean camera option, either rig-wide or given per camera name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CameraFlag {
    /// Same value for every camera of the rig
    All(bool),
    /// Value keyed by camera name, in file order
    PerCamera(IndexMap<String, bool>),
}

impl CameraFlag {
    /// Value of the flag for one camera (`None` if a per-camera map omits it)
    pub fn for_camera(&self, name: &str) -> Option<bool> {
        match self {
            CameraFlag::All(value) => Some(*value),
            CameraFlag::PerCamera(values) => values.get(name).copied(),
        }
    }
}

fn py_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

impl fmt::Display for CameraFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraFlag::All(value) => f.write_str(py_bool(*value)),
            CameraFlag::PerCamera(values) => {
                f.write_str("{")?;
                for (i, (name, value)) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{}': {}", name, py_bool(*value))?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Camera rig configuration loaded from a JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Physical socket identifier to human readable camera name
    pub socket_to_name: IndexMap<String, String>,
    /// Whether images are flipped upside down
    pub inverted: CameraFlag,
    /// Whether the lens is a fisheye
    pub fisheye: CameraFlag,
    /// Whether the sensor is monochrome
    pub mono: CameraFlag,
}

impl CameraConfig {
    /// Load a camera configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    /// Parse a camera configuration from a JSON string
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| ConfigError::ParseError("expected a JSON object".to_string()))?;
        if let Some(missing) = REQUIRED_FIELDS.iter().find(|k| !object.contains_key(**k)) {
            return Err(ConfigError::MissingField(missing));
        }

        serde_json::from_value(value).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Camera names in socket order
    pub fn camera_names(&self) -> impl Iterator<Item = &str> {
        self.socket_to_name.values().map(String::as_str)
    }
}

impl fmt::Display for CameraConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Camera Config: ")?;
        writeln!(f, "Inverted: {}", self.inverted)?;
        writeln!(f, "Fisheye: {}", self.fisheye)?;
        writeln!(f, "Mono: {}", self.mono)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "socket_to_name": {"CAM_B": "right", "CAM_C": "left"},
            "inverted": false,
            "fisheye": true,
            "mono": false
        }"#;
        let config = CameraConfig::parse(json).unwrap();
        assert_eq!(config.socket_to_name.len(), 2);
        assert_eq!(config.socket_to_name["CAM_B"], "right");
        assert_eq!(config.inverted, CameraFlag::All(false));
        assert_eq!(config.fisheye, CameraFlag::All(true));
        assert_eq!(config.camera_names().collect::<Vec<_>>(), vec!["right", "left"]);
    }

    #[test]
    fn test_parse_config_per_camera_flags() {
        let json = r#"{
            "socket_to_name": {"CAM_A": "color", "CAM_B": "right"},
            "inverted": false,
            "fisheye": false,
            "mono": {"color": false, "right": true}
        }"#;
        let config = CameraConfig::parse(json).unwrap();
        assert_eq!(config.mono.for_camera("right"), Some(true));
        assert_eq!(config.mono.for_camera("color"), Some(false));
        assert_eq!(config.mono.for_camera("left"), None);
        assert_eq!(config.inverted.for_camera("left"), Some(false));
    }

    #[test]
    fn test_to_string() {
        let json = r#"{"socket_to_name": {"0": "front"}, "inverted": false, "fisheye": true, "mono": false}"#;
        let rendered = CameraConfig::parse(json).unwrap().to_string();
        assert!(rendered.starts_with("Camera Config: \n"));
        assert!(rendered.contains("Inverted: False"));
        assert!(rendered.contains("Fisheye: True"));
        assert!(rendered.contains("Mono: False"));
    }

    #[test]
    fn test_to_string_per_camera_map_keeps_file_order() {
        let json = r#"{"socket_to_name": {}, "inverted": false, "fisheye": false,
                       "mono": {"right": true, "left": false}}"#;
        let rendered = CameraConfig::parse(json).unwrap().to_string();
        assert!(rendered.contains("Mono: {'right': True, 'left': False}"));
    }

    #[test]
    fn test_missing_field() {
        let json = r#"{"socket_to_name": {}, "inverted": false, "fisheye": true}"#;
        let err = CameraConfig::parse(json).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("mono")));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            CameraConfig::parse("{not json"),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            CameraConfig::parse("[1, 2]"),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_wrong_field_type() {
        let json = r#"{"socket_to_name": {}, "inverted": "yes", "fisheye": true, "mono": false}"#;
        assert!(matches!(
            CameraConfig::parse(json),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = CameraConfig::from_file("/nonexistent/camera.json").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
