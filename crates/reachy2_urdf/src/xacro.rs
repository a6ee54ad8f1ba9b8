//! Expansion of xacro templates through the external `xacro` executable.

use crate::ament::AmentPrefix;
use crate::error::{Result, UrdfError};
use crate::packages::PackageIndex;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

/// Template location inside the Reachy 2 ROS workspace
pub const DEFAULT_XACRO_TEMPLATE: &str = "reachy2_core/reachy_description/urdf/reachy.urdf.xacro";

/// Default output file
pub const DEFAULT_OUTPUT: &str = "reachy2.urdf";

/// Environment variable overriding the xacro executable
pub const XACRO_BIN_ENV: &str = "XACRO_BIN";

/// Xacro argument selecting the hardware revision
pub const MODEL_ARG: &str = "robot_model";

/// Reachy 2 hardware revision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RobotModel {
    Beta,
    #[default]
    Dvt,
}

impl RobotModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RobotModel::Beta => "beta",
            RobotModel::Dvt => "dvt",
        }
    }
}

impl fmt::Display for RobotModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RobotModel {
    type Err = UrdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "beta" => Ok(RobotModel::Beta),
            "dvt" => Ok(RobotModel::Dvt),
            other => Err(UrdfError::UnknownModel(other.to_string())),
        }
    }
}

/// Runs the `xacro` executable with a set of package search paths
#[derive(Debug, Clone)]
pub struct XacroProcessor {
    program: OsString,
    package_paths: Vec<PathBuf>,
    ament_prefixes: Vec<PathBuf>,
}

impl Default for XacroProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl XacroProcessor {
    /// Use `$XACRO_BIN`, or `xacro` from `PATH`
    pub fn new() -> Self {
        let program = std::env::var_os(XACRO_BIN_ENV).unwrap_or_else(|| OsString::from("xacro"));
        Self::with_program(program)
    }

    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            package_paths: Vec::new(),
            ament_prefixes: Vec::new(),
        }
    }

    /// Register a directory searched for ROS packages
    pub fn look_in(mut self, path: impl Into<PathBuf>) -> Self {
        self.package_paths.push(path.into());
        self
    }

    /// Register an install prefix holding an ament resource index
    pub fn with_ament_prefix(mut self, prefix: impl Into<PathBuf>) -> Self {
        self.ament_prefixes.push(prefix.into());
        self
    }

    /// Search path variable value: `paths` first, then the inherited value of `var`
    fn prepend_env(var: &str, paths: &[PathBuf]) -> Result<OsString> {
        let inherited = std::env::var_os(var);
        let paths = paths
            .iter()
            .cloned()
            .chain(inherited.iter().flat_map(std::env::split_paths));
        std::env::join_paths(paths).map_err(|e| {
            UrdfError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
        })
    }

    /// Build the xacro invocation without running it
    pub fn command(&self, template: &Path, args: &[(&str, &str)]) -> Result<Command> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(template)
            .args(args.iter().map(|(k, v)| format!("{}:={}", k, v)))
            .env(
                "ROS_PACKAGE_PATH",
                Self::prepend_env("ROS_PACKAGE_PATH", &self.package_paths)?,
            )
            .env(
                "AMENT_PREFIX_PATH",
                Self::prepend_env("AMENT_PREFIX_PATH", &self.ament_prefixes)?,
            )
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        Ok(cmd)
    }

    /// Expand `template` and return the resulting document.
    pub fn expand(&self, template: &Path, args: &[(&str, &str)]) -> Result<String> {
        if !template.is_file() {
            return Err(UrdfError::TemplateNotFound(template.to_path_buf()));
        }

        log::info!(
            "Expanding {} with {}",
            template.display(),
            args.iter()
                .map(|(k, v)| format!("{}:={}", k, v))
                .collect::<Vec<_>>()
                .join(" ")
        );

        let output = self
            .command(template, args)?
            .output()
            .map_err(|source| UrdfError::Spawn {
                program: self.program.to_string_lossy().to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(UrdfError::Xacro {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
            log::warn!("xacro: {}", line);
        }

        Ok(String::from_utf8(output.stdout)?)
    }
}

/// Inputs of a URDF generation run
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// Root of the Reachy 2 ROS workspace
    pub ros_path: PathBuf,
    /// Template path, relative paths resolve against `ros_path`
    pub xacro_file: Option<PathBuf>,
    pub model: RobotModel,
    pub output: PathBuf,
}

impl GenerateRequest {
    pub fn new(ros_path: impl Into<PathBuf>) -> Self {
        Self {
            ros_path: ros_path.into(),
            xacro_file: None,
            model: RobotModel::default(),
            output: PathBuf::from(DEFAULT_OUTPUT),
        }
    }

    /// Absolute or workspace-relative template path
    pub fn template_path(&self) -> PathBuf {
        match &self.xacro_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.ros_path.join(path),
            None => self.ros_path.join(DEFAULT_XACRO_TEMPLATE),
        }
    }
}

/// Expand the Reachy 2 description and write it to `request.output`.
///
/// Workspace packages are exposed to xacro both on `ROS_PACKAGE_PATH` and
/// through a temporary ament prefix on `AMENT_PREFIX_PATH`. The output file
/// is only touched once xacro has succeeded.
pub fn generate(processor: XacroProcessor, request: &GenerateRequest) -> Result<PathBuf> {
    if !request.ros_path.is_dir() {
        return Err(UrdfError::WorkspaceNotFound(request.ros_path.clone()));
    }

    let packages = PackageIndex::discover(&[&request.ros_path]);
    if packages.is_empty() {
        log::warn!("No ROS packages found under {}", request.ros_path.display());
    } else {
        log::info!(
            "Found {} ROS packages under {}",
            packages.len(),
            request.ros_path.display()
        );
    }

    let prefix = AmentPrefix::create(&packages)?;
    let processor = processor
        .look_in(&request.ros_path)
        .with_ament_prefix(prefix.path());
    let urdf = processor.expand(
        &request.template_path(),
        &[(MODEL_ARG, request.model.as_str())],
    )?;

    std::fs::write(&request.output, urdf)?;
    Ok(request.output.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_robot_model_parse() {
        assert_eq!("beta".parse::<RobotModel>().unwrap(), RobotModel::Beta);
        assert_eq!("dvt".parse::<RobotModel>().unwrap(), RobotModel::Dvt);
        assert!(matches!(
            "pvt".parse::<RobotModel>(),
            Err(UrdfError::UnknownModel(_))
        ));
        assert_eq!(RobotModel::default(), RobotModel::Dvt);
    }

    #[test]
    fn test_template_path() {
        let mut request = GenerateRequest::new("/ws");
        assert_eq!(
            request.template_path(),
            PathBuf::from("/ws/reachy2_core/reachy_description/urdf/reachy.urdf.xacro")
        );

        request.xacro_file = Some(PathBuf::from("custom/robot.urdf.xacro"));
        assert_eq!(request.template_path(), PathBuf::from("/ws/custom/robot.urdf.xacro"));

        request.xacro_file = Some(PathBuf::from("/tmp/robot.urdf.xacro"));
        assert_eq!(request.template_path(), PathBuf::from("/tmp/robot.urdf.xacro"));
    }

    #[test]
    fn test_command_arguments() {
        let processor = XacroProcessor::with_program("xacro")
            .look_in("/ws")
            .with_ament_prefix("/tmp/reachy2_ament");
        let cmd = processor
            .command(Path::new("/ws/robot.xacro"), &[(MODEL_ARG, "beta")])
            .unwrap();

        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().to_string()).collect();
        assert_eq!(args, vec!["/ws/robot.xacro", "robot_model:=beta"]);

        let package_path = cmd
            .get_envs()
            .find(|(k, _)| *k == "ROS_PACKAGE_PATH")
            .and_then(|(_, v)| v)
            .unwrap();
        let first = std::env::split_paths(package_path).next().unwrap();
        assert_eq!(first, PathBuf::from("/ws"));

        let prefix_path = cmd
            .get_envs()
            .find(|(k, _)| *k == "AMENT_PREFIX_PATH")
            .and_then(|(_, v)| v)
            .unwrap();
        let first = std::env::split_paths(prefix_path).next().unwrap();
        assert_eq!(first, PathBuf::from("/tmp/reachy2_ament"));
    }

    #[test]
    fn test_missing_template() {
        let processor = XacroProcessor::with_program("xacro");
        let err = processor
            .expand(Path::new("/nonexistent/robot.xacro"), &[])
            .unwrap_err();
        assert!(matches!(err, UrdfError::TemplateNotFound(_)));
    }

    #[test]
    fn test_missing_workspace() {
        let request = GenerateRequest::new("/nonexistent/ros_ws");
        let err = generate(XacroProcessor::with_program("xacro"), &request).unwrap_err();
        assert!(matches!(err, UrdfError::WorkspaceNotFound(_)));
    }

    #[test]
    fn test_missing_program() {
        let dir = tempdir().unwrap();
        let template = dir.path().join("robot.xacro");
        std::fs::write(&template, "<robot/>").unwrap();

        let processor = XacroProcessor::with_program("/nonexistent/bin/xacro");
        let err = processor.expand(&template, &[]).unwrap_err();
        assert!(matches!(err, UrdfError::Spawn { .. }));
    }
}
