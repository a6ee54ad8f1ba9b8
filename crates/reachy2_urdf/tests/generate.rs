//! End-to-end URDF generation against a stand-in xacro.
//!
//! `sh` plays the xacro executable: it runs the template as a script, with
//! the `robot_model:=...` argument as `$1`.
#![cfg(unix)]

use reachy2_urdf::{generate, GenerateRequest, RobotModel, UrdfError, XacroProcessor};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn workspace(template_script: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let description = dir.path().join("reachy2_core/reachy_description");
    std::fs::create_dir_all(description.join("urdf")).unwrap();
    std::fs::write(
        description.join("package.xml"),
        "<package><name>reachy_description</name></package>",
    )
    .unwrap();
    let template = description.join("urdf/reachy.urdf.xacro");
    std::fs::write(&template, template_script).unwrap();
    (dir, template)
}

fn request(ros_path: &Path, output: PathBuf, model: RobotModel) -> GenerateRequest {
    GenerateRequest {
        ros_path: ros_path.to_path_buf(),
        xacro_file: None,
        model,
        output,
    }
}

#[test]
fn test_generate_writes_expanded_document() {
    let (ws, _) = workspace(
        "echo \"<robot name=\\\"reachy\\\" arg=\\\"$1\\\" packages=\\\"$ROS_PACKAGE_PATH\\\"/>\"\n",
    );
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("reachy2.urdf");

    let written = generate(
        XacroProcessor::with_program("sh"),
        &request(ws.path(), output.clone(), RobotModel::Beta),
    )
    .unwrap();
    assert_eq!(written, output);

    let urdf = std::fs::read_to_string(&output).unwrap();
    assert!(urdf.contains("arg=\"robot_model:=beta\""), "{urdf}");
    assert!(
        urdf.contains(&format!("packages=\"{}", ws.path().display())),
        "{urdf}"
    );
}

#[test]
fn test_generate_failure_leaves_no_output() {
    let (ws, _) = workspace("echo \"Undefined substitution argument robot_model\" >&2\nexit 2\n");
    let out_dir = tempfile::tempdir().unwrap();
    let output = out_dir.path().join("reachy2.urdf");

    let err = generate(
        XacroProcessor::with_program("sh"),
        &request(ws.path(), output.clone(), RobotModel::Dvt),
    )
    .unwrap_err();

    match err {
        UrdfError::Xacro { stderr, .. } => {
            assert_eq!(stderr, "Undefined substitution argument robot_model")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());
}

#[test]
fn test_generate_with_explicit_template() {
    let (ws, _) = workspace("exit 1\n");
    std::fs::write(ws.path().join("mini.xacro"), "echo '<robot name=\"mini\"/>'\n").unwrap();
    let output = ws.path().join("mini.urdf");

    let mut req = request(ws.path(), output.clone(), RobotModel::Dvt);
    req.xacro_file = Some(PathBuf::from("mini.xacro"));
    generate(XacroProcessor::with_program("sh"), &req).unwrap();

    assert_eq!(
        std::fs::read_to_string(output).unwrap().trim(),
        "<robot name=\"mini\"/>"
    );
}

#[test]
fn test_generate_exposes_packages_to_ament() {
    let (ws, _) = workspace(
        r#"prefix="${AMENT_PREFIX_PATH%%:*}"
test -f "$prefix/share/ament_index/resource_index/packages/reachy_description" || exit 3
test -f "$prefix/share/reachy_description/package.xml" || exit 4
echo '<robot name="reachy"/>'
"#,
    );
    let output = ws.path().join("reachy2.urdf");

    generate(
        XacroProcessor::with_program("sh"),
        &request(ws.path(), output.clone(), RobotModel::Dvt),
    )
    .unwrap();

    assert_eq!(
        std::fs::read_to_string(output).unwrap().trim(),
        "<robot name=\"reachy\"/>"
    );
}
