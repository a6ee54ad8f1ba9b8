use argh::FromArgs;
use reachy2_urdf::{generate, GenerateRequest, RobotModel, XacroProcessor};
use std::path::PathBuf;

#[derive(FromArgs, Debug)]
/// Generate the Reachy 2 URDF from the ROS xacro description
struct Args {
    /// reachy 2 ROS workspace
    #[argh(option)]
    ros_path: PathBuf,

    /// xacro template relative to the workspace (default: reachy2_core/reachy_description/urdf/reachy.urdf.xacro)
    #[argh(option)]
    xacro_file: Option<PathBuf>,

    /// reachy 2 model: beta or dvt (default: dvt)
    #[argh(option, default = "RobotModel::Dvt")]
    model: RobotModel,

    /// output URDF file (default: reachy2.urdf)
    #[argh(option, default = "PathBuf::from(reachy2_urdf::DEFAULT_OUTPUT)")]
    output: PathBuf,
}

fn main() {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = reachy2_urdf::cli::from_env();

    let request = GenerateRequest {
        ros_path: args.ros_path,
        xacro_file: args.xacro_file,
        model: args.model,
        output: args.output,
    };

    match generate(XacroProcessor::new(), &request) {
        Ok(path) => log::info!("Wrote {} ({} model)", path.display(), request.model),
        Err(e) => {
            log::error!("URDF generation failed: {}", e);
            std::process::exit(1);
        }
    }
}
