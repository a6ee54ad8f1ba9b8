use argh::FromArgs;
use reachy2_recorder::{check_robot, Recorder, RecorderConfig, ZenohRobot, APPLICATION_ID};
use std::path::PathBuf;
use std::sync::mpsc;

#[derive(FromArgs, Debug)]
/// Record Reachy 2 joint poses and cameras into rerun
struct Args {
    /// path to the robot URDF file
    #[argh(option)]
    urdf: PathBuf,

    /// robot IP address or hostname (default: localhost)
    #[argh(option, default = "String::from(\"localhost\")")]
    ip: String,

    /// save the recording to this .rrd file instead of spawning a viewer
    #[argh(option)]
    save: Option<PathBuf>,

    /// record the teleop stereo camera
    #[argh(switch)]
    teleop_camera: bool,

    /// record the torso depth camera
    #[argh(switch)]
    depth_camera: bool,

    /// polling frequency in Hz (default: 5)
    #[argh(option, default = "reachy2_recorder::DEFAULT_REC_FREQ")]
    rec_freq: u32,

    /// reachy 2 ROS workspace used to resolve package:// meshes
    #[argh(option)]
    ros_path: Option<PathBuf>,
}

impl Args {
    fn config(&self) -> RecorderConfig {
        RecorderConfig {
            urdf: self.urdf.clone(),
            teleop_camera: self.teleop_camera,
            depth_camera: self.depth_camera,
            rec_freq: self.rec_freq,
            ros_path: self.ros_path.clone(),
        }
    }
}

fn open_recording(save: Option<&PathBuf>) -> anyhow::Result<rerun::RecordingStream> {
    let builder = rerun::RecordingStreamBuilder::new(APPLICATION_ID)
        .recording_id(uuid::Uuid::new_v4().to_string());

    let rec = match save {
        Some(path) => {
            log::info!("Saving recording to {}", path.display());
            builder.save(path)?
        }
        None => {
            let opts = rerun::SpawnOptions {
                memory_limit: "50%".into(),
                ..Default::default()
            };
            builder.spawn_opts(&opts, rerun::default_flush_timeout())?
        }
    };
    Ok(rec)
}

fn run(args: &Args) -> anyhow::Result<()> {
    let config = args.config();

    let robot = ZenohRobot::connect(&args.ip)?;
    check_robot(&robot, &config)?;

    let rec = open_recording(args.save.as_ref())?;
    let mut recorder = Recorder::new(robot, rec, &config)?;

    let (stop_tx, stop_rx) = mpsc::channel();
    ctrlc::set_handler(move || {
        if let Err(e) = stop_tx.send(()) {
            log::warn!("Failed to send stop signal: {}", e);
        }
    })?;

    recorder.run(&stop_rx)?;
    Ok(())
}

fn main() {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = reachy2_urdf::cli::from_env();

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, argh::EarlyExit> {
        let args: Vec<String> = std::iter::once("rerun_recorder")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();
        reachy2_urdf::cli::parse_args(&args)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--urdf", "reachy2.urdf"]).unwrap();
        let config = args.config();
        assert_eq!(args.ip, "localhost");
        assert!(args.save.is_none());
        assert_eq!(config.rec_freq, 5);
        assert!(!config.teleop_camera && !config.depth_camera);
        assert!(config.ros_path.is_none());
    }

    #[test]
    fn test_snake_case_flags() {
        let args = parse(&[
            "--urdf",
            "reachy2.urdf",
            "--ip",
            "192.168.1.42",
            "--teleop_camera",
            "--depth_camera",
            "--rec_freq",
            "10",
            "--save",
            "session.rrd",
        ])
        .unwrap();
        assert_eq!(args.ip, "192.168.1.42");
        assert!(args.teleop_camera && args.depth_camera);
        assert_eq!(args.rec_freq, 10);
        assert_eq!(args.save, Some(PathBuf::from("session.rrd")));
    }

    #[test]
    fn test_urdf_is_required() {
        assert!(parse(&["--ip", "localhost"]).is_err());
    }
}
