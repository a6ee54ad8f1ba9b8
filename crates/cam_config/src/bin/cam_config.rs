use argh::FromArgs;
use cam_config::{default_search_root, list_available, load_named};
use std::path::PathBuf;

#[derive(FromArgs)]
/// Inspect Reachy 2 camera config files
struct Args {
    /// directory searched for config files (default: bundled config_files)
    #[argh(option, short = 'r')]
    root: Option<PathBuf>,

    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    List(ListArgs),
    Show(ShowArgs),
}

#[derive(FromArgs)]
/// List available config names
#[argh(subcommand, name = "list")]
struct ListArgs {}

#[derive(FromArgs)]
/// Load a config by name and print it
#[argh(subcommand, name = "show")]
struct ShowArgs {
    /// config name (file stem)
    #[argh(positional)]
    name: String,
}

fn main() {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let args: Args = argh::from_env();
    let root = args.root.unwrap_or_else(default_search_root);
    log::debug!("Searching camera configs in {}", root.display());

    match args.command {
        Command::List(_) => {
            for name in list_available(&root) {
                println!("{}", name);
            }
        }
        Command::Show(show) => match load_named(&show.name, &root) {
            Ok(Some(config)) => {
                print!("{}", config);
                for (socket, name) in &config.socket_to_name {
                    println!("  {} -> {}", socket, name);
                }
            }
            Ok(None) => {
                log::error!("No camera config named '{}' in {}", show.name, root.display());
                std::process::exit(1);
            }
            Err(e) => {
                log::error!("Failed to load camera config '{}': {}", show.name, e);
                std::process::exit(1);
            }
        },
    }
}
