//! Command-line helpers shared by the Reachy 2 tools.
//!
//! The tools accept the snake_case flag spellings used by the rest of the
//! Reachy 2 tooling (`--ros_path`, `--rec_freq`) as well as argh's kebab-case.

use argh::{EarlyExit, TopLevelCommand};

/// Rewrite `--some_flag[=value]` as `--some-flag[=value]`
pub fn normalize_flag(arg: &str) -> String {
    match arg.strip_prefix("--") {
        Some(rest) if !rest.is_empty() => match rest.split_once('=') {
            Some((name, value)) => format!("--{}={}", name.replace('_', "-"), value),
            None => format!("--{}", rest.replace('_', "-")),
        },
        _ => arg.to_string(),
    }
}

/// Parse `args` (program name first) after flag normalization
pub fn parse_args<T: TopLevelCommand>(args: &[String]) -> Result<T, EarlyExit> {
    let (program, rest) = match args.split_first() {
        Some((program, rest)) => (program.as_str(), rest),
        None => ("", args),
    };

    // Everything after a bare `--` is positional and left untouched
    let split = rest.iter().position(|a| a == "--").unwrap_or(rest.len());
    let normalized: Vec<String> = rest[..split]
        .iter()
        .map(|a| normalize_flag(a))
        .chain(rest[split..].iter().cloned())
        .collect();
    let refs: Vec<&str> = normalized.iter().map(String::as_str).collect();

    T::from_args(&[program], &refs)
}

/// Like `argh::from_env`, accepting snake_case flags
pub fn from_env<T: TopLevelCommand>() -> T {
    let args: Vec<String> = std::env::args().collect();
    match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(EarlyExit { output, status }) => match status {
            Ok(()) => {
                println!("{}", output);
                std::process::exit(0);
            }
            Err(()) => {
                let program = args.first().map(String::as_str).unwrap_or_default();
                eprintln!("{}\nRun {} --help for more information.", output, program);
                std::process::exit(1);
            }
        },
    }
}
