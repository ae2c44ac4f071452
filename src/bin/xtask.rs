use std::env;
use std::process::{Command, ExitCode};

const USAGE: &str = "Usage:
  cargo run --bin xtask -- precommit [--locked]
  cargo run --bin xtask -- ci [--locked] [--with-odbc]";

struct Options {
    locked: bool,
    with_odbc: bool,
}

fn run_command(program: &str, args: &[&str]) -> Result<(), String> {
    eprintln!("+ {program} {}", args.join(" "));
    let status = Command::new(program)
        .args(args)
        .status()
        .map_err(|error| format!("Failed to run `{program}`: {error}"))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!(
            "Command `{program} {}` exited with status {status}",
            args.join(" ")
        ))
    }
}

/// Run cargo, adding `--locked` before any `--` separator when requested.
fn run_cargo(args: &[&str], locked: bool) -> Result<(), String> {
    let mut full: Vec<&str> = Vec::with_capacity(args.len() + 1);
    let split = args.iter().position(|arg| *arg == "--").unwrap_or(args.len());
    full.extend_from_slice(&args[..split]);
    if locked {
        full.push("--locked");
    }
    full.extend_from_slice(&args[split..]);
    run_command("cargo", &full)
}

fn run_precommit(options: &Options) -> Result<(), String> {
    run_command("cargo", &["fmt", "--all", "--", "--check"])?;
    run_cargo(
        &["clippy", "--all-targets", "--", "-D", "warnings"],
        options.locked,
    )?;
    run_cargo(&["test", "--lib", "--tests"], options.locked)
}

fn run_ci(options: &Options) -> Result<(), String> {
    run_precommit(options)?;
    run_cargo(&["test", "--doc"], options.locked)?;

    // The live catalog links against the system ODBC driver manager.
    if options.with_odbc {
        run_cargo(
            &[
                "clippy",
                "--all-targets",
                "--features",
                "odbc",
                "--",
                "-D",
                "warnings",
            ],
            options.locked,
        )?;
        run_cargo(&["test", "--features", "odbc", "--lib"], options.locked)?;
    }
    Ok(())
}

fn parse_options(rest: &[String], allowed: &[&str]) -> Result<Options, String> {
    let mut options = Options {
        locked: false,
        with_odbc: false,
    };
    for flag in rest {
        if !allowed.contains(&flag.as_str()) {
            return Err(format!("Unknown option: {flag}"));
        }
        match flag.as_str() {
            "--locked" => options.locked = true,
            "--with-odbc" => options.with_odbc = true,
            _ => {}
        }
    }
    Ok(options)
}

fn main() -> ExitCode {
    let mut args = env::args().skip(1);
    let Some(command) = args.next() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };
    let rest: Vec<String> = args.collect();

    let allowed: &[&str] = match command.as_str() {
        "precommit" => &["--locked"],
        "ci" => &["--locked", "--with-odbc"],
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    let options = match parse_options(&rest, allowed) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    let result = if command == "ci" {
        run_ci(&options)
    } else {
        run_precommit(&options)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::from(1)
        }
    }
}
