//! Rawline REPL
//!
//! Reads lines with arrow-key editing and history, echoing each one back.
//! Type `exit` to quit; the session also ends at end of input.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use rawline::{
    ErrorKind, History, HistoryFile, LineFormat, LineResult, Options, Session, StdTerminal,
};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut history_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut prompt = String::from("> ");
    let mut cbreak = false;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--history" => {
                i += 1;
                if i < args.len() {
                    history_path = Some(PathBuf::from(&args[i]));
                }
            },
            "-c" | "--config" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(PathBuf::from(&args[i]));
                }
            },
            "-p" | "--prompt" => {
                i += 1;
                if i < args.len() {
                    prompt = args[i].clone();
                }
            },
            "--cbreak" => {
                cbreak = true;
            },
            "-h" | "--help" => {
                show_help = true;
            },
            other => {
                eprintln!("Unknown option: {}", other);
                print_help();
                return ExitCode::FAILURE;
            },
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    let mut options = match &config_path {
        Some(path) => match Options::load(path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("Error loading {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            },
        },
        None => Options::load_or_default(),
    };
    if cbreak {
        options.raw_mode_cbreak = true;
        options.install_handlers = true;
    }

    let mut history = History::new();
    let backing = match &history_path {
        Some(path) => match HistoryFile::open(path, Box::new(LineFormat)) {
            Ok(file) => Some(file.with_max_len(options.history_max_file_len)),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            },
        },
        None => None,
    };
    if let Err(e) = history.init(backing) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut session = Session::new(StdTerminal::stdio()).with_history(history);
    if let Err(e) = session.initialize(&options) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    let result = run(&mut session, &prompt);
    let shutdown = session.shutdown();

    match result.and(shutdown) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(session: &mut Session<StdTerminal>, prompt: &str) -> LineResult<()> {
    session.hold_raw();
    let result = loop {
        match session.read_line(prompt) {
            Ok(Some(line)) => {
                tracing::debug!(len = line.len(), "read line");
                if let Err(e) = session.puts(format!("{}\r\n", line).as_bytes()) {
                    break Err(e);
                }
            },
            Ok(None) => break Ok(()),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => break Err(e),
        }
    };
    session.release_raw();
    result
}

fn print_help() {
    println!("Rawline REPL");
    println!();
    println!("Usage: rawline-repl [OPTIONS]");
    println!();
    println!("Options:");
    println!("      --history <PATH>  Load and save history in PATH");
    println!("  -c, --config <PATH>   Read options from a JSON file");
    println!("  -p, --prompt <TEXT>   Prompt to show (default: \"> \")");
    println!("      --cbreak          Keep Ctrl-C/Ctrl-Z active and handle job control");
    println!("  -h, --help            Show this help message");
    println!();
    println!("Without --config, options are read from ~/.config/rawline/config.json");
    println!("if it exists. Type `exit` to quit.");
}
