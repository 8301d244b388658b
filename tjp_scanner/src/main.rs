//! tjp-scan: print the token stream of a TaskJuggler project file
//!
//! Usage:
//!   tjp-scan [--json] [--define NAME=BODY]... [--utc-offset +HHMM] <FILE>

use clap::Parser as ClapParser;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tjp_scanner::config::RuntimeConfig;
use tjp_scanner::lexical::{self, MacroDefinition, ScanError, Scanner};
use tjp_scanner::logging::{self, codes, LogCrateLogger, LogLevel, LoggingService};
use tjp_scanner::log_success;

#[derive(ClapParser, Debug)]
#[command(name = "tjp-scan", version, about = "Print the tokens of a TaskJuggler project file")]
struct Cli {
    /// Project file to scan.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Print one JSON object per token.
    #[arg(long)]
    json: bool,

    /// Predefine a macro before scanning.
    #[arg(short = 'D', long = "define", value_name = "NAME=BODY", value_parser = parse_define)]
    defines: Vec<MacroDefinition>,

    /// UTC offset for dates written without one.
    #[arg(long, value_name = "+HHMM")]
    utc_offset: Option<String>,

    /// Runtime configuration file.
    #[arg(short, long, value_name = "TOML")]
    config: Option<PathBuf>,

    /// Trace mode switches and macro expansions (shown via RUST_LOG).
    #[arg(short, long)]
    verbose: bool,
}

fn parse_define(text: &str) -> Result<MacroDefinition, String> {
    match text.split_once('=') {
        Some((name, body)) if !name.trim().is_empty() => {
            Ok(MacroDefinition::new(name.trim(), body))
        }
        _ => Err(format!("expected NAME=BODY, got '{}'", text)),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        // Scan errors have already been reported by the scanner's handler
        Err(e) if e.downcast_ref::<ScanError>().is_some() => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("tjp-scan: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &cli.config {
        Some(path) => RuntimeConfig::load(path)?,
        None => RuntimeConfig::default(),
    };

    logging::config::init_runtime_preferences(config.logging.clone())?;
    let min_level = if cli.verbose {
        LogLevel::Debug
    } else {
        logging::config::get_min_log_level()
    };
    logging::init_global_logging_with_service(Arc::new(LoggingService::new(
        Arc::new(LogCrateLogger),
        min_level,
    )))?;
    lexical::validate_scanner()?;

    let mut preferences = config.scanner;
    if let Some(offset) = &cli.utc_offset {
        preferences.reference_utc_offset = offset.clone();
    }
    if cli.verbose {
        preferences.trace_mode_switches = true;
    }

    let mut scanner = Scanner::from_file(&cli.file)?.with_preferences(preferences)?;
    for definition in &cli.defines {
        scanner.add_macro(definition.clone());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    loop {
        let token = scanner.next_token()?;
        if cli.json {
            writeln!(out, "{}", serde_json::to_string(&token)?)?;
        } else {
            writeln!(out, "{}", token)?;
        }
        if token.is_eof() {
            break;
        }
    }

    let metrics = scanner.metrics();
    log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Scanned file",
        "file" => cli.file.display(),
        "tokens" => metrics.tokens,
        "macro_expansions" => metrics.macro_expansions,
        "warnings" => metrics.warnings
    );

    Ok(())
}
