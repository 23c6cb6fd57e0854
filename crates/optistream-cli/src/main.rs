use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use glob::glob;
use optistream_core::{
    PcapReplay, SessionConfig, SessionStats, StreamingCoordinator, Value,
};
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

const EXAMPLES: &str = "Examples:\n  optistream capture export session.pcapng -o tables/\n  optistream capture export session.pcapng --stdout --set participant_id=7\n  optistream capture export 'runs/*.pcapng' -o out --set trial=3 --into RigidBodies";

#[derive(Parser, Debug)]
#[command(name = "optistream")]
#[command(version)]
#[command(long_version = env!("OPTISTREAM_LONG_VERSION"))]
#[command(
    about = "Decode recorded motion-capture streams into per-asset tables.",
    long_about = None,
    after_help = EXAMPLES
)]
struct Cli {
    /// Debug-level logging on stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on recorded PCAP/PCAPNG captures.
    Capture {
        #[command(subcommand)]
        command: CaptureCommands,
    },
}

#[derive(Subcommand, Debug)]
enum CaptureCommands {
    /// Replay a capture through a session and export the accumulated tables.
    #[command(after_help = EXAMPLES)]
    Export(ExportArgs),
}

#[derive(clap::Args, Debug)]
struct ExportArgs {
    /// Path (or glob matching exactly one file) to a .pcap or .pcapng capture
    input: PathBuf,

    /// Output directory for the exported tables
    #[arg(short = 'o', long, required_unless_present = "stdout")]
    out: Option<PathBuf>,

    /// Write a JSON export to stdout
    #[arg(long, conflicts_with = "out")]
    stdout: bool,

    /// Table format written to the output directory [default: csv]
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// Session metadata column stamped on every exported row (key=value)
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    set: Vec<(String, Value)>,

    /// Restrict --set to these accumulators (e.g. RigidBodies); repeatable
    #[arg(long, value_name = "KEY", requires = "set")]
    into: Vec<String>,

    /// Session config (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Accept content decoded through unverified layouts
    #[arg(long)]
    allow_unverified: bool,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Capture { command } => match command {
            CaptureCommands::Export(args) => cmd_capture_export(args),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // Only fails if a global subscriber is already installed; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

impl From<optistream_core::SessionError> for CliError {
    fn from(err: optistream_core::SessionError) -> Self {
        let hint = match err.kind() {
            optistream_core::ErrorKind::InvalidAssetType => Some(
                "--into takes accumulator keys such as RigidBodies, LabeledMarkers, Skeletons"
                    .to_string(),
            ),
            optistream_core::ErrorKind::UnverifiedLayout => {
                Some("pass --allow-unverified to accept it".to_string())
            }
            _ => None,
        };
        CliError::new(format!("{} ({})", err, err.kind()), hint)
    }
}

#[derive(Serialize)]
struct JsonExport<'a> {
    input: String,
    stats: SessionStats,
    frames: &'a optistream_core::AccumulatorStore,
    descriptions: &'a optistream_core::AccumulatorStore,
}

fn cmd_capture_export(args: ExportArgs) -> Result<(), CliError> {
    if args.stdout && args.format == Some(Format::Csv) {
        return Err(CliError::new(
            "CSV output needs a directory",
            Some("use -o/--out with --format csv, or drop --format".to_string()),
        ));
    }
    let input = resolve_input_path(&args.input)?;
    validate_input_file(&input)?;

    let mut config = match args.config.as_deref() {
        Some(path) => SessionConfig::from_json_file(path).map_err(|err| {
            CliError::new(
                format!("invalid config {}: {err}", path.display()),
                Some("expected a JSON object, e.g. {\"data_port\": 1511}".to_string()),
            )
        })?,
        None => SessionConfig::default(),
    };
    if args.allow_unverified {
        config.allow_unverified_layouts = true;
    }
    debug!(?config, input = %input.display(), "session config");

    let replay = PcapReplay::new(&input, &config);
    let mut session = StreamingCoordinator::new(replay, config);
    if !session.start()? {
        return Err(CliError::new(
            format!("capture replay refused to start: {}", input.display()),
            None,
        ));
    }
    let stats = session.run()?;
    info!(
        data_frames = stats.data_frames,
        descriptions = stats.descriptions,
        rejected = stats.rejected,
        "replay finished"
    );

    if !args.set.is_empty() {
        let into: Vec<&str> = args.into.iter().map(String::as_str).collect();
        let into = (!into.is_empty()).then_some(into.as_slice());
        session.update_frame(args.set.iter().cloned(), into)?;
    }

    if args.stdout {
        let json = export_json(&session, &input)?;
        println!("{json}");
        return Ok(());
    }

    let out = args.out.ok_or_else(|| {
        CliError::new(
            "missing output directory",
            Some("use -o/--out or --stdout".to_string()),
        )
    })?;
    if out.is_file() {
        return Err(CliError::new(
            format!("output path is a file: {}", out.display()),
            Some("choose a directory; tables are written one file per asset type".to_string()),
        ));
    }

    match args.format.unwrap_or(Format::Csv) {
        Format::Csv => {
            session.materialize(&out)?;
            session.materialize_descriptions(&out.join("descriptions"))?;
        }
        Format::Json => {
            fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create output directory: {}", out.display()))?;
            let target = out.join("export.json");
            fs::write(&target, export_json(&session, &input)?)
                .with_context(|| format!("Failed to write export: {}", target.display()))?;
        }
    }

    if !args.quiet {
        eprintln!(
            "OK: {} frames, {} descriptions, {} rejected -> {}",
            stats.data_frames,
            stats.descriptions,
            stats.rejected,
            out.display()
        );
    }
    Ok(())
}

fn export_json(
    session: &StreamingCoordinator<PcapReplay>,
    input: &Path,
) -> Result<String, CliError> {
    let export = JsonExport {
        input: input.display().to_string(),
        stats: session.stats(),
        frames: session.export(),
        descriptions: session.descexport(),
    };
    serde_json::to_string_pretty(&export)
        .context("JSON serialization failed")
        .map_err(Into::into)
}

/// `key=value`; the value becomes an integer, a float or text, in that
/// order of preference.
fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty column name in '{raw}'"));
    }
    let value = if let Ok(int) = value.parse::<i64>() {
        Value::Int(int)
    } else if let Ok(float) = value.parse::<f64>() {
        Value::Float(float)
    } else {
        Value::Text(value.to_string())
    };
    Ok((key.to_string(), value))
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    let mut matches = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => {
            let mut listed = matches
                .iter()
                .take(3)
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            if count > 3 {
                listed.push_str(", ...");
            }
            Err(CliError::new(
                format!("multiple files match pattern '{pattern}' ({count} matches); matches: {listed}"),
                Some("pass a single capture file, or run once per file".to_string()),
            ))
        }
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
