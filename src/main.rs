use anyhow::Result;
use clap::Parser;
use malconv::config::{DEFAULT_USER_ID, DEFAULT_USER_NAME};
use malconv::convert::{output_path_for, run_conversion, ConvertOptions};
use malconv::mapper::ValidationPolicy;
use malconv::models::Status;
use malconv::writer::UserInfo;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "malconv")]
#[command(about = "Convert a manga reading-list CSV into MyAnimeList import XML")]
struct Cli {
    /// Path to the CSV export
    input: String,

    /// Output path (defaults to the input name with `.csv` replaced by `_mal.xml`)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// How rows with missing or unknown values are handled
    #[arg(long, value_enum, default_value_t = ValidationPolicy::Lenient)]
    policy: ValidationPolicy,

    /// User id written into the export header
    #[arg(long, default_value = DEFAULT_USER_ID)]
    user_id: String,

    /// User name written into the export header
    #[arg(long, default_value = DEFAULT_USER_NAME)]
    user_name: String,

    /// Dry run - don't write the output file
    #[arg(long)]
    dry_run: bool,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn run(cli: Cli) -> Result<()> {
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| output_path_for(&cli.input));
    let options = ConvertOptions {
        policy: cli.policy,
        user: UserInfo {
            user_id: cli.user_id,
            user_name: cli.user_name,
        },
        dry_run: cli.dry_run,
    };

    let start = Instant::now();
    let report = run_conversion(&cli.input, &output, &options)?;
    info!(
        duration_secs = start.elapsed().as_secs_f64(),
        "Conversion complete"
    );

    match &report.output {
        Some(path) => println!("Converted {} records -> {}", report.records(), path.display()),
        None if options.dry_run => println!("Dry run: {} records not written", report.records()),
        None => println!("No valid rows found in {}; no output written", cli.input),
    }
    if report.rows_skipped > 0 {
        println!("Skipped {} invalid rows", report.rows_skipped);
    }
    for status in Status::ALL {
        println!("  {:<14}{}", status.label(), report.counts.get(status));
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!(error = ?e, "Conversion failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
