//! CLI driver for ticker report generation.
//!
//! Reads a ticker feed file, runs the three report aggregators over it in a
//! single pass, and appends the finished groups to their output files.
//!
//! # Usage
//!
//! ```bash
//! # Default output names next to the current directory
//! cargo run --release --bin generate_reports -- --input Ticker.dat
//!
//! # Redirect all three reports into a directory
//! cargo run --release --bin generate_reports -- \
//!     --input Ticker.dat \
//!     --output-dir reports/
//!
//! # Destination names from a JSON config
//! cargo run --release --bin generate_reports -- \
//!     --input Ticker.dat \
//!     --config report_paths.json
//! ```

use std::cell::RefCell;
use std::env;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Instant;

use ticker_reports::{
    AverageReport, FeedDispatcher, FeedSource, RecordCloseReport, ReportPaths, Result,
    SelectedStocksReport, SharedObserver, TickerFile,
};

/// Command-line arguments
struct Args {
    /// Input feed file
    input: PathBuf,
    /// Optional directory to place the three reports in
    output_dir: Option<PathBuf>,
    /// Optional JSON config naming the three destinations
    config: Option<PathBuf>,
}

fn parse_args() -> std::result::Result<Args, String> {
    let args: Vec<String> = env::args().collect();

    let mut input: Option<PathBuf> = None;
    let mut output_dir: Option<PathBuf> = None;
    let mut config: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--input" | "-i" => {
                i += 1;
                if i >= args.len() {
                    return Err("--input requires a path".to_string());
                }
                input = Some(PathBuf::from(&args[i]));
            }
            "--output-dir" | "-o" => {
                i += 1;
                if i >= args.len() {
                    return Err("--output-dir requires a path".to_string());
                }
                output_dir = Some(PathBuf::from(&args[i]));
            }
            "--config" | "-c" => {
                i += 1;
                if i >= args.len() {
                    return Err("--config requires a path".to_string());
                }
                config = Some(PathBuf::from(&args[i]));
            }
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            arg => {
                // Positional argument: the feed file
                if input.is_none() {
                    input = Some(PathBuf::from(arg));
                } else {
                    return Err(format!("Unknown argument: {arg}"));
                }
            }
        }
        i += 1;
    }

    let input = input.ok_or("Input feed file is required")?;

    Ok(Args {
        input,
        output_dir,
        config,
    })
}

fn print_help() {
    eprintln!(
        r#"
Generate Ticker Reports

Runs one pass over a ticker feed file and produces three reports:
per-snapshot averages, 52-week record closes, and the watch-list detail
view.

USAGE:
    generate_reports [OPTIONS] --input <FILE>
    generate_reports <FILE>

OPTIONS:
    -i, --input <FILE>      Input feed file (e.g., Ticker.dat)
    -o, --output-dir <DIR>  Directory for the three report files
    -c, --config <FILE>     JSON config naming the report destinations
    -h, --help              Print this help message

NOTES:
    - Report files are append-only; re-running adds new groups
    - A report with no qualifying records writes no file
    - Logging is controlled via RUST_LOG (default: info)
"#
    );
}

/// Resolve report destinations from config file and/or output directory.
fn resolve_paths(args: &Args) -> Result<ReportPaths> {
    let mut paths = match &args.config {
        Some(config) => ReportPaths::load_json(config)?,
        None => ReportPaths::default(),
    };

    if let Some(dir) = &args.output_dir {
        std::fs::create_dir_all(dir)?;
        paths = paths.with_output_dir(dir);
    }

    Ok(paths)
}

fn run(args: &Args) -> Result<()> {
    let paths = resolve_paths(args)?;

    let averages = Rc::new(RefCell::new(AverageReport::new(&paths.averages)));
    let record_close = Rc::new(RefCell::new(RecordCloseReport::new(&paths.record_close)));
    let selected = Rc::new(RefCell::new(SelectedStocksReport::new(&paths.selected)));

    let averages_obs: SharedObserver = averages.clone();
    let record_close_obs: SharedObserver = record_close.clone();
    let selected_obs: SharedObserver = selected.clone();

    let mut dispatcher = FeedDispatcher::new();
    dispatcher.subscribe(&averages_obs);
    dispatcher.subscribe(&record_close_obs);
    dispatcher.subscribe(&selected_obs);

    let source = TickerFile::new(&args.input)?;
    log::info!(
        "Processing feed {} ({} bytes)",
        source.path().display(),
        source.stats().file_size
    );

    let start = Instant::now();
    let mut lines = 0u64;

    for tokens in source.lines()? {
        dispatcher.ingest(&tokens)?;
        lines += 1;
    }

    let elapsed = start.elapsed();
    let stats = dispatcher.stats();

    println!("Feed processed in {:.2}s", elapsed.as_secs_f64());
    println!("  Lines ingested: {lines}");
    println!("  Snapshot labels: {}", stats.timestamps_seen);
    println!("  Records broadcast: {}", stats.records_broadcast);
    println!("  Observers retired: {}", stats.observers_retired);
    println!();

    let averages = averages.borrow();
    let record_close = record_close.borrow();
    let selected = selected.borrow();

    println!("Reports:");
    println!(
        "  {}: {} group(s)",
        averages.sink().path().display(),
        averages.stats().groups_flushed
    );
    println!(
        "  {}: {} group(s), {} matching record(s)",
        record_close.sink().path().display(),
        record_close.stats().groups_flushed,
        record_close.stats().records_matched
    );
    println!(
        "  {}: {} group(s), {} matching record(s)",
        selected.sink().path().display(),
        selected.stats().groups_flushed,
        selected.stats().records_matched
    );

    Ok(())
}

fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
