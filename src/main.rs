use anyhow::{anyhow, Context, Result};
use clap::Parser;
use colored::Colorize;
use env_logger::Builder;
use hunkfold::{parse_diff_with_options, DiffLine, HunkParser, LineKind, ParseOptions};
use log::{error, info, warn, Level, LevelFilter};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

// --- Main Application Entry Point ---

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        // {:?} prints the full `anyhow` context chain.
        eprintln!("{} {:?}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Contains the primary logic of the application.
fn run(args: Args) -> Result<()> {
    setup_logging(args.verbose);

    let content = read_input(args.input_file.as_ref())?;
    let options = ParseOptions::builder()
        .collapse_identical(!args.no_collapse)
        .build();
    if !options.collapse_identical {
        info!("Folding of identical deletion/addition pairs disabled.");
    }

    let (lines, fail_count) = if args.keep_going {
        parse_skipping_failures(&content, options)
    } else {
        let lines = parse_diff_with_options(&content, &options)
            .with_context(|| format!("Failed to parse diff from {}", input_name(&args)))?;
        (lines, 0)
    };

    if lines.is_empty() && fail_count == 0 {
        info!("No diff lines found in {}.", input_name(&args));
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.json {
        serde_json::to_writer_pretty(&mut out, &lines).context("Failed to serialize lines")?;
        writeln!(out)?;
    } else {
        print_lines(&mut out, &lines)?;
    }
    out.flush()?;

    if fail_count > 0 {
        warn!("Output is incomplete: failing hunks were skipped.");
        return Err(anyhow!("Completed with {} unparsable hunk(s).", fail_count));
    }

    Ok(())
}

// --- Helper Structs and Functions ---

/// Defines the command-line arguments for the application.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Parse a unified diff into numbered lines, folding identical delete/add pairs into context.",
    long_about = "Reads the hunks of a single file's unified diff and prints each line with its old and new line numbers. A deletion and addition with identical text at the same position of a change block are shown as an unchanged line."
)]
struct Args {
    /// Path to the diff file. Reads from stdin when omitted or '-'.
    input_file: Option<PathBuf>,
    /// Print the lines as a JSON array instead of a table.
    #[arg(long)]
    json: bool,
    /// Keep identical deletion/addition pairs as separate changes.
    #[arg(long)]
    no_collapse: bool,
    /// Report and skip hunks that fail to parse instead of stopping at the first one.
    #[arg(short = 'k', long)]
    keep_going: bool,
    /// Increase logging verbosity. Can be used multiple times.
    /// -v for info, -vv for debug, -vvv for trace.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn input_name(args: &Args) -> String {
    match &args.input_file {
        Some(path) if path.as_os_str() != "-" => format!("'{}'", path.display()),
        _ => "stdin".to_string(),
    }
}

fn read_input(input_file: Option<&PathBuf>) -> Result<String> {
    match input_file {
        Some(path) if path.as_os_str() != "-" => fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file '{}'", path.display())),
        _ => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read diff from stdin")?;
            Ok(content)
        }
    }
}

/// Parses hunk by hunk, logging and skipping the ones that fail.
fn parse_skipping_failures(content: &str, options: ParseOptions) -> (Vec<DiffLine>, usize) {
    let mut lines = Vec::new();
    let mut fail_count = 0;
    for result in HunkParser::new(content, options) {
        match result {
            Ok(hunk_lines) => lines.extend(hunk_lines),
            Err(e) => {
                fail_count += 1;
                error!("Skipping hunk {}: {}", e.hunk_index(), e);
            }
        }
    }
    (lines, fail_count)
}

/// Writes one row per line: old number, new number, marker, content.
fn print_lines(out: &mut impl Write, lines: &[DiffLine]) -> io::Result<()> {
    let width = lines
        .iter()
        .flat_map(|l| [l.old_line_number, l.new_line_number])
        .flatten()
        .max()
        .map_or(1, |n| n.to_string().len());

    for line in lines {
        let old = line
            .old_line_number
            .map_or_else(String::new, |n| n.to_string());
        let new = line
            .new_line_number
            .map_or_else(String::new, |n| n.to_string());
        let text = format!("{}{}", line.marker(), line.content);
        let text = match line.kind {
            LineKind::Context => text.normal(),
            LineKind::Addition => text.green(),
            LineKind::Deletion => text.red(),
        };
        writeln!(out, "{:>width$} {:>width$} {}", old, new, text, width = width)?;
    }
    Ok(())
}

/// Sets up the global logger on stderr.
fn setup_logging(verbose: u8) {
    let log_level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| match record.level() {
            Level::Error => writeln!(buf, "{} {}", "error:".red().bold(), record.args()),
            Level::Warn => writeln!(buf, "{} {}", "warning:".yellow().bold(), record.args()),
            Level::Info => writeln!(buf, "{}", record.args()),
            Level::Debug => writeln!(buf, "{} {}", "debug:".blue().bold(), record.args()),
            Level::Trace => writeln!(buf, "{} {}", "trace:".cyan().bold(), record.args()),
        })
        .init();
}
