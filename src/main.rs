mod cmd;
mod progress;

use clap::{ArgAction, Parser};
use html2md_batch::logging::init_logging;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "html2md-batch")]
#[command(version)]
#[command(about = "Convert every *.html file in a directory to Markdown", long_about = None)]
struct Cli {
    /// Directory to scan for *.html files (default: $HTML2MD_SOURCE)
    source: Option<PathBuf>,

    /// Directory to write *.md files into, created if missing (default: $HTML2MD_DEST)
    destination: Option<PathBuf>,

    /// Converter executable, run as `<TOOL> <file.html>` (default: $HTML2MD_TOOL or html2text)
    #[arg(short, long)]
    tool: Option<String>,

    /// Number of files to convert in parallel (default: $HTML2MD_JOBS or 1)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// List planned conversions without running the converter
    #[arg(long)]
    dry_run: bool,

    /// Exit with status 3 if any file failed to convert
    #[arg(long)]
    strict: bool,

    /// Print the batch report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only print failures and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = cmd::convert(cmd::ConvertArgs {
        source: cli.source,
        destination: cli.destination,
        tool: cli.tool,
        jobs: cli.jobs,
        dry_run: cli.dry_run,
        strict: cli.strict,
        json: cli.json,
        quiet: cli.quiet,
    });

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}
