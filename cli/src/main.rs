mod output;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pane_diff::{
    compare_views, CompareOptions, CompareResult, MemoryHost, NoProgress, ViewId,
};

#[derive(Parser)]
#[command(name = "pane-diff")]
#[command(about = "Compare two text files side by side")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run a full block/line/character comparison")]
    Compare {
        #[arg(help = "Path to the old file")]
        old: String,
        #[arg(help = "Path to the new file")]
        new: String,
        #[command(flatten)]
        flags: CompareFlags,
        #[arg(long, short, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
        #[arg(long, short, help = "Quiet mode: only show the verdict")]
        quiet: bool,
    },
    #[command(about = "Mark lines that have no equal twin in the other file")]
    Unique {
        #[arg(help = "Path to the old file")]
        old: String,
        #[arg(help = "Path to the new file")]
        new: String,
        #[command(flatten)]
        flags: CompareFlags,
        #[arg(long, short, value_enum, default_value = "text", help = "Output format")]
        format: OutputFormat,
        #[arg(long, short, help = "Quiet mode: only show the verdict")]
        quiet: bool,
    },
}

#[derive(Args)]
pub struct CompareFlags {
    #[arg(long, help = "Case-fold text before comparing")]
    pub ignore_case: bool,
    #[arg(long, help = "Ignore space and tab characters")]
    pub ignore_spaces: bool,
    #[arg(long, help = "Drop empty lines from the comparison")]
    pub ignore_empty_lines: bool,
    #[arg(long, help = "Recognize moved line blocks")]
    pub detect_moves: bool,
    #[arg(long, help = "Refine changed words to character precision")]
    pub char_precision: bool,
    #[arg(
        long,
        default_value_t = 0,
        value_parser = clap::value_parser!(u32).range(0..=100),
        help = "Similarity threshold in percent for pairing changed lines"
    )]
    pub threshold: u32,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compare {
            old,
            new,
            flags,
            format,
            quiet,
        } => run(&old, &new, &flags, false, format, quiet),
        Commands::Unique {
            old,
            new,
            flags,
            format,
            quiet,
        } => run(&old, &new, &flags, true, format, quiet),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(
    old_path: &str,
    new_path: &str,
    flags: &CompareFlags,
    find_unique_mode: bool,
    format: OutputFormat,
    quiet: bool,
) -> Result<ExitCode> {
    let old_text = std::fs::read_to_string(old_path)
        .with_context(|| format!("Failed to read old file: {}", old_path))?;
    let new_text = std::fs::read_to_string(new_path)
        .with_context(|| format!("Failed to read new file: {}", new_path))?;

    let options = CompareOptions {
        find_unique_mode,
        detect_moves: flags.detect_moves,
        ignore_case: flags.ignore_case,
        ignore_spaces: flags.ignore_spaces,
        ignore_empty_lines: flags.ignore_empty_lines,
        char_precision: flags.char_precision,
        match_percent_threshold: flags.threshold,
        old_file_view: ViewId::Main,
        ..CompareOptions::default()
    };

    let mut host = MemoryHost::new(&old_text, &new_text);
    let (result, alignment) = compare_views(&mut host, &options, &NoProgress);

    if result == CompareResult::Error {
        for message in host.messages() {
            eprintln!("{}", message);
        }
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => {
            output::write_text_report(&mut out, &host, old_path, new_path, result, quiet)?
        }
        OutputFormat::Json => {
            output::write_json_report(&mut out, &host, result, &alignment)?
        }
    }

    Ok(match result {
        CompareResult::Match => ExitCode::SUCCESS,
        CompareResult::Mismatch => ExitCode::from(1),
        CompareResult::Cancelled | CompareResult::Error => ExitCode::from(2),
    })
}
