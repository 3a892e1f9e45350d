//! docfill CLI - fill in highlighted fields of Word documents
//!
//! Lists the shaded spans of a `.docx` template, asks for their values and
//! writes a filled-in copy.

mod prompt;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::*;
use docfill::{Compression, RunId, Session, SessionOptions};
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use prompt::TerminalPrompt;

/// Fill in highlighted fields of Word documents
#[derive(Parser)]
#[command(
    name = "docfill",
    author = "iyulab",
    version,
    about = "Fill in highlighted fields of Word documents",
    long_about = "docfill - find the shaded fields of a .docx template, \
                  replace their text and write a new document.\n\n\
                  Every other part of the document is copied unchanged."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the highlighted fields of a document
    #[command(visible_alias = "ls")]
    Fields {
        /// Input file path
        input: PathBuf,

        /// Output JSON instead of a list
        #[arg(long)]
        json: bool,

        /// List every highlighted run with its position id
        #[arg(long)]
        runs: bool,
    },

    /// Replace highlighted fields and write a new document
    Fill {
        /// Input file path
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Replacement as FIELD=VALUE (repeatable; FIELD is a run id with --by-run)
        #[arg(short, long = "set", value_name = "FIELD=VALUE")]
        set: Vec<String>,

        /// JSON file with an object of field -> value
        #[arg(short, long)]
        map: Option<PathBuf>,

        /// Key replacements by run position instead of by text
        #[arg(long)]
        by_run: bool,

        /// Expand into this directory and keep it afterwards
        #[arg(long)]
        workdir: Option<PathBuf>,

        /// Main document part
        #[arg(long, default_value = "word/document.xml")]
        part: String,

        /// Indentation of the rewritten part, 0 to 8 spaces (0 disables pretty-printing)
        #[arg(long, default_value = "2", value_parser = clap::value_parser!(u8).range(0..=8))]
        indent: u8,

        /// Output compression
        #[arg(long, default_value = "deflated")]
        compression: CompressionMode,
    },

    /// Number every element's text, for suggesting fields with a text generator
    Outline {
        /// Input file path
        input: PathBuf,

        /// Print a ready-made prompt instead of the bare list
        #[arg(long)]
        prompt: bool,

        /// Output JSON
        #[arg(long, conflicts_with = "prompt")]
        json: bool,
    },

    /// Show version information
    Version,
}

/// Output compression
#[derive(Clone, ValueEnum)]
enum CompressionMode {
    /// Deflate every entry
    Deflated,
    /// Store entries uncompressed
    Stored,
}

impl From<CompressionMode> for Compression {
    fn from(mode: CompressionMode) -> Self {
        match mode {
            CompressionMode::Deflated => Compression::Deflated,
            CompressionMode::Stored => Compression::Stored,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    let _ = env_logger::builder()
        .filter_module("docfill", level)
        .parse_default_env()
        .try_init();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Fields { input, json, runs } => {
            let pb = create_spinner("Reading document...");
            let session = Session::open(&input, SessionOptions::default())?;
            pb.finish_and_clear();

            if runs {
                let runs = session.runs();
                if json {
                    println!("{}", serde_json::to_string_pretty(&runs)?);
                } else {
                    for run in &runs {
                        println!("{} {}", run.id.to_string().dimmed(), run.text);
                    }
                }
            } else {
                let fields = session.fields();
                if json {
                    println!("{}", serde_json::to_string_pretty(&fields)?);
                } else if fields.is_empty() {
                    println!("{} No highlighted fields found", "!".yellow().bold());
                } else {
                    for field in &fields {
                        println!("{}", field);
                    }
                }
            }
        }

        Commands::Fill {
            input,
            output,
            set,
            map,
            by_run,
            workdir,
            part,
            indent,
            compression,
        } => {
            let mut options = SessionOptions::new()
                .with_part(part)
                .with_indent(usize::from(indent))
                .with_compression(compression.into());
            if let Some(dir) = workdir {
                options = options.with_workdir(dir);
            }

            let pb = create_spinner("Reading document...");
            let mut session = Session::open(&input, options)?;
            pb.finish_and_clear();

            let mut values = match map {
                Some(path) => read_map(&path)?,
                None => HashMap::new(),
            };
            values.extend(parse_assignments(&set)?);

            let patched = if values.is_empty() && !by_run {
                session.fill_with(&mut TerminalPrompt::stdio(), &output)?
            } else {
                let patched = if by_run {
                    session.apply_runs(&run_keys(values)?)
                } else {
                    session.apply(&values)
                };
                let pb = create_spinner("Writing document...");
                session.save(&output)?;
                pb.finish_and_clear();
                patched
            };

            println!(
                "{} Replaced {} runs, wrote {}",
                "✓".green().bold(),
                patched,
                output.display()
            );
        }

        Commands::Outline {
            input,
            prompt,
            json,
        } => {
            let session = Session::open(&input, SessionOptions::default())?;
            let entries = session.outline();
            if prompt {
                print!("{}", docfill::outline::suggestion_prompt(&entries));
            } else if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    println!("{}. {}", entry.index, entry.text);
                }
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Parse `FIELD=VALUE` pairs. The value may itself contain `=`.
fn parse_assignments(pairs: &[String]) -> Result<HashMap<String, String>, String> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok((key.trim().to_string(), value.to_string()))
            }
            _ => Err(format!("expected FIELD=VALUE, got '{}'", pair)),
        })
        .collect()
}

/// Read a JSON object of field -> value.
fn read_map(path: &Path) -> Result<HashMap<String, String>, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let map: HashMap<String, String> = serde_json::from_str(&content)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(map)
}

/// Interpret keys as run ids (`3` or `#3`).
fn run_keys(values: HashMap<String, String>) -> Result<HashMap<RunId, String>, String> {
    values
        .into_iter()
        .map(|(key, value)| {
            key.trim_start_matches('#')
                .parse::<usize>()
                .map(|id| (RunId(id), value))
                .map_err(|_| format!("'{}' is not a run id", key))
        })
        .collect()
}

fn print_version() {
    println!("{} {}", "docfill".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Fill in highlighted fields of Word documents");
    println!();
    println!("Repository: https://github.com/iyulab/docfill");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
