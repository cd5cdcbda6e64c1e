// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for aiexport.
//!
//! This binary provides the `aiexport` command for converting ChatGPT,
//! Claude and Gemini exports into one document per conversation.

use aiexport::config::{Config, ConfigError};
use aiexport::export::{self, ExportError};
use aiexport::platform::Platform;
use aiexport::renderer::RenderOptions;
use aiexport::report::TracingObserver;
use chrono::{DateTime, Utc};
use lexopt::prelude::*;
use snafu::{OptionExt, ensure, prelude::*};
use std::collections::HashSet;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::util::SubscriberInitExt;
use walkdir::WalkDir;

const INPUT_EXTENSIONS: [&str; 3] = ["json", "html", "htm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    const fn filter(self) -> &'static str {
        match self {
            Self::Quiet => "aiexport=warn",
            Self::Normal => "aiexport=info",
            Self::Verbose => "aiexport=debug",
        }
    }
}

struct Cli {
    input: Vec<PathBuf>,
    output: PathBuf,
    formats: Vec<String>,
    platform: Option<Platform>,
    config: Option<PathBuf>,
    user_name: Option<String>,
    ai_name: Option<String>,
    verbosity: Verbosity,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("at least one input file or directory is required"))]
    NoInputFiles,

    #[snafu(display("{source}"))]
    LoadConfig { source: ConfigError },

    #[snafu(display("invalid input filename: no file stem"))]
    InvalidFilename,

    #[snafu(display("{}: {source}", path.display()))]
    Export { path: PathBuf, source: ExportError },

    #[snafu(display("failed to create output directory {}: {source}", path.display()))]
    CreateOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert ChatGPT, Claude and Gemini exports to Markdown, HTML or text

Usage: {name} [OPTIONS] -o <OUTPUT> <INPUT>...

Arguments:
  <INPUT>...  Export files (.json, .html) or directories containing them

Options:
  -o, --output <OUTPUT>     Output directory
  -f, --format <FORMAT>     md, html or txt; repeat or comma-separate (default: md)
  -p, --platform <NAME>     Skip detection: chatgpt, claude or gemini
  -c, --config <FILE>       JSON file with detection rules and parser paths
      --user-name <NAME>    Display name for your messages (default: User)
      --ai-name <NAME>      Display name for AI messages (default: platform name)

Other options:
  -q, --quiet               Only report warnings and errors
  -v, --verbose             Report every conversation and document
  -n, --dry-run             Show what would be written without writing
      --force               Overwrite existing output files
  -h, --help                Print help
  -V, --version             Print version

Set RUST_LOG to override the log filter.",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input = Vec::new();
    let mut output: Option<PathBuf> = None;
    let mut formats = Vec::new();
    let mut platform = None;
    let mut config = None;
    let mut user_name = None;
    let mut ai_name = None;
    let mut verbosity = Verbosity::Normal;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => output = Some(parser.value()?.parse()?),
            Short('f') | Long("format") => {
                let value = parser.value()?.string()?;
                formats.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_owned),
                );
            }
            Short('p') | Long("platform") => platform = Some(parser.value()?.parse()?),
            Short('c') | Long("config") => config = Some(parser.value()?.parse()?),
            Long("user-name") => user_name = Some(parser.value()?.string()?),
            Long("ai-name") => ai_name = Some(parser.value()?.string()?),
            // Last one wins
            Short('q') | Long("quiet") => verbosity = Verbosity::Quiet,
            Short('v') | Long("verbose") => verbosity = Verbosity::Verbose,
            Short('n') | Long("dry-run") => dry_run = true,
            Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => input.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    if formats.is_empty() {
        formats.push("md".to_owned());
    }

    Ok(Cli {
        input,
        output: output.ok_or("missing required option: --output")?,
        formats,
        platform,
        config,
        user_name,
        ai_name,
        verbosity,
        dry_run,
        force,
    })
}

/// The compact log formatter, with ANSI colors only when `ansi` is set.
fn log_layer<S, W>(make_writer: W, ansi: bool) -> impl Layer<S>
where
    S: Subscriber + for<'span> LookupSpan<'span>,
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .with_writer(make_writer)
        .with_ansi(ansi)
        .with_target(false)
        .compact()
}

/// Sends log output to stderr, colored only on a terminal. `RUST_LOG` takes
/// precedence over the verbosity flags.
fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter()));

    tracing_subscriber::registry()
        .with(log_layer(std::io::stderr, std::io::stderr().is_terminal()))
        .with(filter)
        .init();
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_logging(cli.verbosity);

    ensure!(!cli.input.is_empty(), NoInputFilesSnafu);

    let config = match &cli.config {
        Some(path) => Config::load(path).context(LoadConfigSnafu)?,
        None => Config::default(),
    };

    // Collect all input files first
    let files = collect_input_files(&cli.input);
    ensure!(!files.is_empty(), NoInputFilesSnafu);

    // One timestamp for the whole run so every document agrees
    let exported_at = Utc::now();

    let out_dirs = output_dirs(&files, &cli.output)?;
    for (file, out_dir) in files.iter().zip(&out_dirs) {
        process_file(file, out_dir, &config, exported_at, &cli)?;
    }

    Ok(())
}

/// Collects all export files from the given inputs (files and directories).
fn collect_input_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file() && is_export_file(e.path()))
                .map(walkdir::DirEntry::into_path)
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    files
}

fn is_export_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| INPUT_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Picks the directory each input writes to.
///
/// A single input writes straight into `output`. Several inputs each get a
/// subdirectory named after the file stem; a stem seen before gets a `-2`,
/// `-3`, ... suffix so that two `conversations.json` exports never share a
/// directory.
fn output_dirs(files: &[PathBuf], output: &Path) -> Result<Vec<PathBuf>, Error> {
    if files.len() == 1 {
        return Ok(vec![output.to_path_buf()]);
    }

    let mut used = HashSet::new();
    let mut dirs = Vec::with_capacity(files.len());
    for file in files {
        let stem = file.file_stem().context(InvalidFilenameSnafu)?.to_string_lossy();
        let mut name = stem.to_string();
        let mut suffix = 2;
        while !used.insert(name.clone()) {
            name = format!("{stem}-{suffix}");
            suffix += 1;
        }
        dirs.push(output.join(name));
    }
    Ok(dirs)
}

/// Creates render options from CLI arguments and the detected platform.
fn make_render_options(cli: &Cli, platform: Platform, exported_at: DateTime<Utc>) -> RenderOptions {
    let mut opts = RenderOptions::for_platform(platform, exported_at);
    if let Some(name) = &cli.user_name {
        opts.user_name.clone_from(name);
    }
    if let Some(name) = &cli.ai_name {
        opts.assistant_name.clone_from(name);
    }
    opts
}

/// Converts one export file and writes its documents to `out_dir`.
fn process_file(
    input: &Path,
    out_dir: &Path,
    config: &Config,
    exported_at: DateTime<Utc>,
    cli: &Cli,
) -> Result<(), Error> {
    let mut observer = TracingObserver;

    let payload = export::load_payload(input).context(ExportSnafu { path: input })?;
    let extraction = export::extract(&payload, config, cli.platform, &mut observer)
        .context(ExportSnafu { path: input })?;

    let opts = make_render_options(cli, extraction.platform, exported_at);
    let formats: Vec<&str> = cli.formats.iter().map(String::as_str).collect();
    let documents =
        export::render_documents(&extraction.conversations, &formats, &opts, &mut observer);

    tracing::info!(
        input = %input.display(),
        conversations = extraction.conversations.len(),
        documents = documents.len(),
        "converted export"
    );

    if !cli.dry_run {
        std::fs::create_dir_all(out_dir).context(CreateOutputDirSnafu { path: out_dir })?;
    }

    for document in &documents {
        let out_path = out_dir.join(&document.file_name);

        // Handle dry-run mode
        if cli.dry_run {
            eprintln!("Would write {}", out_path.display());
            continue;
        }

        // Check if output exists and handle overwrite
        if out_path.exists() && !cli.force {
            eprintln!(
                "Skipping {} (already exists, use --force to overwrite)",
                out_path.display()
            );
            continue;
        }

        std::fs::write(&out_path, &document.body).context(WriteFileSnafu { path: &out_path })?;

        if cli.verbosity != Verbosity::Quiet {
            eprintln!("Wrote {}", out_path.display());
        }
    }

    Ok(())
}
