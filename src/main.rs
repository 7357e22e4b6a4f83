#![forbid(unsafe_code)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use similar::{ChangeTag, TextDiff};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use bundlegen::{GeneratedFile, GeneratorConfig, generate};

#[derive(Parser)]
#[command(
    name = "bundlegen",
    version,
    about = "Generate typed Python data bindings from a JSON schema document"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Python sources from a schema document
    Generate(GenerateArgs),
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Path to the JSON schema document
    #[arg(long)]
    schema: PathBuf,
    /// Output directory for generated sources
    #[arg(long)]
    out: PathBuf,
    /// Compare against existing files instead of writing; exits non-zero on
    /// drift
    #[arg(long)]
    check: bool,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => run_generate(&args),
    }
}

fn run_generate(args: &GenerateArgs) -> ExitCode {
    let schema_json = match fs::read_to_string(&args.schema) {
        Ok(contents) => contents,
        Err(err) => {
            eprintln!("Failed to read {}: {err}", args.schema.display());
            return ExitCode::FAILURE;
        }
    };

    let config = GeneratorConfig::standard();
    let files = match generate(&schema_json, &config) {
        Ok(files) => files,
        Err(err) => {
            eprintln!("Generation failed: {err}");
            return ExitCode::FAILURE;
        }
    };

    if args.check {
        check_files(&args.out, &files)
    } else {
        write_files(&args.out, &files)
    }
}

fn write_files(out: &Path, files: &[GeneratedFile]) -> ExitCode {
    for file in files {
        let path = out.join(&file.path);
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                eprintln!("Failed to create {}: {err}", parent.display());
                return ExitCode::FAILURE;
            }
        }
        if let Err(err) = fs::write(&path, &file.contents) {
            eprintln!("Failed to write {}: {err}", path.display());
            return ExitCode::FAILURE;
        }
    }
    info!(files = files.len(), out = %out.display(), "Wrote generated sources.");
    ExitCode::SUCCESS
}

/// Diff every generated file against the copy on disk, printing a unified
/// diff per drifted file.
fn check_files(out: &Path, files: &[GeneratedFile]) -> ExitCode {
    let mut drifted = 0usize;
    for file in files {
        let path = out.join(&file.path);
        let existing = fs::read_to_string(&path).unwrap_or_default();
        if existing == file.contents {
            continue;
        }
        drifted += 1;
        print!("{}", render_diff(&file.path, &existing, &file.contents));
    }
    if drifted > 0 {
        eprintln!("{drifted} file(s) out of date; rerun without --check to update");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn render_diff(rel_path: &str, existing: &str, new_content: &str) -> String {
    let diff = TextDiff::from_lines(existing, new_content);
    let mut output = String::new();

    output.push_str(&format!("--- {rel_path} (current)\n"));
    output.push_str(&format!("+++ {rel_path} (new)\n"));

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push_str("...\n");
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => "-",
                    ChangeTag::Insert => "+",
                    ChangeTag::Equal => " ",
                };
                output.push_str(sign);
                output.push_str(change.value());
                if change.missing_newline() {
                    output.push('\n');
                }
            }
        }
    }
    output
}

fn init_tracing() {
    // BUNDLEGEN_LOG controls log level: "trace", "debug", "info", "warn",
    // "error" or a full tracing filter spec like "bundlegen=debug"
    let filter = match std::env::var("BUNDLEGEN_LOG") {
        Ok(level) if is_plain_level(&level) => format!("bundlegen={level}"),
        Ok(spec) => spec,
        Err(_) => "bundlegen=info".to_string(),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
