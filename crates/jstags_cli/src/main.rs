//! jstags: index JavaScript files into per-scope symbol tables.
//!
//! Usage:
//!   jstags [options] <file...>
//!
//! Each file's index is printed to stdout as JSON; diagnostics go to
//! stderr. `RUST_LOG` controls trace output.

use clap::Parser as ClapParser;
use jstags_core::text::LineMap;
use jstags_diagnostics::Diagnostic;
use jstags_indexer::{index_source, FileIndex, IndexError};
use jstags_scopes::ScopeKind;
use std::process;

#[derive(ClapParser, Debug)]
#[command(
    name = "jstags",
    about = "jstags - a per-scope JavaScript symbol indexer",
    disable_version_flag = true
)]
struct Cli {
    /// JavaScript files to index.
    #[arg(value_name = "FILE")]
    files: Vec<String>,

    /// Pretty-print the JSON output.
    #[arg(short, long)]
    pretty: bool,

    /// Print a per-scope summary instead of the full tables.
    #[arg(long)]
    list_scopes: bool,

    /// Suppress diagnostics on stderr.
    #[arg(short, long)]
    quiet: bool,

    /// Print the version.
    #[arg(short = 'v', long)]
    version: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.version {
        println!("jstags Version 0.1.0");
        return;
    }

    if cli.files.is_empty() {
        print_error("No input files given.");
        process::exit(1);
    }

    let mut exit_code = 0;
    for file in &cli.files {
        let source = match std::fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                print_error(&format!("Failed to read '{}': {}", file, e));
                exit_code = exit_code.max(1);
                continue;
            }
        };

        match index_source(file, &source) {
            Ok(index) => {
                if cli.list_scopes {
                    print_scope_summary(&index);
                } else {
                    print_index(&index, cli.pretty);
                }
            }
            Err(err) => {
                if !cli.quiet {
                    report_failure(&err, &source);
                }
                exit_code = exit_code.max(2);
            }
        }
    }

    process::exit(exit_code);
}

fn print_index(index: &FileIndex, pretty: bool) {
    let rendered = if pretty {
        serde_json::to_string_pretty(index)
    } else {
        serde_json::to_string(index)
    };
    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => print_error(&format!("Failed to serialize index: {}", e)),
    }
}

fn print_scope_summary(index: &FileIndex) {
    println!("{}:", index.file);
    for scope in &index.scopes {
        let kind = match scope.kind {
            ScopeKind::Global => "global",
            ScopeKind::Function => "function",
        };
        println!(
            "  {} [{}..{}): {} symbol(s)",
            kind,
            scope.range.pos,
            scope.range.end,
            scope.table.len()
        );
    }
}

fn report_failure(err: &IndexError, source: &str) {
    match err {
        IndexError::ParseFailed { diagnostics, .. } => {
            let line_map = LineMap::new(source);
            for diag in diagnostics.diagnostics() {
                print_diagnostic(diag, &line_map);
            }
            print_error(&err.to_string());
        }
        _ => print_error(&err.to_string()),
    }
}

fn print_diagnostic(diag: &Diagnostic, line_map: &LineMap) {
    let use_color = atty_is_terminal();
    let location = diag.range.map(|range| line_map.line_and_column_of(range.pos));
    if use_color {
        if let Some(ref file) = diag.file {
            eprint!("{}{}{}", CYAN, file, RESET);
            if let Some(lc) = location {
                eprint!("({},{})", lc.line + 1, lc.column + 1);
            }
            eprint!(": ");
        }
        eprintln!(
            "{}{}{}{} {}JT{}{}: {}",
            BOLD, RED, diag.category, RESET, CYAN, diag.code, RESET, diag.message_text
        );
    } else {
        if let Some(ref file) = diag.file {
            eprint!("{}", file);
            if let Some(lc) = location {
                eprint!("({},{})", lc.line + 1, lc.column + 1);
            }
            eprint!(": ");
        }
        eprintln!("{} JT{}: {}", diag.category, diag.code, diag.message_text);
    }
}

fn print_error(msg: &str) {
    if atty_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn atty_is_terminal() -> bool {
    // On Unix, check if stderr is a terminal
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
