//! The halc compiler CLI.
//!
//! Provides the `halcc` command with a single subcommand:
//!
//! - `halcc check <file>` - normalize, lex, and parse a `.halc` source file,
//!   reporting diagnostics and exiting non-zero on the first fatal error.
//!
//! Options:
//! - `-a`, `--track-allocs` - enable allocation-balance tracking over the
//!   whole compilation and report an imbalance at the end
//! - `-v`, `--verbose` - print a one-line summary of the parsed graph
//!   (segment count, diagnostic count) to stdout on success

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use halc_common::alloc::{AllocTracker, NullTracker};
use halc_diagnostics::Sink;

#[derive(Parser)]
#[command(name = "halcc", version, about = "The halc dialogue-graph compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize, lex, and parse a `.halc` source file
    Check {
        /// Path to the `.halc` source file
        file: PathBuf,

        /// Track allocation balance across the compilation
        #[arg(short = 'a', long = "track-allocs")]
        track_allocs: bool,

        /// Print a one-line summary of the parsed graph on success
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Check { file, track_allocs, verbose } => {
            let exit_code = check(&file, track_allocs, verbose);
            process::exit(exit_code);
        }
    }
}

/// Run the `check` subcommand. Returns the process exit code: `0` on a
/// clean or recoverably-diagnosed compile, the failing `ErrorKind`'s code
/// on a fatal error, matching the taxonomy's "non-zero error-kind value"
/// exit-code contract.
fn check(path: &std::path::Path, track_allocs: bool, verbose: bool) -> i32 {
    let raw = match std::fs::read(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("error: unable to open '{}': {e}", path.display());
            return halc_common::ErrorKind::UnableToOpenFile.exit_code();
        }
    };

    let filename = path.to_string_lossy().into_owned();
    let mut sink = Sink::stderr();
    let mut tracker = NullTracker::new();
    tracker.set_enabled(track_allocs);

    match halc::compile(&raw, &filename, &mut sink, &mut tracker) {
        Ok(graph) => {
            if verbose {
                println!(
                    "{}: {} top-level node(s), {} diagnostic(s)",
                    filename,
                    graph.children().len(),
                    sink.emitted().len()
                );
            }
            0
        }
        Err(e) => e.kind.exit_code(),
    }
}
