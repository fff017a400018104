//! Pact verifier CLI.
//!
//! The only place in the tree that reads the wall clock or touches the
//! filesystem on behalf of the core: every derivation below this layer
//! takes explicit inputs. Exit codes are part of the contract: 0 on
//! success, 2 when a verification-style command finds the input wanting.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod io;

/// Tool version stamped into packs and reports.
const TOOL_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "pact")]
#[command(about = "Protocol verifier and evidence engine for Pact transcripts", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose diagnostics (equivalent to RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a transcript's hash chain and signatures
    #[command(name = "verify-transcript")]
    VerifyTranscript {
        /// Transcript JSON file
        path: PathBuf,

        /// Print the full verification report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the canonical GC view for a transcript
    #[command(name = "gc-view")]
    GcView {
        /// Transcript JSON file
        path: PathBuf,
    },

    /// Print the blame judgment for a transcript
    Judge {
        /// Transcript JSON file
        path: PathBuf,
    },

    /// Seal an auditor pack
    #[command(name = "auditor-pack")]
    AuditorPack {
        /// Transcript JSON file
        #[arg(long)]
        transcript: PathBuf,

        /// Output ZIP path
        #[arg(long)]
        out: PathBuf,

        /// Constitution file; defaults to the embedded v1 rulebook
        #[arg(long)]
        constitution: Option<PathBuf>,

        /// Accept a rulebook outside the compiled-in set
        #[arg(long)]
        allow_nonstandard: bool,

        /// Embed a passport snapshot built over --transcripts-dir
        #[arg(long, requires = "transcripts_dir")]
        include_passport: bool,

        /// Transcript directories for the embedded passport snapshot
        #[arg(long)]
        transcripts_dir: Vec<PathBuf>,

        /// Embed the contention report
        #[arg(long)]
        include_contention: bool,

        /// Embed the outcome event log
        #[arg(long)]
        include_outcome_events: bool,
    },

    /// Re-verify a sealed auditor pack
    #[command(name = "auditor-pack-verify")]
    AuditorPackVerify {
        /// Pack ZIP path
        path: PathBuf,

        /// Accept a rulebook outside the compiled-in set
        #[arg(long)]
        allow_nonstandard: bool,
    },

    /// Recompute passport state over transcript directories
    #[command(name = "passport:v1:recompute")]
    PassportRecompute {
        /// One or more transcript directories
        #[arg(long, required = true)]
        transcripts_dir: Vec<PathBuf>,

        /// Restrict output to one signer
        #[arg(long)]
        signer: Option<String>,

        /// Write the registry JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Query a passport registry for one signer
    #[command(name = "passport:v1:query")]
    PassportQuery {
        /// Signer public key
        #[arg(long)]
        signer: String,

        /// Registry JSON produced by passport:v1:recompute
        #[arg(long, default_value = "passport-registry.json")]
        registry: PathBuf,
    },

    /// Anchor registry operations against a local store
    Anchor {
        #[command(subcommand)]
        command: commands::anchors::AnchorCommands,
    },

    /// Build a passport snapshot from transcripts and anchors
    Snapshot {
        /// One or more transcript directories
        #[arg(long, required = true)]
        transcripts_dir: Vec<PathBuf>,

        /// Anchor store JSON
        #[arg(long)]
        anchors: Option<PathBuf>,

        /// Sort keys recursively before hashing
        #[arg(long)]
        deterministic: bool,

        /// Write the snapshot JSON here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::VerifyTranscript { path, json } => commands::transcript::verify(&path, json),
        Commands::GcView { path } => commands::transcript::gc_view(&path),
        Commands::Judge { path } => commands::transcript::judge(&path),
        Commands::AuditorPack {
            transcript,
            out,
            constitution,
            allow_nonstandard,
            include_passport,
            transcripts_dir,
            include_contention,
            include_outcome_events,
        } => commands::pack::seal(commands::pack::SealArgs {
            transcript,
            out,
            constitution,
            allow_nonstandard,
            include_passport,
            transcripts_dir,
            include_contention,
            include_outcome_events,
        }),
        Commands::AuditorPackVerify {
            path,
            allow_nonstandard,
        } => commands::pack::verify(&path, allow_nonstandard),
        Commands::PassportRecompute {
            transcripts_dir,
            signer,
            out,
        } => commands::passport::recompute(&transcripts_dir, signer.as_deref(), out.as_deref()),
        Commands::PassportQuery { signer, registry } => {
            commands::passport::query(&signer, &registry)
        }
        Commands::Anchor { command } => commands::anchors::run(command),
        Commands::Snapshot {
            transcripts_dir,
            anchors,
            deterministic,
            out,
        } => commands::snapshot::build(
            &transcripts_dir,
            anchors.as_deref(),
            deterministic,
            out.as_deref(),
        ),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}
