//! bcv - compile a source file and view its disassembly or raw bytes.
//!
//! A thin presentation layer over the `bcv-build` pipeline: it submits one
//! build to the scheduler, observes status transitions, and renders the
//! outcome. The source comes from a file argument or from the persisted
//! session.

mod session;

use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use eyre::{Result, WrapErr, bail, eyre};
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use bcv_build::pipeline::{BuildOutcome, BuildPipeline, BuildRequest};
use bcv_build::scheduler::{Scheduler, Submission};
use bcv_build::toolchain::ToolchainConfig;

/// bcv - bytecode viewer
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a source file and print its disassembly
    Build(BuildArgs),
    /// Remove leftover scratch directories
    Clean,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Source file; the saved session is used when omitted
    file: Option<Utf8PathBuf>,

    /// Print the binary hex pane instead of the disassembly
    #[arg(long)]
    hex: bool,

    /// Ask the disassembler for verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Explicit target name (derived from the source when omitted)
    #[arg(long)]
    target: Option<String>,

    /// Compiler program
    #[arg(long, default_value = "javac")]
    compiler: String,

    /// Disassembler program
    #[arg(long, default_value = "javap")]
    disassembler: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing from RUST_LOG (e.g. RUST_LOG=bcv_build=debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => cmd_build(args).await,
        Command::Clean => cmd_clean(),
    }
}

fn bcv_home() -> Result<Utf8PathBuf> {
    // Check BCV_HOME first, then fall back to ~/.bcv
    if let Ok(home) = std::env::var("BCV_HOME") {
        return Ok(Utf8PathBuf::from(home));
    }

    let home = std::env::var("HOME").map_err(|_| eyre!("HOME not set"))?;
    Ok(Utf8PathBuf::from(home).join(".bcv"))
}

async fn cmd_build(args: BuildArgs) -> Result<()> {
    let home = bcv_home()?;

    let source_text = match &args.file {
        Some(path) => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {path}"))?,
        None => session::load(&home),
    };

    let mut toolchain = ToolchainConfig::java();
    toolchain.compiler = args.compiler.clone();
    toolchain.disassembler = args.disassembler.clone();

    let pipeline = BuildPipeline::new(toolchain, home.join("scratch"));
    let scheduler = Arc::new(Scheduler::new(pipeline));

    // Ctrl-C cancels the in-flight job instead of abandoning its artifacts.
    let on_interrupt = scheduler.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.shutdown();
        }
    });

    let mut status_rx = scheduler.subscribe_status();
    tokio::spawn(async move {
        while status_rx.changed().await.is_ok() {
            debug!(status = ?*status_rx.borrow(), "job status");
        }
    });

    let shown = args
        .file
        .as_ref()
        .map(|p| p.as_str())
        .unwrap_or("(session)");
    println!("{} {}", "Compiling".green().bold(), shown);

    let request = BuildRequest {
        target_name: args.target.clone(),
        source_text: source_text.clone(),
        verbose: args.verbose,
    };

    let outcome = match scheduler.submit(request) {
        Submission::Accepted(rx) => rx
            .await
            .wrap_err("build worker dropped its job")??,
        Submission::Busy | Submission::Clean | Submission::ShutDown => {
            bail!("scheduler refused the build request")
        }
    };

    // The next launch reopens whatever was built last.
    session::save(&home, &source_text);

    match outcome {
        BuildOutcome::Success {
            disassembly,
            binary_hex,
        } => {
            println!("{}", "Finished".green().bold());
            if args.hex {
                print!("{binary_hex}");
            } else {
                print!("{disassembly}");
            }
            Ok(())
        }
        BuildOutcome::CompileError { message } => {
            eprint!("{message}");
            bail!("compilation failed")
        }
        BuildOutcome::DisassembleError { message } => {
            eprint!("{message}");
            bail!("disassembly failed")
        }
        BuildOutcome::Cancelled => {
            println!("{}", "Cancelled".yellow().bold());
            Ok(())
        }
    }
}

fn cmd_clean() -> Result<()> {
    let home = bcv_home()?;
    let scratch = home.join("scratch");

    if scratch.exists() {
        std::fs::remove_dir_all(&scratch)
            .wrap_err_with(|| format!("failed to remove {scratch}"))?;
        println!("{} {}", "Removed".green().bold(), scratch);
    } else {
        println!("{} {} does not exist", "Note:".yellow().bold(), scratch);
    }

    Ok(())
}
