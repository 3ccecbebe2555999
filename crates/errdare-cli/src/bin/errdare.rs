//! CLI binary for running the errdare cleanup dares.
//!
//! Runs each selected dare's solution through every combination of faults
//! and aborts and prints a report per dare.
//!
//! # Usage
//!
//! ```bash
//! # Check the reference solutions under relaxed policy
//! errdare run
//!
//! # Run the naive solutions and fail on every violation
//! errdare run --solution naive --strict-dares
//!
//! # One dare, strictest policy, with a JSON export
//! errdare run --dare tricky-catch --pedantic --output tricky.json
//!
//! # Print a saved export
//! errdare show tricky.json
//!
//! # List the dares
//! errdare list
//! ```
//!
//! Flags left unset on the command line fall back to the `ERRDARE_*`
//! environment variables.
//!
//! The process exits with status 1 when any run has a non-skipped violation.

use clap::{Parser, Subcommand};
use errdare_cli::export::{load_export, save_export, SessionExport};
use errdare_cli::session::{has_failures, run_session, SessionConfig};
use errdare_dares::{Dare, DareFlags, Solution};
use errdare_sim::format_report;

#[derive(Parser)]
#[command(name = "errdare")]
#[command(about = "Exhaustive fault and abort simulation for cleanup code")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run dares.
    Run {
        /// Dare to run: "all", "cloud-storage", "pipe-convert" or "tricky-catch".
        #[arg(short, long, default_value = "all")]
        dare: String,

        /// Solution to run: "answer" or "naive".
        #[arg(short, long, default_value = "answer")]
        solution: String,

        /// Report violations of naive solutions as failures instead of skips.
        #[arg(long)]
        strict_dares: bool,

        /// Require the first abort to be the one passed to cleanup.
        #[arg(long)]
        panic_order: bool,

        /// Require every resource to be released when an abort escapes.
        #[arg(long)]
        panic_close: bool,

        /// Strictest policy; overrides --panic-order and --panic-close.
        #[arg(long)]
        pedantic: bool,

        /// Write a JSON export of every run to this file.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Print a saved JSON export.
    Show {
        /// Path to the export file.
        path: String,
    },

    /// List the available dares.
    List,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            dare,
            solution,
            strict_dares,
            panic_order,
            panic_close,
            pedantic,
            output,
        } => {
            let env = DareFlags::from_env();
            let flags = DareFlags {
                enable_dare: strict_dares || env.enable_dare,
                panic_order: panic_order || env.panic_order,
                panic_close: panic_close || env.panic_close,
                pedantic: pedantic || env.pedantic,
            };
            let session = SessionConfig {
                dares: parse_dares(&dare),
                solution: parse_solution(&solution),
                flags,
            };
            cmd_run(session, output);
        }
        Commands::Show { path } => cmd_show(&path),
        Commands::List => cmd_list(),
    }
}

fn parse_dares(name: &str) -> Vec<Dare> {
    if name == "all" {
        return Dare::ALL.to_vec();
    }
    match Dare::ALL.into_iter().find(|d| d.name() == name) {
        Some(dare) => vec![dare],
        None => {
            eprintln!("Error: unknown dare: {}", name);
            eprintln!("Run `errdare list` to see the available dares.");
            std::process::exit(1);
        }
    }
}

fn parse_solution(name: &str) -> Solution {
    match name {
        "answer" => Solution::Answer,
        "naive" => Solution::Naive,
        other => {
            eprintln!("Error: unknown solution: {} (expected answer or naive)", other);
            std::process::exit(1);
        }
    }
}

fn cmd_run(session: SessionConfig, output: Option<String>) {
    let config = session.config();

    eprintln!("═══════════════════════════════════════════════════════════════════════");
    eprintln!("  errdare");
    eprintln!("═══════════════════════════════════════════════════════════════════════");
    eprintln!();
    eprintln!("Configuration:");
    eprintln!("  Solution:           {}", session.solution);
    eprintln!(
        "  Dares:              {}",
        session
            .dares
            .iter()
            .map(|d| d.name())
            .collect::<Vec<_>>()
            .join(", ")
    );
    eprintln!("  Ignore abort order: {}", config.ignore_abort_order);
    eprintln!("  Release on abort:   {}", config.require_release_on_abort);
    eprintln!("  Soft fail:          {}", config.soft_fail);
    if let Some(ref path) = output {
        eprintln!("  Output:             {}", path);
    }
    eprintln!();

    let runs = run_session(&session);

    for run in &runs {
        println!("{}", format_report(&run.name(), &run.report));
    }

    if let Some(path) = output {
        let export = SessionExport::from_runs(&runs);
        match save_export(&path, &export) {
            Ok(()) => eprintln!("Saved export to: {}", path),
            Err(e) => eprintln!("Warning: failed to save export: {}", e),
        }
    }

    if has_failures(&runs) {
        std::process::exit(1);
    }
}

fn cmd_show(path: &str) {
    let export = match load_export(path) {
        Ok(export) => export,
        Err(e) => {
            eprintln!("Error: failed to load export {}: {}", path, e);
            std::process::exit(1);
        }
    };

    println!("Export version {}: {} runs", export.version, export.runs.len());
    for run in &export.runs {
        let status = if run.passed { "PASS" } else { "FAIL" };
        println!(
            "  [{}] {}/{} ({} executions, {} violations)",
            status,
            run.dare,
            run.solution,
            run.executions,
            run.violations.len()
        );
        for v in &run.violations {
            let tag = if v.skipped { "SKIP" } else { "FAIL" };
            println!("      [{}] {}:{}", tag, v.execution, v.message);
        }
    }

    if export.failed_runs() > 0 {
        std::process::exit(1);
    }
}

fn cmd_list() {
    for dare in Dare::ALL {
        println!("  {:<14} {}", dare.name(), dare.description());
    }
}
