mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use cmd::{
    config::ConfigSubcommand, phase::PhaseSubcommand, refactor::RefactorSubcommand,
    spec::SpecSubcommand,
};
use std::path::PathBuf;
use tdd_core::types::TestResult;

#[derive(Parser)]
#[command(
    name = "tdd-ai",
    about = "Red-green-refactor state tracker for AI coding agents",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .tdd-ai.json or .git/)
    #[arg(long, global = true, env = "TDD_AI_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Output format (default: text on a terminal, json when piped)
    #[arg(long, global = true, value_enum, env = "TDD_AI_FORMAT")]
    format: Option<output::Format>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new TDD session in the project root
    Init {
        /// Add tests to existing code: red expects passing tests, green is skipped
        #[arg(long, conflicts_with = "greenfield")]
        retrofit: bool,

        /// Drive new code test-first (the default unless configured otherwise)
        #[arg(long)]
        greenfield: bool,

        /// Test command shown to the agent in guidance
        #[arg(long)]
        test_cmd: Option<String>,
    },

    /// Manage the spec list
    Spec {
        #[command(subcommand)]
        subcommand: SpecSubcommand,
    },

    /// Show the current phase, advance it, or override it
    Phase {
        #[command(subcommand)]
        subcommand: Option<PhaseSubcommand>,
    },

    /// Record the outcome of a test run
    Record {
        /// pass, fail or error
        #[arg(required_unless_present = "exit_code")]
        result: Option<TestResult>,

        /// Classify a run from its exit code instead of naming the result
        #[arg(long, conflicts_with = "result", allow_hyphen_values = true)]
        exit_code: Option<i32>,

        /// Captured test output, scanned for environment failures
        #[arg(long, requires = "exit_code")]
        log: Option<PathBuf>,

        /// Print only the tail of the captured output
        #[arg(long, requires = "log")]
        summary: bool,
    },

    /// Reflection questions for the refactor phase
    Refactor {
        #[command(subcommand)]
        subcommand: Option<RefactorSubcommand>,
    },

    /// List what prevents advancing to the next phase
    Blockers,

    /// Phase instructions, rules, and blockers for the agent
    Guide,

    /// Full session overview including history
    Status,

    /// Compact checkpoint with the single next action
    Resume,

    /// Finish the cycle: advance to done and complete all specs
    Complete {
        /// Test outcome to use instead of the recorded one
        #[arg(long)]
        test_result: Option<TestResult>,
    },

    /// Delete the session document
    Reset,

    /// Create, inspect, or validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Show all commands, flags, and the workflow in one call
    Commands,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    tracing::debug!(root = %root.display(), "resolved project root");
    let json = output::wants_json(cli.json, cli.format, std::io::stdout().is_terminal());

    let result = match cli.command {
        Commands::Init {
            retrofit,
            greenfield,
            test_cmd,
        } => cmd::init::run(&root, retrofit, greenfield, test_cmd, json),
        Commands::Spec { subcommand } => cmd::spec::run(&root, subcommand, json),
        Commands::Phase { subcommand } => cmd::phase::run(&root, subcommand, json),
        Commands::Record {
            result,
            exit_code,
            log,
            summary,
        } => cmd::record::run(&root, result, exit_code, log.as_deref(), summary, json),
        Commands::Refactor { subcommand } => cmd::refactor::run(&root, subcommand, json),
        Commands::Blockers => cmd::blockers::run(&root, json),
        Commands::Guide => cmd::guide::run(&root, json),
        Commands::Status => cmd::status::run(&root, json),
        Commands::Resume => cmd::resume::run(&root, json),
        Commands::Complete { test_result } => cmd::complete::run(&root, test_result, json),
        Commands::Reset => cmd::reset::run(&root, json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, json),
        Commands::Commands => cmd::commands::run(&root, json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
