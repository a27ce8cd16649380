//! CLI argument parsing for the termination message sidecar.
//!
//! Flags left unset fall back to the `TERMWRITE_*` environment settings.
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use termination_writer::config::parse_max_bytes;
use termination_writer::{CorruptPriorPolicy, ResultType, WriteMode};

/// Root CLI entrypoint.
#[derive(Parser, Debug)]
#[command(
    name = "termwrite",
    version,
    about = "Record step results in a JSON termination message",
    after_help = "Examples:\n  termwrite append --path /tekton/termination --result digest=sha256:abc\n  termwrite append --from-file results.json --on-corrupt fail\n  termwrite show --path /tekton/termination --json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Append(AppendArgs),
    Show(ShowArgs),
}

impl Command {
    pub fn verbose(&self) -> bool {
        match self {
            Command::Append(args) => args.verbose,
            Command::Show(args) => args.verbose,
        }
    }
}

/// Append command inputs.
#[derive(Parser, Debug)]
#[command(about = "Append results to a termination message file")]
pub struct AppendArgs {
    /// Termination message file (defaults to $TERMWRITE_PATH or /tekton/termination)
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Result to record; repeat for several
    #[arg(
        long = "result",
        value_name = "KEY=VALUE",
        required_unless_present = "from_file"
    )]
    pub results: Vec<String>,

    /// JSON array of result records to append before any --result ("-" reads stdin)
    #[arg(long, value_name = "JSON")]
    pub from_file: Option<PathBuf>,

    /// Result type for --result records
    #[arg(long = "type", value_name = "TYPE", default_value = "task-run-result")]
    pub result_type: ResultType,

    /// Resource name attached to --result records
    #[arg(long, value_name = "NAME")]
    pub resource: Option<String>,

    /// Handling of existing content that is not a result array (discard|fail)
    #[arg(long, value_name = "POLICY")]
    pub on_corrupt: Option<CorruptPriorPolicy>,

    /// How the message is written (atomic|truncate)
    #[arg(long, value_name = "MODE")]
    pub write_mode: Option<WriteMode>,

    /// Refuse messages larger than N bytes ("kubernetes" for 4096)
    #[arg(long, value_name = "N", value_parser = parse_max_bytes)]
    pub max_bytes: Option<usize>,

    /// Emit debug logging to stderr
    #[arg(long)]
    pub verbose: bool,
}

/// Show command inputs.
#[derive(Parser, Debug)]
#[command(about = "Print the results stored in a termination message file")]
pub struct ShowArgs {
    /// Termination message file (defaults to $TERMWRITE_PATH or /tekton/termination)
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,

    /// Emit debug logging to stderr
    #[arg(long)]
    pub verbose: bool,
}
