use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use termination_writer::record::parse_assignment;
use termination_writer::{append_results, read_message, AppendOptions, ResultRecord, Settings};
use tracing_subscriber::EnvFilter;

mod cli;
use cli::{AppendArgs, Command, RootArgs, ShowArgs};

fn main() -> ExitCode {
    let args = RootArgs::parse();
    init_tracing(args.command.verbose());
    match run(args.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    let settings = Settings::from_env().context("load settings from environment")?;
    match command {
        Command::Append(args) => cmd_append(args, &settings),
        Command::Show(args) => cmd_show(args, &settings),
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_append(args: AppendArgs, settings: &Settings) -> Result<()> {
    let path = args.path.clone().unwrap_or_else(|| settings.path.clone());
    let options = AppendOptions {
        on_corrupt: args.on_corrupt.unwrap_or(settings.append.on_corrupt),
        write_mode: args.write_mode.unwrap_or(settings.append.write_mode),
        max_bytes: args.max_bytes.or(settings.append.max_bytes),
    };
    // Prior records stay opaque JSON so fields this crate does not model survive.
    let records = collect_records(&args)?
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<Value>, _>>()
        .context("encode result records")?;

    append_results(&path, &records, &options)
        .with_context(|| format!("append results to {}", path.display()))?;
    println!("appended {} record(s) to {}", records.len(), path.display());
    Ok(())
}

fn cmd_show(args: ShowArgs, settings: &Settings) -> Result<()> {
    let path = args.path.unwrap_or_else(|| settings.path.clone());
    let records =
        read_message(&path).with_context(|| format!("show results in {}", path.display()))?;
    if args.json {
        let text = serde_json::to_string_pretty(&records).context("serialize results")?;
        println!("{text}");
        return Ok(());
    }
    for record in &records {
        println!("{}={}", record.key, record.value);
    }
    Ok(())
}

/// Records from `--from-file` first, then one per `--result`, in argument order.
fn collect_records(args: &AppendArgs) -> Result<Vec<ResultRecord>> {
    let mut records = match &args.from_file {
        Some(path) => read_records_file(path)?,
        None => Vec::new(),
    };
    for raw in &args.results {
        let (key, value) = parse_assignment(raw)?;
        let mut record = ResultRecord::new(key, value).with_type(args.result_type.clone());
        if let Some(resource) = &args.resource {
            record = record.with_resource(resource.clone());
        }
        records.push(record);
    }
    Ok(records)
}

fn read_records_file(path: &Path) -> Result<Vec<ResultRecord>> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("read result records from stdin")?;
        text
    } else {
        std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?
    };
    serde_json::from_str(&text)
        .with_context(|| format!("parse result records from {}", path.display()))
}
