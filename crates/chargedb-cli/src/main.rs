// crates/chargedb-cli/src/main.rs
// ============================================================================
// Module: chargedb CLI Entry Point
// Description: Command dispatcher for database export, import, transfer,
//              rename, and session deletion workflows.
// Purpose: Provide a safe command-line surface over the transfer and rename
//          engines with dry-run previews and destructive-op confirmation.
// Dependencies: chargedb-core, chargedb-sqlite, clap, thiserror.
// ============================================================================

//! ## Overview
//! The chargedb CLI wraps the library crates for operator use. Mutating
//! commands prompt for confirmation unless `--yes` is given, and every
//! command that mutates state offers `--dry-run` previews whose counts match
//! what the real run would report. Table names supplied on the command line
//! are untrusted and pass the identifier grammar before any statement is
//! built.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use chargedb_core::DirectiveOutcome;
use chargedb_core::EntityKind;
use chargedb_core::RenameDirective;
use chargedb_core::RenameOutcome;
use chargedb_core::TransferMode;
use chargedb_core::TransferSpec;
use chargedb_core::TransferWarning;
use chargedb_sqlite::Client;
use chargedb_sqlite::transfer;
use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "chargedb", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Export selected tables to a JSON envelope.
    Export(ExportCommand),
    /// Import a JSON envelope into a database.
    Import(ImportCommand),
    /// Transfer selected tables between two databases.
    Transfer(TransferCommand),
    /// Rename a loadpoint or vehicle across all its representations.
    Rename(RenameCommand),
    /// Delete the sessions recorded for an entity.
    Delete(DeleteCommand),
}

/// Coarse table selection.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum ModeArg {
    /// Configuration tables (settings, configs, caches).
    Config,
    /// Metrics tables (meters, sessions, grid_sessions).
    Metrics,
    /// Both table sets, configuration first.
    All,
}

impl From<ModeArg> for TransferMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Config => Self::Config,
            ModeArg::Metrics => Self::Metrics,
            ModeArg::All => Self::All,
        }
    }
}

/// Entity kind selection for rename and delete.
#[derive(ValueEnum, Copy, Clone, Debug, PartialEq, Eq)]
enum KindArg {
    /// Fixed charging location.
    Loadpoint,
    /// Mobile asset.
    Vehicle,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Loadpoint => Self::Loadpoint,
            KindArg::Vehicle => Self::Vehicle,
        }
    }
}

/// Shared table selection arguments.
#[derive(Args, Debug, Clone)]
struct SelectionArgs {
    /// Coarse table selection.
    #[arg(long, value_enum, default_value_t = ModeArg::Config)]
    mode: ModeArg,
    /// Explicit comma-separated table list (overrides --mode).
    #[arg(long, value_name = "TABLES", value_delimiter = ',')]
    tables: Vec<String>,
}

/// Arguments for `export`.
#[derive(Args, Debug)]
struct ExportCommand {
    /// Path to the source database file.
    #[arg(long, value_name = "PATH")]
    database: PathBuf,
    /// Output file for the JSON envelope (defaults to stdout).
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Table selection.
    #[command(flatten)]
    selection: SelectionArgs,
    /// Report per-table progress on stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Arguments for `import`.
#[derive(Args, Debug)]
struct ImportCommand {
    /// Path to the destination database file.
    #[arg(long, value_name = "PATH")]
    database: PathBuf,
    /// Input file holding the JSON envelope.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    /// Table selection.
    #[command(flatten)]
    selection: SelectionArgs,
    /// Skip the confirmation prompt.
    #[arg(long, action = ArgAction::SetTrue)]
    yes: bool,
    /// Report per-table progress on stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Arguments for `transfer`.
#[derive(Args, Debug)]
struct TransferCommand {
    /// Path to the source database file.
    #[arg(long, value_name = "PATH")]
    source: PathBuf,
    /// Path to the destination database file.
    #[arg(long, value_name = "PATH")]
    destination: PathBuf,
    /// Table selection.
    #[command(flatten)]
    selection: SelectionArgs,
    /// Rename a loadpoint after the copy (OLD=NEW, repeatable).
    #[arg(long = "rename-loadpoint", value_name = "OLD=NEW", action = ArgAction::Append)]
    rename_loadpoints: Vec<String>,
    /// Rename a vehicle after the copy (OLD=NEW, repeatable).
    #[arg(long = "rename-vehicle", value_name = "OLD=NEW", action = ArgAction::Append)]
    rename_vehicles: Vec<String>,
    /// Preview counts without writing to the destination.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Skip the confirmation prompt.
    #[arg(long, action = ArgAction::SetTrue)]
    yes: bool,
    /// Report per-table progress on stderr.
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Arguments for `rename`.
#[derive(Args, Debug)]
struct RenameCommand {
    /// Path to the database file.
    #[arg(long, value_name = "PATH")]
    database: PathBuf,
    /// Entity kind to rename.
    #[arg(long, value_enum, value_name = "KIND")]
    kind: KindArg,
    /// Current entity name.
    #[arg(long, value_name = "NAME")]
    old: String,
    /// New entity name.
    #[arg(long, value_name = "NAME")]
    new: String,
    /// Preview counts without writing.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
}

/// Arguments for `delete`.
#[derive(Args, Debug)]
struct DeleteCommand {
    /// Path to the database file.
    #[arg(long, value_name = "PATH")]
    database: PathBuf,
    /// Entity kind whose sessions to delete.
    #[arg(long, value_enum, value_name = "KIND")]
    kind: KindArg,
    /// Entity name whose sessions to delete.
    #[arg(long, value_name = "NAME")]
    name: String,
    /// Preview the affected count without deleting.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
    /// Skip the confirmation prompt.
    #[arg(long, action = ArgAction::SetTrue)]
    yes: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }

    /// Wraps any displayable failure.
    fn from_display(err: &impl std::fmt::Display) -> Self {
        Self::new(err.to_string())
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&format!("chargedb {version}"))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Export(command) => command_export(&command),
        Commands::Import(command) => command_import(&command),
        Commands::Transfer(command) => command_transfer(&command),
        Commands::Rename(command) => command_rename(&command),
        Commands::Delete(command) => command_delete(&command),
    }
}

/// Prints top-level help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Export Command
// ============================================================================

/// Executes the `export` command.
fn command_export(command: &ExportCommand) -> CliResult<ExitCode> {
    let client = Client::open(&command.database).map_err(|err| CliError::from_display(&err))?;
    let spec = build_spec(&command.selection, false, command.verbose, Vec::new(), Vec::new());

    let report = if let Some(path) = &command.output {
        let file = File::create(path).map_err(|err| {
            CliError::new(format!("failed to create {}: {err}", path.display()))
        })?;
        client
            .export_json(BufWriter::new(file), &spec)
            .map_err(|err| CliError::from_display(&err))?
    } else {
        // The envelope occupies stdout; keep the summary on stderr.
        let stdout = std::io::stdout();
        let report = client
            .export_json(BufWriter::new(stdout.lock()), &spec)
            .map_err(|err| CliError::from_display(&err))?;
        for outcome in &report.tables {
            write_stderr_line(&format!("exported {}: {} rows", outcome.table, outcome.rows))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        }
        return Ok(ExitCode::SUCCESS);
    };

    for outcome in &report.tables {
        write_stdout_line(&format!("exported {}: {} rows", outcome.table, outcome.rows))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Import Command
// ============================================================================

/// Executes the `import` command.
fn command_import(command: &ImportCommand) -> CliResult<ExitCode> {
    let prompt = format!(
        "import {} into {}? This overwrites matching rows.",
        command.input.display(),
        command.database.display()
    );
    if !confirm(&prompt, command.yes)? {
        return aborted();
    }

    let mut client = Client::open(&command.database).map_err(|err| CliError::from_display(&err))?;
    let file = File::open(&command.input).map_err(|err| {
        CliError::new(format!("failed to open {}: {err}", command.input.display()))
    })?;
    let spec = build_spec(&command.selection, false, command.verbose, Vec::new(), Vec::new());
    let report = client
        .import_json(BufReader::new(file), &spec)
        .map_err(|err| CliError::from_display(&err))?;

    print_warnings(&report.warnings)?;
    for outcome in &report.tables {
        write_stdout_line(&format!("imported {}: {} rows", outcome.table, outcome.rows))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Transfer Command
// ============================================================================

/// Executes the `transfer` command.
fn command_transfer(command: &TransferCommand) -> CliResult<ExitCode> {
    let loadpoint_renames = parse_pairs(&command.rename_loadpoints)?;
    let vehicle_renames = parse_pairs(&command.rename_vehicles)?;

    if !command.dry_run {
        let prompt = format!(
            "transfer tables from {} into {}? This overwrites matching rows.",
            command.source.display(),
            command.destination.display()
        );
        if !confirm(&prompt, command.yes)? {
            return aborted();
        }
    }

    let src = Client::open(&command.source).map_err(|err| CliError::from_display(&err))?;
    let mut dst = Client::open(&command.destination).map_err(|err| CliError::from_display(&err))?;
    let spec = build_spec(
        &command.selection,
        command.dry_run,
        command.verbose,
        loadpoint_renames,
        vehicle_renames,
    );
    let report = transfer(&src, &mut dst, &spec).map_err(|err| CliError::from_display(&err))?;

    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    print_warnings(&report.warnings)?;
    for outcome in &report.tables {
        write_stdout_line(&format!("{prefix}{}: {} rows", outcome.table, outcome.rows))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    for outcome in &report.loadpoint_renames {
        print_directive_outcome(prefix, "loadpoint", outcome)?;
    }
    for outcome in &report.vehicle_renames {
        print_directive_outcome(prefix, "vehicle", outcome)?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Rename Command
// ============================================================================

/// Executes the `rename` command.
fn command_rename(command: &RenameCommand) -> CliResult<ExitCode> {
    let directive = RenameDirective::new(&command.old, &command.new)
        .map_err(|err| CliError::from_display(&err))?;
    let kind = EntityKind::from(command.kind);

    let mut client = Client::open(&command.database).map_err(|err| CliError::from_display(&err))?;
    let (prefix, outcome) = if command.dry_run {
        let outcome = client
            .rename_entity_dry_run(kind, &directive)
            .map_err(|err| CliError::from_display(&err))?;
        ("[dry-run] ", outcome)
    } else {
        let outcome =
            client.rename_entity(kind, &directive).map_err(|err| CliError::from_display(&err))?;
        ("", outcome)
    };

    write_stdout_line(&format!(
        "{prefix}{kind} \"{}\" -> \"{}\": {}",
        directive.old(),
        directive.new_name(),
        format_outcome(&outcome)
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Delete Command
// ============================================================================

/// Executes the `delete` command.
fn command_delete(command: &DeleteCommand) -> CliResult<ExitCode> {
    let kind = EntityKind::from(command.kind);
    let client = Client::open(&command.database).map_err(|err| CliError::from_display(&err))?;

    let affected = client
        .count_sessions_for(kind, &command.name)
        .map_err(|err| CliError::from_display(&err))?;
    if command.dry_run {
        write_stdout_line(&format!(
            "[dry-run] would delete {affected} sessions for {kind} \"{}\"",
            command.name
        ))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let prompt = format!("delete {affected} sessions for {kind} \"{}\"?", command.name);
    if !confirm(&prompt, command.yes)? {
        return aborted();
    }

    let deleted = client
        .delete_sessions_for(kind, &command.name)
        .map_err(|err| CliError::from_display(&err))?;
    write_stdout_line(&format!("deleted {deleted} sessions for {kind} \"{}\"", command.name))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Spec And Directive Helpers
// ============================================================================

/// Builds a transfer spec from shared CLI arguments.
fn build_spec(
    selection: &SelectionArgs,
    dry_run: bool,
    verbose: bool,
    loadpoint_renames: Vec<RenameDirective>,
    vehicle_renames: Vec<RenameDirective>,
) -> TransferSpec {
    let mut spec = TransferSpec::new(selection.mode.into());
    spec.tables = selection.tables.clone();
    spec.dry_run = dry_run;
    spec.loadpoint_renames = loadpoint_renames;
    spec.vehicle_renames = vehicle_renames;
    if verbose {
        spec.on_progress = Some(Box::new(|table, rows| {
            let _ = write_stderr_line(&format!("{table}: {rows} rows"));
        }));
    }
    spec
}

/// Parses repeatable `OLD=NEW` rename arguments.
fn parse_pairs(pairs: &[String]) -> CliResult<Vec<RenameDirective>> {
    pairs.iter().map(|pair| parse_pair(pair)).collect()
}

/// Parses one `OLD=NEW` rename argument.
fn parse_pair(pair: &str) -> CliResult<RenameDirective> {
    let Some((old, new)) = pair.split_once('=') else {
        return Err(CliError::new(format!("expected OLD=NEW, got \"{pair}\"")));
    };
    RenameDirective::new(old, new).map_err(|err| CliError::from_display(&err))
}

// ============================================================================
// SECTION: Confirmation
// ============================================================================

/// Checks whether an answer line confirms a destructive operation.
fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Prompts for confirmation unless `--yes` was given.
fn confirm(prompt: &str, assume_yes: bool) -> CliResult<bool> {
    if assume_yes {
        return Ok(true);
    }
    let mut stderr = std::io::stderr();
    write!(&mut stderr, "{prompt} [y/N] ")
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    stderr.flush().map_err(|err| CliError::new(output_error("stderr", &err)))?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .map_err(|err| CliError::new(format!("failed to read confirmation: {err}")))?;
    Ok(is_affirmative(&answer))
}

/// Reports an aborted destructive command.
fn aborted() -> CliResult<ExitCode> {
    write_stdout_line("aborted, no changes made")
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Report Rendering
// ============================================================================

/// Formats a rename outcome's three per-representation counts.
fn format_outcome(outcome: &RenameOutcome) -> String {
    format!(
        "{} sessions, {} settings, {} configs",
        outcome.sessions, outcome.settings, outcome.configs
    )
}

/// Prints one rename directive's outcome line.
fn print_directive_outcome(
    prefix: &str,
    kind_label: &str,
    outcome: &DirectiveOutcome,
) -> CliResult<()> {
    write_stdout_line(&format!(
        "{prefix}{kind_label} \"{}\" -> \"{}\": {}",
        outcome.directive.old(),
        outcome.directive.new_name(),
        format_outcome(&outcome.outcome)
    ))
    .map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Prints transfer or import warnings on stderr.
fn print_warnings(warnings: &[TransferWarning]) -> CliResult<()> {
    for warning in warnings {
        let line = match warning {
            TransferWarning::MissingTable {
                table,
            } => format!("warning: destination has no table {table}, skipped"),
            TransferWarning::SkippedColumn {
                table,
                column,
            } => format!("warning: {table}.{column} is missing on the destination, data dropped"),
        };
        write_stderr_line(&line).map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(&format!("error: {message}"));
    ExitCode::FAILURE
}
