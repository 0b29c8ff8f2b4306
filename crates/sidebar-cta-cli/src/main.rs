// crates/sidebar-cta-cli/src/main.rs
// ============================================================================
// Module: Sidebar CTA CLI Entry Point
// Description: Command dispatcher for sidebar CTA payload and flag tooling.
// Purpose: Let operators check flag payloads before publishing them remotely.
// Dependencies: clap, serde, serde_json, sidebar-cta-config, sidebar-cta-core, thiserror.
// ============================================================================

//! ## Overview
//! The `sidebar-cta` CLI runs the same validation the desktop sidebar applies
//! to remotely configured CTA payloads. Operators use it to check a payload
//! before publishing it, to see how a flag value coerces, and to resolve the
//! CTA from local flag overrides.
//!
//! Exit codes: `0` when a CTA would render, `2` when it would be dropped,
//! `1` on usage, I/O, or config errors. Security posture: inputs are
//! untrusted and size-bounded.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use serde_json::Value;
use sidebar_cta_config::SidebarCtaConfig;
use sidebar_cta_core::CtaAuditSink;
use sidebar_cta_core::CtaPayload;
use sidebar_cta_core::CtaTargetKind;
use sidebar_cta_core::CtaValidator;
use sidebar_cta_core::FlagValue;
use sidebar_cta_core::StderrAuditSink;
use sidebar_cta_core::is_feature_flag_enabled;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum payload input size in bytes.
const MAX_PAYLOAD_BYTES: usize = 1024 * 1024;
/// Exit code used when no CTA would render.
const EXIT_NO_CTA: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "sidebar-cta", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// CTA payload utilities.
    Payload {
        /// Selected payload subcommand.
        #[command(subcommand)]
        command: PayloadCommand,
    },
    /// Feature flag utilities.
    Flag {
        /// Selected flag subcommand.
        #[command(subcommand)]
        command: FlagCommand,
    },
    /// Resolve the sidebar CTA from local flag overrides.
    Resolve(ResolveCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Payload subcommands.
#[derive(Subcommand, Debug)]
enum PayloadCommand {
    /// Validate a CTA payload and print its canonical form.
    Check(PayloadCheckCommand),
}

/// Arguments for `payload check`.
#[derive(Args, Debug)]
struct PayloadCheckCommand {
    /// JSON payload file (`-` or omitted reads stdin).
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
    /// Emit audit events to stderr.
    #[arg(long)]
    audit: bool,
}

/// Flag subcommands.
#[derive(Subcommand, Debug)]
enum FlagCommand {
    /// Print whether a flag value counts as enabled.
    Eval(FlagEvalCommand),
}

/// Arguments for `flag eval`.
#[derive(Args, Debug)]
struct FlagEvalCommand {
    /// Flag value; omitted means the flag is absent.
    value: Option<String>,
    /// Parse the value as JSON instead of a plain string.
    #[arg(long)]
    json: bool,
}

/// Arguments for `resolve`.
#[derive(Args, Debug)]
struct ResolveCommand {
    /// Config file path (defaults to `SIDEBAR_CTA_CONFIG` or `sidebar-cta.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a config file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Config file path (defaults to `SIDEBAR_CTA_CONFIG` or `sidebar-cta.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// Whether a command produced a renderable CTA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CtaStatus {
    /// A CTA would render (or the command has no CTA semantics).
    Rendered,
    /// No CTA would render.
    Dropped,
}

impl CtaStatus {
    /// Maps the status to a process exit code.
    fn exit_code(self) -> ExitCode {
        match self {
            Self::Rendered => ExitCode::SUCCESS,
            Self::Dropped => ExitCode::from(EXIT_NO_CTA),
        }
    }
}

/// Text to print and the resulting status.
#[derive(Debug)]
struct CommandOutput {
    /// Line written to stdout.
    text: String,
    /// Render status.
    status: CtaStatus,
}

/// JSON report for `resolve`.
#[derive(Serialize)]
struct ResolveReport<'a> {
    /// Flag key that was resolved.
    flag_key: &'a str,
    /// Navigation kind for the CTA link.
    target: CtaTargetKind,
    /// Canonical payload.
    payload: &'a CtaPayload,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing error messages.
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
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Errors returned by bounded reads.
#[derive(Debug)]
enum ReadLimitError {
    /// Read failure.
    Io(std::io::Error),
    /// Input exceeds the configured limit.
    TooLarge {
        /// Allowed limit in bytes.
        limit: usize,
    },
}

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
    let output = match cli.command {
        Commands::Payload {
            command: PayloadCommand::Check(command),
        } => command_payload_check(&command)?,
        Commands::Flag {
            command: FlagCommand::Eval(command),
        } => command_flag_eval(&command)?,
        Commands::Resolve(command) => command_resolve(&command)?,
        Commands::Config {
            command: ConfigCommand::Validate(command),
        } => command_config_validate(&command)?,
    };
    write_stdout_line(&output.text).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(output.status.exit_code())
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `payload check`.
fn command_payload_check(command: &PayloadCheckCommand) -> CliResult<CommandOutput> {
    let path = command.input.as_deref().filter(|path| *path != Path::new("-"));
    let bytes = match path {
        Some(path) => File::open(path)
            .map_err(ReadLimitError::Io)
            .and_then(|file| read_with_limit(file, MAX_PAYLOAD_BYTES)),
        None => read_with_limit(std::io::stdin().lock(), MAX_PAYLOAD_BYTES),
    }
    .map_err(|err| read_error("payload", &err))?;
    let validator = if command.audit {
        CtaValidator::new(Arc::new(StderrAuditSink))
    } else {
        CtaValidator::default()
    };
    check_payload(&bytes, &validator)
}

/// Executes `flag eval`.
fn command_flag_eval(command: &FlagEvalCommand) -> CliResult<CommandOutput> {
    let enabled = eval_flag(command.value.as_deref(), command.json)?;
    Ok(CommandOutput {
        text: enabled.to_string(),
        status: CtaStatus::Rendered,
    })
}

/// Executes `resolve`.
fn command_resolve(command: &ResolveCommand) -> CliResult<CommandOutput> {
    let config = SidebarCtaConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let audit = config.audit_sink().map_err(|err| CliError::new(err.to_string()))?;
    resolve_cta(&config, audit)
}

/// Executes `config validate`.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<CommandOutput> {
    SidebarCtaConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    Ok(CommandOutput {
        text: "ok".to_string(),
        status: CtaStatus::Rendered,
    })
}

// ============================================================================
// SECTION: Command Logic
// ============================================================================

/// Validates raw payload bytes and renders the canonical payload or `null`.
fn check_payload(bytes: &[u8], validator: &CtaValidator) -> CliResult<CommandOutput> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|err| CliError::new(format!("payload is not valid json: {err}")))?;
    match validator.parse(None, &value) {
        Some(cta) => Ok(CommandOutput {
            text: to_json(&cta)?,
            status: CtaStatus::Rendered,
        }),
        None => Ok(dropped()),
    }
}

/// Coerces a CLI flag argument into its enabled state.
fn eval_flag(value: Option<&str>, json: bool) -> CliResult<bool> {
    let flag = match (value, json) {
        (None, _) => None,
        (Some(raw), false) => Some(FlagValue::from(raw)),
        (Some(raw), true) => {
            let parsed: Value = serde_json::from_str(raw)
                .map_err(|err| CliError::new(format!("flag value is not valid json: {err}")))?;
            FlagValue::from_json(&parsed)
        }
    };
    Ok(is_feature_flag_enabled(flag.as_ref()))
}

/// Resolves the configured CTA flag from local overrides.
fn resolve_cta(
    config: &SidebarCtaConfig,
    audit: Arc<dyn CtaAuditSink>,
) -> CliResult<CommandOutput> {
    let validator = CtaValidator::new(audit);
    let flag_key = config.cta.flag_key.as_str();
    let Some(cta) = validator.resolve_from(&config.flag_source(), flag_key) else {
        return Ok(dropped());
    };
    let target = if cta.target().is_internal() {
        CtaTargetKind::Internal
    } else {
        CtaTargetKind::External
    };
    let report = ResolveReport {
        flag_key,
        target,
        payload: &cta,
    };
    Ok(CommandOutput {
        text: to_json(&report)?,
        status: CtaStatus::Rendered,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Output for a dropped CTA.
fn dropped() -> CommandOutput {
    CommandOutput {
        text: "null".to_string(),
        status: CtaStatus::Dropped,
    }
}

/// Serializes a value as compact JSON.
fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string(value)
        .map_err(|err| CliError::new(format!("json serialization failed: {err}")))
}

/// Reads from `reader` while enforcing a hard size limit.
fn read_with_limit(reader: impl Read, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        limit: max_bytes,
    })?;
    let mut limited = reader.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Formats a bounded read failure.
fn read_error(kind: &str, error: &ReadLimitError) -> CliError {
    match error {
        ReadLimitError::Io(err) => CliError::new(format!("failed to read {kind}: {err}")),
        ReadLimitError::TooLarge {
            limit,
        } => CliError::new(format!("{kind} exceeds size limit ({limit} bytes)")),
    }
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
