//! Command dispatch: one handler per subcommand
//!
//! Handlers validate their arguments, make exactly one operator call and render
//! the result. Errors are returned, never handled here; `fatal` maps them to an
//! exit code.

use std::io::Write;

use chrono::DateTime;
use clap::CommandFactory;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, Format, Output, ServerCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{config_path, requires_config, Settings};
use crate::domain::{Server, ServerCreateRequest, ServerEvent, ServerUpdateRequest};
use crate::infrastructure::{Runtime, ServerOperator};
use crate::render;

const SERVER_COLUMNS: &[&str] = &["id", "name", "core", "mem", "changed", "power"];
const EVENT_COLUMNS: &[&str] = &["time", "type", "change", "user"];

/// Build the runtime for this invocation.
///
/// `args` are the raw process arguments; commands that manage configuration
/// themselves get an unbound runtime and never touch the config file.
pub fn build_runtime<I, S>(cli: &Cli, args: I) -> CliResult<Runtime>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if !requires_config(args) {
        debug!("command runs without config");
        return Ok(Runtime::unbound());
    }
    let path = config_path(cli.config.as_deref());
    let account = Settings::resolve_account(&path, cli.account.as_deref())?;
    Ok(Runtime::new(account, cli.request_timeout())?)
}

/// Dispatch the parsed command, writing results to `out`.
pub fn execute_command(cli: &Cli, runtime: &Runtime, out: &mut dyn Write) -> CliResult<()> {
    match &cli.command {
        Commands::Server { command } => execute_server(command, runtime, cli.output(), out),
        Commands::MakeConfig => make_config(cli, out),
        Commands::Version => {
            writeln!(out, "cloudctl {}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(*shell, &mut cmd, name, out);
            Ok(())
        }
    }
}

/// Dispatch a `server` subcommand.
pub fn execute_server(
    command: &ServerCommands,
    runtime: &Runtime,
    output: Output,
    out: &mut dyn Write,
) -> CliResult<()> {
    match command {
        ServerCommands::Ls => server_ls(runtime, output, out),
        ServerCommands::Show { id } => server_show(runtime, id, output, out),
        ServerCommands::Create {
            name,
            cores,
            memory,
            location,
            labels,
        } => {
            let request = ServerCreateRequest {
                name: name.clone(),
                cores: *cores,
                memory: *memory,
                location_uuid: location.clone(),
                labels: labels.clone(),
            };
            server_create(runtime, &request, output, out)
        }
        ServerCommands::Set {
            id,
            name,
            cores,
            memory,
        } => {
            let request = ServerUpdateRequest {
                name: name.clone(),
                cores: *cores,
                memory: *memory,
            };
            server_set(runtime, id, &request)
        }
        ServerCommands::Rm { id } => server_rm(runtime, id),
        ServerCommands::On { id } => server_on(runtime, id),
        ServerCommands::Off { id, force } => server_off(runtime, id, *force),
        ServerCommands::Events { id } => server_events(runtime, id, output, out),
    }
}

fn require_id(id: &str) -> CliResult<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(CliError::InvalidArgs("missing server ID".into()));
    }
    Ok(id)
}

fn servers(runtime: &Runtime) -> CliResult<&dyn ServerOperator> {
    Ok(runtime.server_operator()?)
}

/// Format an RFC 3339 timestamp for tables; other values pass through unchanged.
fn format_time(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn server_row(server: &Server) -> Vec<String> {
    vec![
        server.object_uuid.clone(),
        server.name.clone(),
        server.cores.to_string(),
        server.memory.to_string(),
        format_time(&server.change_time),
        server.power_label().to_string(),
    ]
}

fn event_row(event: &ServerEvent) -> Vec<String> {
    vec![
        format_time(&event.timestamp),
        event.request_type.clone(),
        event.change.clone(),
        event.initiator.clone(),
    ]
}

#[instrument(skip(runtime, out))]
fn server_ls(runtime: &Runtime, output: Output, out: &mut dyn Write) -> CliResult<()> {
    let servers = servers(runtime)?.list_servers()?;
    debug!(count = servers.len(), "listed servers");
    match output.format {
        Format::Json => render::as_json(out, &servers)?,
        Format::Table => {
            let rows: Vec<Vec<String>> = servers.iter().map(server_row).collect();
            render::as_table(out, SERVER_COLUMNS, &rows, output.options)?;
        }
    }
    Ok(())
}

#[instrument(skip(runtime, out))]
fn server_show(runtime: &Runtime, id: &str, output: Output, out: &mut dyn Write) -> CliResult<()> {
    let id = require_id(id)?;
    let server = servers(runtime)?.get_server(id)?;
    match output.format {
        Format::Json => render::as_json(out, &server)?,
        Format::Table => {
            let rows = vec![
                vec!["id".to_string(), server.object_uuid.clone()],
                vec!["name".to_string(), server.name.clone()],
                vec!["cores".to_string(), server.cores.to_string()],
                vec!["memory".to_string(), format!("{} GiB", server.memory)],
                vec!["power".to_string(), server.power_label().to_string()],
                vec!["status".to_string(), server.status.clone()],
                vec!["location".to_string(), server.location_name.clone()],
                vec!["created".to_string(), format_time(&server.create_time)],
                vec!["changed".to_string(), format_time(&server.change_time)],
                vec!["labels".to_string(), server.labels.iter().join(",")],
            ];
            render::as_table(out, &["key", "value"], &rows, output.options)?;
        }
    }
    Ok(())
}

#[instrument(skip(runtime, out))]
fn server_create(
    runtime: &Runtime,
    request: &ServerCreateRequest,
    output: Output,
    out: &mut dyn Write,
) -> CliResult<()> {
    if request.name.trim().is_empty() {
        return Err(CliError::InvalidArgs("server name must not be empty".into()));
    }
    if request.cores == 0 || request.memory == 0 {
        return Err(CliError::InvalidArgs(
            "cores and memory must be at least 1".into(),
        ));
    }
    let created = servers(runtime)?.create_server(request)?;
    match output.format {
        Format::Json => render::as_json(out, &created)?,
        Format::Table => {
            let rows = vec![vec![created.object_uuid]];
            render::as_table(out, &["id"], &rows, output.options)?;
        }
    }
    Ok(())
}

#[instrument(skip(runtime))]
fn server_set(runtime: &Runtime, id: &str, request: &ServerUpdateRequest) -> CliResult<()> {
    let id = require_id(id)?;
    if request.is_empty() {
        return Err(CliError::InvalidArgs(
            "nothing to change: give --name, --cores or --mem".into(),
        ));
    }
    servers(runtime)?.update_server(id, request)?;
    Ok(())
}

#[instrument(skip(runtime))]
fn server_rm(runtime: &Runtime, id: &str) -> CliResult<()> {
    let id = require_id(id)?;
    servers(runtime)?.delete_server(id)?;
    Ok(())
}

#[instrument(skip(runtime))]
fn server_on(runtime: &Runtime, id: &str) -> CliResult<()> {
    let id = require_id(id)?;
    servers(runtime)?.start_server(id)?;
    Ok(())
}

#[instrument(skip(runtime))]
fn server_off(runtime: &Runtime, id: &str, force: bool) -> CliResult<()> {
    let id = require_id(id)?;
    let op = servers(runtime)?;
    if force {
        op.stop_server(id)?;
    } else {
        op.shutdown_server(id)?;
    }
    Ok(())
}

#[instrument(skip(runtime, out))]
fn server_events(
    runtime: &Runtime,
    id: &str,
    output: Output,
    out: &mut dyn Write,
) -> CliResult<()> {
    let id = require_id(id)?;
    let events = servers(runtime)?.list_server_events(id)?;
    match output.format {
        Format::Json => render::as_json(out, &events)?,
        Format::Table => {
            let rows: Vec<Vec<String>> = events.iter().map(event_row).collect();
            render::as_table(out, EVENT_COLUMNS, &rows, output.options)?;
        }
    }
    Ok(())
}

fn make_config(cli: &Cli, out: &mut dyn Write) -> CliResult<()> {
    let path = config_path(cli.config.as_deref());
    out.write_all(Settings::template().as_bytes())?;
    output::hint(&format!("# save as {}", path.display()));
    Ok(())
}
