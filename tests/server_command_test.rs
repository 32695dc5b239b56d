//! Tests for server command handlers against a recording fake operator
//!
//! Output is captured through a `Vec<u8>` sink; the exit code comes from the
//! same `fatal` mapping `main` uses.

use std::sync::{Arc, Mutex};

use rstest::rstest;

use cloudctl::cli::{execute_command, execute_server, fatal, Cli, Output, ServerCommands};
use cloudctl::domain::{
    Server, ServerCreateRequest, ServerCreateResponse, ServerEvent, ServerMetric,
    ServerUpdateRequest,
};
use cloudctl::exitcode;
use cloudctl::infrastructure::{InfraError, InfraResult, Runtime, ServerOperator};
use cloudctl::render::RenderOptions;
use cloudctl::util::testing;

use clap::Parser;

const ID: &str = "xxx";

/// Fake operator recording every call as `method:id`.
#[derive(Default)]
struct FakeServerOperator {
    servers: Vec<Server>,
    fail: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeServerOperator {
    fn new(fail: bool) -> Self {
        Self {
            servers: vec![mock_server()],
            fail,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, method: &str, id: &str) -> InfraResult<()> {
        self.calls.lock().unwrap().push(format!("{method}:{id}"));
        if self.fail {
            Err(InfraError::Operator("test".into()))
        } else {
            Ok(())
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ServerOperator for FakeServerOperator {
    fn list_servers(&self) -> InfraResult<Vec<Server>> {
        self.record("list", "")?;
        Ok(self.servers.clone())
    }

    fn get_server(&self, id: &str) -> InfraResult<Server> {
        self.record("get", id)?;
        Ok(self.servers[0].clone())
    }

    fn create_server(&self, request: &ServerCreateRequest) -> InfraResult<ServerCreateResponse> {
        self.record("create", &request.name)?;
        Ok(ServerCreateResponse {
            object_uuid: "new-id".into(),
            request_uuid: "req-id".into(),
        })
    }

    fn update_server(&self, id: &str, _request: &ServerUpdateRequest) -> InfraResult<()> {
        self.record("update", id)
    }

    fn delete_server(&self, id: &str) -> InfraResult<()> {
        self.record("delete", id)
    }

    fn start_server(&self, id: &str) -> InfraResult<()> {
        self.record("start", id)
    }

    fn stop_server(&self, id: &str) -> InfraResult<()> {
        self.record("stop", id)
    }

    fn shutdown_server(&self, id: &str) -> InfraResult<()> {
        self.record("shutdown", id)
    }

    fn list_server_events(&self, id: &str) -> InfraResult<Vec<ServerEvent>> {
        self.record("events", id)?;
        Ok(vec![ServerEvent {
            timestamp: "2024-03-01T10:00:00Z".into(),
            request_type: "server_power_on".into(),
            change: "power: true".into(),
            initiator: "alice".into(),
            ..Default::default()
        }])
    }

    fn list_server_metrics(&self, id: &str) -> InfraResult<Vec<ServerMetric>> {
        self.record("metrics", id)?;
        Ok(vec![])
    }
}

fn mock_server() -> Server {
    Server {
        object_uuid: ID.into(),
        name: "web-1".into(),
        cores: 2,
        memory: 4,
        power: true,
        change_time: "2024-01-02T03:04:05Z".into(),
        ..Default::default()
    }
}

fn runtime_with(op: &Arc<FakeServerOperator>) -> Runtime {
    testing::init_test_setup();
    Runtime::unbound().with_server_operator(op.clone())
}

/// Run a server command, returning (exit code, stdout).
fn run(command: ServerCommands, runtime: &Runtime, output: Output) -> (i32, String) {
    let mut buf = Vec::new();
    let code = match execute_server(&command, runtime, output, &mut buf) {
        Ok(()) => exitcode::OK,
        Err(e) => fatal(&e),
    };
    (code, String::from_utf8(buf).expect("utf8 output"))
}

// ============================================================
// Mutating actions: silent on success, fatal on failure
// ============================================================

#[rstest]
#[case::rm(ServerCommands::Rm { id: ID.into() }, "delete")]
#[case::on(ServerCommands::On { id: ID.into() }, "start")]
#[case::off_graceful(ServerCommands::Off { id: ID.into(), force: false }, "shutdown")]
#[case::off_force(ServerCommands::Off { id: ID.into(), force: true }, "stop")]
fn given_mutating_command_when_executed_then_calls_one_method_and_prints_nothing(
    #[case] command: ServerCommands,
    #[case] expected_method: &str,
    #[values(false, true)] fail: bool,
) {
    let op = Arc::new(FakeServerOperator::new(fail));
    let runtime = runtime_with(&op);

    let (code, out) = run(command, &runtime, Output::table());

    assert_eq!(out, "", "stdout must stay empty");
    assert_eq!(op.calls(), vec![format!("{expected_method}:{ID}")]);
    if fail {
        assert_eq!(code, exitcode::FAILURE);
    } else {
        assert_eq!(code, exitcode::OK);
    }
}

#[test]
fn given_force_off_when_stop_succeeds_then_shutdown_is_never_called() {
    let op = Arc::new(FakeServerOperator::new(false));
    let runtime = runtime_with(&op);

    let (code, out) = run(
        ServerCommands::Off {
            id: ID.into(),
            force: true,
        },
        &runtime,
        Output::table(),
    );

    assert_eq!(code, exitcode::OK);
    assert_eq!(out, "");
    assert!(!op.calls().iter().any(|c| c.starts_with("shutdown")));
}

// ============================================================
// Listing: table and JSON output
// ============================================================

#[test]
fn given_one_server_when_listing_as_json_then_prints_compact_array() {
    let op = Arc::new(FakeServerOperator::new(false));
    let runtime = runtime_with(&op);

    let (code, out) = run(ServerCommands::Ls, &runtime, Output::json());

    assert_eq!(code, exitcode::OK);
    assert!(out.starts_with("[{"), "{out}");
    assert!(out.ends_with("}]\n"), "{out}");
    assert_eq!(out.matches('\n').count(), 1);
    assert!(out.contains(r#""objectUUID":"xxx""#), "{out}");
}

#[test]
fn given_one_server_when_listing_as_table_then_prints_header_and_id() {
    let op = Arc::new(FakeServerOperator::new(false));
    let runtime = runtime_with(&op);

    let (code, out) = run(ServerCommands::Ls, &runtime, Output::table());

    assert_eq!(code, exitcode::OK);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("ID"));
    assert!(lines[0].contains("CHANGED"));
    assert!(lines[1].contains(ID));
    assert!(lines[1].contains("2024-01-02 03:04:05"));
    assert!(lines[1].ends_with("on"));
}

#[test]
fn given_noheader_when_listing_as_table_then_header_is_omitted() {
    let op = Arc::new(FakeServerOperator::new(false));
    let runtime = runtime_with(&op);
    let output = Output {
        options: RenderOptions { no_header: true },
        ..Output::table()
    };

    let (_, out) = run(ServerCommands::Ls, &runtime, output);

    assert_eq!(out.lines().count(), 1);
    assert!(out.starts_with(ID));
}

#[rstest]
fn given_failing_operator_when_listing_then_fatal_and_no_output(
    #[values(Output::table(), Output::json())] output: Output,
) {
    let op = Arc::new(FakeServerOperator::new(true));
    let runtime = runtime_with(&op);

    let (code, out) = run(ServerCommands::Ls, &runtime, output);

    assert_eq!(code, exitcode::FAILURE);
    assert_eq!(out, "");
}

// ============================================================
// Validation and configuration failures happen before any call
// ============================================================

#[test]
fn given_unbound_runtime_when_executing_then_config_error_without_output() {
    testing::init_test_setup();
    let runtime = Runtime::unbound();

    let (code, out) = run(ServerCommands::Ls, &runtime, Output::json());

    assert_eq!(code, exitcode::CONFIG);
    assert_eq!(out, "");
}

#[rstest]
#[case::rm(ServerCommands::Rm { id: "".into() })]
#[case::on(ServerCommands::On { id: " ".into() })]
#[case::off(ServerCommands::Off { id: "".into(), force: true })]
#[case::set_nothing(ServerCommands::Set { id: ID.into(), name: None, cores: None, memory: None })]
#[case::create_zero_cores(ServerCommands::Create {
    name: "web".into(), cores: 0, memory: 1, location: None, labels: vec![]
})]
fn given_invalid_arguments_when_executing_then_usage_error_and_no_operator_call(
    #[case] command: ServerCommands,
) {
    let op = Arc::new(FakeServerOperator::new(false));
    let runtime = runtime_with(&op);

    let (code, out) = run(command, &runtime, Output::table());

    assert_eq!(code, exitcode::USAGE);
    assert_eq!(out, "");
    assert!(op.calls().is_empty());
}

// ============================================================
// Remaining server subcommands
// ============================================================

#[test]
fn given_show_as_table_then_prints_key_value_rows() {
    let op = Arc::new(FakeServerOperator::new(false));
    let runtime = runtime_with(&op);

    let (code, out) = run(ServerCommands::Show { id: ID.into() }, &runtime, Output::table());

    assert_eq!(code, exitcode::OK);
    assert!(out.starts_with("KEY"));
    assert!(out.contains("memory    4 GiB"), "{out}");
    assert_eq!(op.calls(), vec![format!("get:{ID}")]);
}

#[test]
fn given_show_as_json_then_prints_single_object() {
    let op = Arc::new(FakeServerOperator::new(false));
    let runtime = runtime_with(&op);

    let (_, out) = run(ServerCommands::Show { id: ID.into() }, &runtime, Output::json());

    assert!(out.starts_with('{'));
    assert!(out.ends_with("}\n"));
}

#[test]
fn given_create_when_successful_then_prints_new_id() {
    let op = Arc::new(FakeServerOperator::new(false));
    let runtime = runtime_with(&op);
    let command = ServerCommands::Create {
        name: "web".into(),
        cores: 2,
        memory: 4,
        location: None,
        labels: vec!["prod".into()],
    };

    let (code, out) = run(command, &runtime, Output::table());

    assert_eq!(code, exitcode::OK);
    assert_eq!(out, "ID\nnew-id\n");
    assert_eq!(op.calls(), vec!["create:web".to_string()]);
}

#[test]
fn given_set_with_cores_when_successful_then_silent() {
    let op = Arc::new(FakeServerOperator::new(false));
    let runtime = runtime_with(&op);
    let command = ServerCommands::Set {
        id: ID.into(),
        name: None,
        cores: Some(4),
        memory: None,
    };

    let (code, out) = run(command, &runtime, Output::table());

    assert_eq!(code, exitcode::OK);
    assert_eq!(out, "");
    assert_eq!(op.calls(), vec![format!("update:{ID}")]);
}

#[test]
fn given_events_as_table_then_prints_event_rows() {
    let op = Arc::new(FakeServerOperator::new(false));
    let runtime = runtime_with(&op);

    let (code, out) = run(ServerCommands::Events { id: ID.into() }, &runtime, Output::table());

    assert_eq!(code, exitcode::OK);
    assert!(out.starts_with("TIME"));
    assert!(out.contains("server_power_on"));
    assert!(out.contains("alice"));
}

// ============================================================
// Top-level dispatch
// ============================================================

#[test]
fn given_server_ls_with_json_flag_when_dispatching_then_renders_json() {
    let op = Arc::new(FakeServerOperator::new(false));
    let runtime = runtime_with(&op);
    let cli = Cli::try_parse_from(["cloudctl", "--json", "server", "ls"]).unwrap();

    let mut buf = Vec::new();
    execute_command(&cli, &runtime, &mut buf).expect("dispatch");

    let out = String::from_utf8(buf).unwrap();
    assert!(out.starts_with("[{"));
}

#[test]
fn given_version_when_dispatching_then_prints_version_without_operator() {
    let cli = Cli::try_parse_from(["cloudctl", "version"]).unwrap();

    let mut buf = Vec::new();
    execute_command(&cli, &Runtime::unbound(), &mut buf).expect("version");

    let out = String::from_utf8(buf).unwrap();
    assert_eq!(out, format!("cloudctl {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn given_completion_when_dispatching_then_prints_script() {
    let cli = Cli::try_parse_from(["cloudctl", "completion", "bash"]).unwrap();

    let mut buf = Vec::new();
    execute_command(&cli, &Runtime::unbound(), &mut buf).expect("completion");

    assert!(String::from_utf8(buf).unwrap().contains("cloudctl"));
}

#[test]
fn given_make_config_when_dispatching_then_prints_template() {
    let cli = Cli::try_parse_from(["cloudctl", "make-config"]).unwrap();

    let mut buf = Vec::new();
    execute_command(&cli, &Runtime::unbound(), &mut buf).expect("make-config");

    assert!(String::from_utf8(buf).unwrap().contains("accounts:"));
}
