use assert_cmd::Command;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use predicates::prelude::*;
use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

const INPUT_VARS: [&str; 7] = [
    "INPUT_FILENAME",
    "INPUT_NAME",
    "INPUT_FOLDERID",
    "INPUT_CREDENTIALS",
    "INPUT_ENCODED",
    "INPUT_OVERWRITE",
    "INPUT_TOUNZIP",
];

fn command() -> Command {
    let mut cmd = Command::cargo_bin("drive-upload").expect("Binary exists");
    for var in INPUT_VARS {
        cmd.env_remove(var);
    }
    cmd.env("GITHUB_ACTIONS", "false");
    cmd
}

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        self.events.lock().unwrap().push(format!("{:?}", event));
    }
}

#[tokio::test]
async fn emits_trace_initialised_event_and_reports_missing_input() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use drive_upload::cli::{run, Cli};
    use drive_upload_core::error::UploadError;

    let err = run(Cli::default()).await.expect_err("no inputs given");
    assert!(
        matches!(err.downcast_ref::<UploadError>(), Some(UploadError::MissingInput(input)) if input == "filename"),
        "unexpected error: {err:#}"
    );

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}

#[test]
fn missing_filename_fails_with_single_message() {
    command()
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: missing input 'filename'"));
}

#[test]
fn inputs_are_read_from_action_environment() {
    command()
        .env("INPUT_FILENAME", "report.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing input 'folderId'"));
}

#[test]
fn malformed_flag_is_reported() {
    command()
        .args(["--filename", "report.csv", "--folder-id", "f1", "--credentials", "e30="])
        .args(["--overwrite", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("incorrect input 'overwrite'"));
}

#[test]
fn github_actions_errors_use_workflow_commands() {
    command()
        .env("GITHUB_ACTIONS", "true")
        .assert()
        .failure()
        .stdout(predicate::str::contains("::error::missing input 'filename'"));
}

#[test]
fn credentials_never_appear_in_output() {
    let decoded = "cli-test-leaked-credential-9c1e";
    let encoded = STANDARD.encode(decoded);

    let assert = command()
        .args(["--filename", "report.csv", "--folder-id", "f1"])
        .env("INPUT_CREDENTIALS", &encoded)
        .env("RUST_LOG", "trace")
        .assert()
        .failure()
        .stderr(predicate::str::contains("authentication failed"));

    let output = assert.get_output();
    for stream in [&output.stdout, &output.stderr] {
        let text = String::from_utf8_lossy(stream);
        assert!(!text.contains(decoded), "decoded credentials leaked: {text}");
        assert!(!text.contains(&encoded), "encoded credentials leaked: {text}");
    }
}

#[test]
fn yaml_config_supplies_non_secret_inputs() {
    let config = tempfile::NamedTempFile::new().expect("Creating temp config file failed");
    std::fs::write(config.path(), "filename: report.csv\nfolderId: f1\ntoUnzip: perhaps\n")
        .expect("Writing temp config failed");

    command()
        .arg("--config")
        .arg(config.path())
        .env("INPUT_CREDENTIALS", "e30=")
        .assert()
        .failure()
        .stderr(predicate::str::contains("incorrect input 'toUnzip'"));
}

#[test]
fn failure_prints_the_message_exactly_once() {
    let assert = command().env_remove("RUST_LOG").assert().failure();
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).into_owned();
    assert_eq!(
        stderr.matches("missing input 'filename'").count(),
        1,
        "fatal message repeated: {stderr}"
    );
}
