use assert_cmd::Command;
use predicates::prelude::*;
use std::fs::write;
use tempfile::{tempdir, TempDir};

const DIRECTORY: &str = r#"[
  { "id": "bob", "displayName": "Bob", "jobTitle": "IT Manager",
    "teamLabels": "Consultant Team 3, Facilities" },
  { "id": "alice", "displayName": "Alice", "jobTitle": "IT Consultant",
    "teamLabels": ["Consultant Team 3"], "managerId": "bob" },
  { "id": "eve", "displayName": "Eve", "jobTitle": "IT Consultant",
    "teamLabels": [""], "managerId": "bob" }
]"#;

/// Writes a snapshot plus a config pointing at it; output goes to `out` when given.
fn create_workspace(out: Option<&str>) -> (TempDir, std::path::PathBuf) {
    let dir = tempdir().expect("tempdir");
    let snapshot = dir.path().join("directory.json");
    write(&snapshot, DIRECTORY).expect("write snapshot");

    let mut yaml = format!("snapshot:\n  path: {}\n", snapshot.display());
    if let Some(out) = out {
        yaml.push_str(&format!(
            "output:\n  path: {}\n",
            dir.path().join(out).display()
        ));
    }
    let config = dir.path().join("config.yaml");
    write(&config, yaml).expect("write config");
    (dir, config)
}

#[test]
fn forest_command_prints_bucket_forests() {
    let (_dir, config) = create_workspace(None);
    let mut cmd = Command::cargo_bin("org-buckets").expect("Binary exists");
    cmd.arg("forest")
        .arg("--config")
        .arg(&config)
        .env_remove("ORG_BUCKETS_SNAPSHOT");

    cmd.assert()
        .success()
        .stdout(
            predicate::str::contains("\"bucketName\": \"Consultant Team 3\"")
                .and(predicate::str::contains("\"bucketName\": \"Facilities\""))
                .and(predicate::str::contains("\"bucketName\": \"Other\"")),
        );
}

#[test]
fn forest_command_writes_output_file() {
    let (dir, config) = create_workspace(Some("forest.json"));
    Command::cargo_bin("org-buckets")
        .expect("Binary exists")
        .arg("forest")
        .arg("--config")
        .arg(&config)
        .env_remove("ORG_BUCKETS_SNAPSHOT")
        .assert()
        .success();

    let written = std::fs::read_to_string(dir.path().join("forest.json")).expect("output file");
    let forests: serde_json::Value = serde_json::from_str(&written).expect("valid JSON");
    assert_eq!(forests[0]["bucketName"], "Consultant Team 3");
    assert_eq!(forests[0]["roots"][0]["id"], "bob");
    assert_eq!(forests[0]["roots"][0]["children"][0]["id"], "alice");
}

#[test]
fn assign_command_lists_memberships() {
    let (_dir, config) = create_workspace(None);
    Command::cargo_bin("org-buckets")
        .expect("Binary exists")
        .arg("assign")
        .arg("--config")
        .arg(&config)
        .env_remove("ORG_BUCKETS_SNAPSHOT")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"primary\": \"IT Managers\"")
                .and(predicate::str::contains("\"primary\": \"Other\"")),
        );
}

#[test]
fn classify_command_reports_rule_and_secondaries() {
    Command::cargo_bin("org-buckets")
        .expect("Binary exists")
        .args(["classify", "--title", "IT Manager", "--team", "Consultant Team 3, Facilities"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("primary: IT Managers (rule: it-manager)")
                .and(predicate::str::contains("secondary: Consultant Team 3, Facilities")),
        );
}

#[test]
fn missing_config_fails() {
    Command::cargo_bin("org-buckets")
        .expect("Binary exists")
        .args(["forest", "--config", "/definitely/not/here.yaml"])
        .assert()
        .failure();
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*; // needed for .with()
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use org_buckets::cli::{run, Cli, Commands};

    // Classify needs no config file, so run() completes without touching disk.
    let cli = Cli {
        command: Commands::Classify {
            title: Some("Systems Engineer".to_string()),
            team: vec![],
        },
    };

    run(cli).await.expect("classify succeeds");

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
