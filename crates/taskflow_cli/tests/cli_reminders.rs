use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};
use time::macros::format_description;
use time::{Duration, OffsetDateTime, UtcOffset};

fn temp_path(file_name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskflow-{nanos}-{file_name}"))
}

fn local_date_string(day_offset: i64) -> String {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    let date = OffsetDateTime::now_utc().to_offset(offset).date() + Duration::days(day_offset);
    date.format(format_description!("[year]-[month]-[day]"))
        .expect("format date")
}

struct Paths {
    store: PathBuf,
    pending: PathBuf,
    settings: PathBuf,
}

impl Paths {
    fn new(label: &str) -> Self {
        Self {
            store: temp_path(&format!("{label}-tasks.json")),
            pending: temp_path(&format!("{label}-pending.json")),
            settings: temp_path(&format!("{label}-settings.json")),
        }
    }

    fn cleanup(&self) {
        std::fs::remove_file(&self.store).ok();
        std::fs::remove_file(&self.pending).ok();
        std::fs::remove_file(&self.settings).ok();
    }
}

fn read_json(path: &PathBuf) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).expect("json file")
}

#[test]
fn init_seeds_starter_task_into_empty_store() {
    let exe = env!("CARGO_BIN_EXE_taskflow");
    let paths = Paths::new("cli-init");
    let tomorrow = local_date_string(1);

    let output = Command::new(exe)
        .args(["--json", "init"])
        .env("TASKFLOW_STORE_PATH", &paths.store)
        .env("TASKFLOW_PENDING_PATH", &paths.pending)
        .env("TASKFLOW_SETTINGS_PATH", &paths.settings)
        .output()
        .expect("failed to run init command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(parsed["settings"]["onboarding_complete"], true);
    assert_eq!(parsed["settings"]["sample_task_seeded"], true);
    assert_eq!(parsed["seeded"]["title"], "Plan the week");
    assert_eq!(
        parsed["seeded"]["description"],
        "Block time for your top 3 priorities."
    );
    assert_eq!(parsed["seeded"]["due_date"], tomorrow.as_str());

    // A second run never seeds again.
    let output = Command::new(exe)
        .args(["--json", "init"])
        .env("TASKFLOW_STORE_PATH", &paths.store)
        .env("TASKFLOW_PENDING_PATH", &paths.pending)
        .env("TASKFLOW_SETTINGS_PATH", &paths.settings)
        .output()
        .expect("failed to run init command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert!(parsed["seeded"].is_null());

    let stored = read_json(&paths.store);
    assert_eq!(stored["tasks"].as_array().unwrap().len(), 1);

    paths.cleanup();
}

#[test]
fn init_with_existing_tasks_skips_the_starter() {
    let exe = env!("CARGO_BIN_EXE_taskflow");
    let paths = Paths::new("cli-init-existing");
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": [
            {
                "id": "task-1",
                "title": "mine",
                "created_at": "2025-12-01T00:00:00Z"
            }
        ]
    });
    std::fs::write(&paths.store, serde_json::to_string_pretty(&content).unwrap()).unwrap();

    let output = Command::new(exe)
        .args(["--json", "init"])
        .env("TASKFLOW_STORE_PATH", &paths.store)
        .env("TASKFLOW_PENDING_PATH", &paths.pending)
        .env("TASKFLOW_SETTINGS_PATH", &paths.settings)
        .output()
        .expect("failed to run init command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert!(parsed["seeded"].is_null());

    let stored = read_json(&paths.store);
    assert_eq!(stored["tasks"].as_array().unwrap().len(), 1);
    assert_eq!(stored["tasks"][0]["id"], "task-1");

    paths.cleanup();
}

#[test]
fn reminders_enable_denied_when_notifications_unavailable() {
    let exe = env!("CARGO_BIN_EXE_taskflow");
    let paths = Paths::new("cli-reminders-deny");

    let output = Command::new(exe)
        .args(["--json", "reminders", "enable"])
        .env("TASKFLOW_STORE_PATH", &paths.store)
        .env("TASKFLOW_PENDING_PATH", &paths.pending)
        .env("TASKFLOW_SETTINGS_PATH", &paths.settings)
        .env("TASKFLOW_DISABLE_NOTIFICATIONS", "1")
        .output()
        .expect("failed to run reminders enable command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(parsed["notifications_enabled"], false);
    assert_eq!(parsed["notifications_denied"], true);

    paths.cleanup();
}

#[test]
fn reminders_disable_clears_pending_requests() {
    let exe = env!("CARGO_BIN_EXE_taskflow");
    let paths = Paths::new("cli-reminders-disable");

    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": [
            {
                "id": "task-1",
                "title": "demo",
                "created_at": "2025-12-01T00:00:00Z",
                "due_date": local_date_string(2)
            }
        ]
    });
    std::fs::write(&paths.store, serde_json::to_string_pretty(&content).unwrap()).unwrap();

    let pending = serde_json::json!({
        "schema_version": 1,
        "requests": [
            {
                "id": "task.reminder.task-1",
                "title": "demo",
                "body": "Task reminder",
                "trigger": { "kind": "one_shot", "fire_at": "2026-06-01T09:00:00Z" }
            },
            {
                "id": "daily.review.reminder",
                "title": "Daily review",
                "body": "Take a minute to review today's tasks.",
                "trigger": { "kind": "daily", "hour": 9, "minute": 0 }
            }
        ]
    });
    std::fs::write(
        &paths.pending,
        serde_json::to_string_pretty(&pending).unwrap(),
    )
    .unwrap();

    let output = Command::new(exe)
        .args(["--json", "reminders", "disable"])
        .env("TASKFLOW_STORE_PATH", &paths.store)
        .env("TASKFLOW_PENDING_PATH", &paths.pending)
        .env("TASKFLOW_SETTINGS_PATH", &paths.settings)
        .output()
        .expect("failed to run reminders disable command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(parsed["notifications_enabled"], false);

    let pending = read_json(&paths.pending);
    assert!(pending["requests"].as_array().unwrap().is_empty());

    paths.cleanup();
}

#[test]
fn reminders_review_off_removes_daily_request() {
    let exe = env!("CARGO_BIN_EXE_taskflow");
    let paths = Paths::new("cli-reminders-review");

    let settings = serde_json::json!({
        "onboarding_complete": true,
        "notifications_enabled": true,
        "notifications_denied": false,
        "daily_review_enabled": true,
        "sample_task_seeded": true
    });
    std::fs::write(
        &paths.settings,
        serde_json::to_string_pretty(&settings).unwrap(),
    )
    .unwrap();

    let output = Command::new(exe)
        .args(["--json", "reminders", "review", "on"])
        .env("TASKFLOW_STORE_PATH", &paths.store)
        .env("TASKFLOW_PENDING_PATH", &paths.pending)
        .env("TASKFLOW_SETTINGS_PATH", &paths.settings)
        .output()
        .expect("failed to run reminders review command");
    assert!(output.status.success());

    let pending = read_json(&paths.pending);
    assert_eq!(pending["requests"][0]["id"], "daily.review.reminder");
    assert_eq!(pending["requests"][0]["trigger"]["hour"], 9);
    assert_eq!(pending["requests"][0]["trigger"]["minute"], 0);

    let output = Command::new(exe)
        .args(["--json", "reminders", "review", "off"])
        .env("TASKFLOW_STORE_PATH", &paths.store)
        .env("TASKFLOW_PENDING_PATH", &paths.pending)
        .env("TASKFLOW_SETTINGS_PATH", &paths.settings)
        .output()
        .expect("failed to run reminders review command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(parsed["daily_review_enabled"], false);

    let pending = read_json(&paths.pending);
    assert!(pending["requests"].as_array().unwrap().is_empty());

    paths.cleanup();
}
