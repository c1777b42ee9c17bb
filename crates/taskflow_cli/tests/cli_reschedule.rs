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

fn seed_store(store_path: &PathBuf) {
    let content = serde_json::json!({
        "schema_version": 1,
        "tasks": [
            {
                "id": "task-late",
                "title": "late task",
                "created_at": "2025-12-01T00:00:00Z",
                "due_date": local_date_string(-3)
            },
            {
                "id": "task-later",
                "title": "other late task",
                "created_at": "2025-12-01T00:00:00Z",
                "due_date": local_date_string(-1)
            },
            {
                "id": "task-current",
                "title": "current task",
                "created_at": "2025-12-01T00:00:00Z",
                "due_date": local_date_string(3)
            }
        ]
    });
    std::fs::write(store_path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
}

#[test]
fn reschedule_single_task_to_tomorrow() {
    let exe = env!("CARGO_BIN_EXE_taskflow");
    let store_path = temp_path("cli-reschedule-tasks.json");
    let pending_path = temp_path("cli-reschedule-pending.json");
    seed_store(&store_path);
    let tomorrow = local_date_string(1);

    let output = Command::new(exe)
        .args(["--json", "reschedule", "tomorrow", "task-late"])
        .env("TASKFLOW_STORE_PATH", &store_path)
        .env("TASKFLOW_PENDING_PATH", &pending_path)
        .output()
        .expect("failed to run reschedule command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    assert_eq!(parsed["due_date"], tomorrow.as_str());
    assert!(parsed["remind_at"].is_null());

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).expect("stored json");
    assert_eq!(stored["tasks"][0]["due_date"], tomorrow.as_str());
    // Only the named task moves.
    assert_eq!(
        stored["tasks"][1]["due_date"],
        local_date_string(-1).as_str()
    );

    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&pending_path).ok();
}

#[test]
fn reschedule_without_id_moves_all_overdue() {
    let exe = env!("CARGO_BIN_EXE_taskflow");
    let store_path = temp_path("cli-reschedule-bulk-tasks.json");
    let pending_path = temp_path("cli-reschedule-bulk-pending.json");
    seed_store(&store_path);
    let next_week = local_date_string(7);

    let output = Command::new(exe)
        .args(["--json", "reschedule", "next-week"])
        .env("TASKFLOW_STORE_PATH", &store_path)
        .env("TASKFLOW_PENDING_PATH", &pending_path)
        .output()
        .expect("failed to run reschedule command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("json output");
    let moved = parsed.as_array().expect("json array");
    assert_eq!(moved.len(), 2);
    for task in moved {
        assert_eq!(task["due_date"], next_week.as_str());
    }

    let stored: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&store_path).unwrap()).expect("stored json");
    assert_eq!(stored["tasks"][0]["due_date"], next_week.as_str());
    assert_eq!(stored["tasks"][1]["due_date"], next_week.as_str());
    assert_eq!(
        stored["tasks"][2]["due_date"],
        local_date_string(3).as_str()
    );

    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&pending_path).ok();
}

#[test]
fn reschedule_to_today_clears_overdue_listing() {
    let exe = env!("CARGO_BIN_EXE_taskflow");
    let store_path = temp_path("cli-reschedule-today-tasks.json");
    let pending_path = temp_path("cli-reschedule-today-pending.json");
    seed_store(&store_path);

    let output = Command::new(exe)
        .args(["reschedule", "today"])
        .env("TASKFLOW_STORE_PATH", &store_path)
        .env("TASKFLOW_PENDING_PATH", &pending_path)
        .output()
        .expect("failed to run reschedule command");
    assert!(output.status.success());

    let list_output = Command::new(exe)
        .args(["list"])
        .env("TASKFLOW_STORE_PATH", &store_path)
        .output()
        .expect("failed to run list command");

    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&pending_path).ok();
    assert!(list_output.status.success());
    let stdout = String::from_utf8_lossy(&list_output.stdout);
    assert!(!stdout.contains("Overdue"));
    assert!(stdout.contains("late task"));
    assert!(stdout.contains("other late task"));
}

#[test]
fn reschedule_rejects_non_overdue_task() {
    let exe = env!("CARGO_BIN_EXE_taskflow");
    let store_path = temp_path("cli-reschedule-guard-tasks.json");
    let pending_path = temp_path("cli-reschedule-guard-pending.json");
    seed_store(&store_path);

    let output = Command::new(exe)
        .args(["reschedule", "tomorrow", "task-current"])
        .env("TASKFLOW_STORE_PATH", &store_path)
        .env("TASKFLOW_PENDING_PATH", &pending_path)
        .output()
        .expect("failed to run reschedule command");

    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&pending_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
    assert!(stderr.contains("task is not overdue"));
}

#[test]
fn reschedule_rejects_unknown_target() {
    let exe = env!("CARGO_BIN_EXE_taskflow");
    let store_path = temp_path("cli-reschedule-target-tasks.json");
    seed_store(&store_path);

    let output = Command::new(exe)
        .args(["reschedule", "someday", "task-late"])
        .env("TASKFLOW_STORE_PATH", &store_path)
        .output()
        .expect("failed to run reschedule command");

    std::fs::remove_file(&store_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn reschedule_rejects_unknown_id() {
    let exe = env!("CARGO_BIN_EXE_taskflow");
    let store_path = temp_path("cli-reschedule-unknown-tasks.json");
    let pending_path = temp_path("cli-reschedule-unknown-pending.json");
    seed_store(&store_path);

    let output = Command::new(exe)
        .args(["reschedule", "tomorrow", "task-404"])
        .env("TASKFLOW_STORE_PATH", &store_path)
        .env("TASKFLOW_PENDING_PATH", &pending_path)
        .output()
        .expect("failed to run reschedule command");

    std::fs::remove_file(&store_path).ok();
    std::fs::remove_file(&pending_path).ok();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("task not found"));
}
