//! Task operations as called by the CLI. Public functions resolve the store
//! locations from the environment and the clock from the system, then
//! delegate to path-and-instant-taking internals so tests can pin both.

use crate::classify::{self, Classification};
use crate::dates;
use crate::error::AppError;
use crate::model::{LogEntry, Subtask, Task, generated_id};
use crate::notify::{
    self, DeliveryOutcome, NotificationDelivery, RegistryDelivery, notifier_from_env,
};
use crate::reminder;
use crate::settings::{self, Settings};
use crate::storage::{json_store, pending};
use std::path::{Path, PathBuf};
use time::{Duration, OffsetDateTime};

pub const SAMPLE_TASK_TITLE: &str = "Plan the week";
pub const SAMPLE_TASK_DESCRIPTION: &str = "Block time for your top 3 priorities.";

/// Field-level patch for [`edit_task`]. The outer `Option` means "leave
/// as-is"; for the date fields the inner `Option` distinguishes setting a
/// new value from clearing it.
#[derive(Debug, Clone, Default)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<Option<String>>,
    pub remind_at: Option<Option<String>>,
}

#[derive(Debug)]
pub struct OnboardingResult {
    pub settings: Settings,
    pub seeded: Option<Task>,
}

#[derive(Debug, Clone, Copy)]
struct StorePaths<'a> {
    store: &'a Path,
    pending: &'a Path,
}

fn resolved_paths() -> Result<(PathBuf, PathBuf), AppError> {
    Ok((json_store::store_path()?, pending::pending_path()?))
}

pub fn add_task(
    title: &str,
    description: Option<&str>,
    due_date: Option<&str>,
    remind_at: Option<&str>,
) -> Result<Task, AppError> {
    let (store, pending) = resolved_paths()?;
    add_task_with_paths(
        StorePaths {
            store: &store,
            pending: &pending,
        },
        dates::now_local(),
        title,
        description,
        due_date,
        remind_at,
    )
}

pub fn list_classified() -> Result<Classification, AppError> {
    let path = json_store::store_path()?;
    let tasks = json_store::load_tasks(&path)?;
    Ok(classify::classify(&tasks, dates::now_local()))
}

pub fn get_task(id: &str) -> Result<Task, AppError> {
    let path = json_store::store_path()?;
    get_task_with_path(&path, id)
}

pub fn edit_task(id: &str, edit: &TaskEdit) -> Result<Task, AppError> {
    let (store, pending) = resolved_paths()?;
    edit_task_with_paths(
        StorePaths {
            store: &store,
            pending: &pending,
        },
        dates::now_local(),
        id,
        edit,
    )
}

pub fn set_completed(id: &str, completed: bool) -> Result<Task, AppError> {
    let (store, pending) = resolved_paths()?;
    set_completed_with_paths(
        StorePaths {
            store: &store,
            pending: &pending,
        },
        dates::now_local(),
        id,
        completed,
    )
}

pub fn delete_task(id: &str) -> Result<Task, AppError> {
    let (store, pending) = resolved_paths()?;
    delete_task_with_paths(
        StorePaths {
            store: &store,
            pending: &pending,
        },
        id,
    )
}

pub fn reschedule_task(id: &str, offset_days: i64) -> Result<Task, AppError> {
    let (store, pending) = resolved_paths()?;
    reschedule_task_with_paths(
        StorePaths {
            store: &store,
            pending: &pending,
        },
        dates::now_local(),
        id,
        offset_days,
    )
}

pub fn reschedule_overdue(offset_days: i64) -> Result<Vec<Task>, AppError> {
    let (store, pending) = resolved_paths()?;
    reschedule_overdue_with_paths(
        StorePaths {
            store: &store,
            pending: &pending,
        },
        dates::now_local(),
        offset_days,
    )
}

pub fn add_subtask(task_id: &str, title: &str) -> Result<Subtask, AppError> {
    let path = json_store::store_path()?;
    add_subtask_with_path(&path, dates::now_local(), task_id, title)
}

pub fn set_subtask_completed(
    task_id: &str,
    subtask_id: &str,
    completed: bool,
) -> Result<Subtask, AppError> {
    let path = json_store::store_path()?;
    set_subtask_completed_with_path(&path, task_id, subtask_id, completed)
}

pub fn delete_subtask(task_id: &str, subtask_id: &str) -> Result<Subtask, AppError> {
    let path = json_store::store_path()?;
    delete_subtask_with_path(&path, task_id, subtask_id)
}

pub fn add_log_entry(task_id: &str, note: &str) -> Result<LogEntry, AppError> {
    let path = json_store::store_path()?;
    add_log_entry_with_path(&path, dates::now_local(), task_id, note)
}

pub fn delete_log_entry(task_id: &str, entry_id: &str) -> Result<LogEntry, AppError> {
    let path = json_store::store_path()?;
    delete_log_entry_with_path(&path, task_id, entry_id)
}

pub fn complete_onboarding() -> Result<OnboardingResult, AppError> {
    let (store, pending) = resolved_paths()?;
    let settings_path = settings::settings_path()?;
    complete_onboarding_with_paths(
        StorePaths {
            store: &store,
            pending: &pending,
        },
        &settings_path,
        dates::now_local(),
    )
}

pub fn deliver_due_notifications() -> Result<DeliveryOutcome, AppError> {
    let pending_path = pending::pending_path()?;
    let settings_path = settings::settings_path()?;

    // The daily review request is re-synced on every dispatch so a flag
    // flipped while this process was not running still takes effect.
    let settings = settings::load_settings(&settings_path)?;
    let mut delivery = RegistryDelivery::new(&pending_path);
    reminder::sync_daily_review(&settings, &mut delivery)?;

    let notifier = notifier_from_env()?;
    notify::deliver_due(&pending_path, dates::now_local(), notifier.as_ref())
}

pub fn enable_reminders() -> Result<Settings, AppError> {
    let (store, pending) = resolved_paths()?;
    let settings_path = settings::settings_path()?;
    let granted = notify::permission_granted();
    enable_reminders_with_paths(
        StorePaths {
            store: &store,
            pending: &pending,
        },
        &settings_path,
        dates::now_local(),
        granted,
    )
}

pub fn disable_reminders() -> Result<Settings, AppError> {
    let (store, pending) = resolved_paths()?;
    let settings_path = settings::settings_path()?;
    disable_reminders_with_paths(
        StorePaths {
            store: &store,
            pending: &pending,
        },
        &settings_path,
    )
}

pub fn set_daily_review(enabled: bool) -> Result<Settings, AppError> {
    let pending_path = pending::pending_path()?;
    let settings_path = settings::settings_path()?;
    set_daily_review_with_paths(&pending_path, &settings_path, enabled)
}

fn add_task_with_paths(
    paths: StorePaths<'_>,
    now: OffsetDateTime,
    title: &str,
    description: Option<&str>,
    due_date: Option<&str>,
    remind_at: Option<&str>,
) -> Result<Task, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("title is required"));
    }
    if let Some(raw) = due_date {
        dates::parse_date(raw)?;
    }
    if let Some(raw) = remind_at {
        dates::parse_instant(raw)?;
    }

    let task = Task {
        id: generated_id("task"),
        title: trimmed.to_string(),
        description: description.unwrap_or_default().trim().to_string(),
        completed: false,
        completed_at: None,
        due_date: due_date.map(str::to_string),
        remind_at: remind_at.map(str::to_string),
        created_at: dates::format_instant(now)?,
        subtasks: Vec::new(),
        daily_log: Vec::new(),
    };

    let mut tasks = json_store::load_tasks(paths.store)?;
    tasks.push(task.clone());
    json_store::save_tasks(paths.store, &tasks)?;

    let mut delivery = RegistryDelivery::new(paths.pending);
    reminder::reconcile(&task, now, &mut delivery)?;

    Ok(task)
}

fn get_task_with_path(path: &Path, id: &str) -> Result<Task, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }

    let tasks = json_store::load_tasks(path)?;
    tasks
        .into_iter()
        .find(|task| task.id == trimmed_id)
        .ok_or_else(|| AppError::not_found("task not found"))
}

fn edit_task_with_paths(
    paths: StorePaths<'_>,
    now: OffsetDateTime,
    id: &str,
    edit: &TaskEdit,
) -> Result<Task, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    if let Some(title) = edit.title.as_deref()
        && title.trim().is_empty()
    {
        return Err(AppError::invalid_input("title is required"));
    }
    if let Some(Some(raw)) = edit.due_date.as_ref() {
        dates::parse_date(raw)?;
    }
    if let Some(Some(raw)) = edit.remind_at.as_ref() {
        dates::parse_instant(raw)?;
    }

    let mut tasks = json_store::load_tasks(paths.store)?;
    let task = tasks
        .iter_mut()
        .find(|task| task.id == trimmed_id)
        .ok_or_else(|| AppError::not_found("task not found"))?;

    if let Some(title) = edit.title.as_deref() {
        task.title = title.trim().to_string();
    }
    if let Some(description) = edit.description.as_deref() {
        task.description = description.trim().to_string();
    }
    if let Some(due_date) = edit.due_date.as_ref() {
        task.due_date = due_date.clone();
    }
    if let Some(remind_at) = edit.remind_at.as_ref() {
        task.remind_at = remind_at.clone();
    }

    let updated = task.clone();
    json_store::save_tasks(paths.store, &tasks)?;

    let mut delivery = RegistryDelivery::new(paths.pending);
    reminder::reconcile(&updated, now, &mut delivery)?;

    Ok(updated)
}

fn set_completed_with_paths(
    paths: StorePaths<'_>,
    now: OffsetDateTime,
    id: &str,
    completed: bool,
) -> Result<Task, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }

    let mut tasks = json_store::load_tasks(paths.store)?;
    let task = tasks
        .iter_mut()
        .find(|task| task.id == trimmed_id)
        .ok_or_else(|| AppError::not_found("task not found"))?;

    if task.completed == completed {
        return Err(AppError::invalid_input(if completed {
            "task already completed"
        } else {
            "task is not completed"
        }));
    }

    task.completed = completed;
    task.completed_at = if completed {
        Some(dates::format_instant(now)?)
    } else {
        None
    };

    let updated = task.clone();
    json_store::save_tasks(paths.store, &tasks)?;

    let mut delivery = RegistryDelivery::new(paths.pending);
    reminder::reconcile(&updated, now, &mut delivery)?;

    Ok(updated)
}

fn delete_task_with_paths(paths: StorePaths<'_>, id: &str) -> Result<Task, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }

    let mut tasks = json_store::load_tasks(paths.store)?;
    let position = tasks
        .iter()
        .position(|task| task.id == trimmed_id)
        .ok_or_else(|| AppError::not_found("task not found"))?;
    let removed = tasks.remove(position);
    json_store::save_tasks(paths.store, &tasks)?;

    let mut delivery = RegistryDelivery::new(paths.pending);
    delivery.cancel(&reminder::reminder_identifier(&removed.id))?;

    Ok(removed)
}

fn reschedule_task_with_paths(
    paths: StorePaths<'_>,
    now: OffsetDateTime,
    id: &str,
    offset_days: i64,
) -> Result<Task, AppError> {
    let trimmed_id = id.trim();
    if trimmed_id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }

    let mut tasks = json_store::load_tasks(paths.store)?;
    let task = tasks
        .iter_mut()
        .find(|task| task.id == trimmed_id)
        .ok_or_else(|| AppError::not_found("task not found"))?;

    if !task.is_overdue(now) {
        return Err(AppError::invalid_input("task is not overdue"));
    }

    reschedule_in_place(task, now, offset_days)?;
    let updated = task.clone();
    json_store::save_tasks(paths.store, &tasks)?;

    let mut delivery = RegistryDelivery::new(paths.pending);
    reminder::reconcile(&updated, now, &mut delivery)?;

    Ok(updated)
}

fn reschedule_overdue_with_paths(
    paths: StorePaths<'_>,
    now: OffsetDateTime,
    offset_days: i64,
) -> Result<Vec<Task>, AppError> {
    let mut tasks = json_store::load_tasks(paths.store)?;
    let mut updated = Vec::new();

    for task in &mut tasks {
        if task.is_overdue(now) {
            reschedule_in_place(task, now, offset_days)?;
            updated.push(task.clone());
        }
    }

    if updated.is_empty() {
        return Ok(updated);
    }

    json_store::save_tasks(paths.store, &tasks)?;
    let mut delivery = RegistryDelivery::new(paths.pending);
    for task in &updated {
        reminder::reconcile(task, now, &mut delivery)?;
    }

    Ok(updated)
}

fn reschedule_in_place(task: &mut Task, now: OffsetDateTime, offset_days: i64) -> Result<(), AppError> {
    let target = now.date() + Duration::days(offset_days);
    task.due_date = Some(dates::format_date(target)?);
    // A leftover reminder instant would keep the task anchored to its old
    // date, so rescheduling drops it and the due-date default takes over.
    task.remind_at = None;
    Ok(())
}

fn add_subtask_with_path(
    path: &Path,
    now: OffsetDateTime,
    task_id: &str,
    title: &str,
) -> Result<Subtask, AppError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("title is required"));
    }

    let mut tasks = json_store::load_tasks(path)?;
    let task = tasks
        .iter_mut()
        .find(|task| task.id == task_id.trim())
        .ok_or_else(|| AppError::not_found("task not found"))?;

    let subtask = Subtask {
        id: generated_id("sub"),
        title: trimmed.to_string(),
        completed: false,
        created_at: dates::format_instant(now)?,
    };
    task.subtasks.push(subtask.clone());
    json_store::save_tasks(path, &tasks)?;

    Ok(subtask)
}

fn set_subtask_completed_with_path(
    path: &Path,
    task_id: &str,
    subtask_id: &str,
    completed: bool,
) -> Result<Subtask, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let task = tasks
        .iter_mut()
        .find(|task| task.id == task_id.trim())
        .ok_or_else(|| AppError::not_found("task not found"))?;
    let subtask = task
        .subtasks
        .iter_mut()
        .find(|subtask| subtask.id == subtask_id.trim())
        .ok_or_else(|| AppError::not_found("subtask not found"))?;

    subtask.completed = completed;
    let updated = subtask.clone();
    json_store::save_tasks(path, &tasks)?;

    Ok(updated)
}

fn delete_subtask_with_path(
    path: &Path,
    task_id: &str,
    subtask_id: &str,
) -> Result<Subtask, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let task = tasks
        .iter_mut()
        .find(|task| task.id == task_id.trim())
        .ok_or_else(|| AppError::not_found("task not found"))?;
    let position = task
        .subtasks
        .iter()
        .position(|subtask| subtask.id == subtask_id.trim())
        .ok_or_else(|| AppError::not_found("subtask not found"))?;

    let removed = task.subtasks.remove(position);
    json_store::save_tasks(path, &tasks)?;

    Ok(removed)
}

fn add_log_entry_with_path(
    path: &Path,
    now: OffsetDateTime,
    task_id: &str,
    note: &str,
) -> Result<LogEntry, AppError> {
    let trimmed = note.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("note is required"));
    }

    let mut tasks = json_store::load_tasks(path)?;
    let task = tasks
        .iter_mut()
        .find(|task| task.id == task_id.trim())
        .ok_or_else(|| AppError::not_found("task not found"))?;

    let entry = LogEntry {
        id: generated_id("log"),
        timestamp: dates::format_instant(now)?,
        note: trimmed.to_string(),
    };
    task.daily_log.push(entry.clone());
    json_store::save_tasks(path, &tasks)?;

    Ok(entry)
}

fn delete_log_entry_with_path(
    path: &Path,
    task_id: &str,
    entry_id: &str,
) -> Result<LogEntry, AppError> {
    let mut tasks = json_store::load_tasks(path)?;
    let task = tasks
        .iter_mut()
        .find(|task| task.id == task_id.trim())
        .ok_or_else(|| AppError::not_found("task not found"))?;
    let position = task
        .daily_log
        .iter()
        .position(|entry| entry.id == entry_id.trim())
        .ok_or_else(|| AppError::not_found("log entry not found"))?;

    let removed = task.daily_log.remove(position);
    json_store::save_tasks(path, &tasks)?;

    Ok(removed)
}

fn complete_onboarding_with_paths(
    paths: StorePaths<'_>,
    settings_path: &Path,
    now: OffsetDateTime,
) -> Result<OnboardingResult, AppError> {
    let mut settings = settings::load_settings(settings_path)?;
    settings.onboarding_complete = true;

    let mut seeded = None;
    let tasks = json_store::load_tasks(paths.store)?;
    if tasks.is_empty() && !settings.sample_task_seeded {
        let tomorrow = now.date() + Duration::days(1);
        let task = add_task_with_paths(
            paths,
            now,
            SAMPLE_TASK_TITLE,
            Some(SAMPLE_TASK_DESCRIPTION),
            Some(&dates::format_date(tomorrow)?),
            None,
        )?;
        seeded = Some(task);
    }
    // The flag is set even when the store already has tasks, so clearing
    // the list later never resurrects the sample.
    settings.sample_task_seeded = true;

    settings::save_settings(settings_path, &settings)?;
    Ok(OnboardingResult { settings, seeded })
}

fn enable_reminders_with_paths(
    paths: StorePaths<'_>,
    settings_path: &Path,
    now: OffsetDateTime,
    granted: bool,
) -> Result<Settings, AppError> {
    let mut settings = settings::load_settings(settings_path)?;
    settings.notifications_enabled = granted;
    settings.notifications_denied = !granted;

    let mut delivery = RegistryDelivery::new(paths.pending);
    reminder::sync_daily_review(&settings, &mut delivery)?;

    if granted {
        // Rebuild every task reminder so requests lost while notifications
        // were off come back.
        let tasks = json_store::load_tasks(paths.store)?;
        for task in &tasks {
            reminder::reconcile(task, now, &mut delivery)?;
        }
    }

    settings::save_settings(settings_path, &settings)?;
    Ok(settings)
}

fn disable_reminders_with_paths(
    paths: StorePaths<'_>,
    settings_path: &Path,
) -> Result<Settings, AppError> {
    let mut settings = settings::load_settings(settings_path)?;
    settings.notifications_enabled = false;

    let mut delivery = RegistryDelivery::new(paths.pending);
    reminder::sync_daily_review(&settings, &mut delivery)?;

    let tasks = json_store::load_tasks(paths.store)?;
    for task in &tasks {
        delivery.cancel(&reminder::reminder_identifier(&task.id))?;
    }

    settings::save_settings(settings_path, &settings)?;
    Ok(settings)
}

fn set_daily_review_with_paths(
    pending_path: &Path,
    settings_path: &Path,
    enabled: bool,
) -> Result<Settings, AppError> {
    let mut settings = settings::load_settings(settings_path)?;
    settings.daily_review_enabled = enabled;

    let mut delivery = RegistryDelivery::new(pending_path);
    reminder::sync_daily_review(&settings, &mut delivery)?;

    settings::save_settings(settings_path, &settings)?;
    Ok(settings)
}
