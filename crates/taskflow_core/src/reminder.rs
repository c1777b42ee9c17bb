//! Decides whether a task should have a pending reminder notification and
//! applies that decision against the delivery collaborator. The decision
//! itself is a pure function of the task and an explicit `now`.

use crate::dates;
use crate::error::AppError;
use crate::model::Task;
use crate::notify::NotificationDelivery;
use crate::settings::Settings;
use time::OffsetDateTime;

pub const DEFAULT_REMINDER_HOUR: u8 = 9;
pub const DEFAULT_REMINDER_MINUTE: u8 = 0;

pub const DAILY_REVIEW_ID: &str = "daily.review.reminder";
const REMINDER_ID_PREFIX: &str = "task.reminder.";

const TASK_REMINDER_BODY: &str = "Task reminder";
const DAILY_REVIEW_TITLE: &str = "Daily review";
const DAILY_REVIEW_BODY: &str = "Take a minute to review today's tasks.";

pub fn reminder_identifier(task_id: &str) -> String {
    format!("{REMINDER_ID_PREFIX}{task_id}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleDecision {
    /// No notification should exist for this task; clear any pending one.
    Cancel,
    /// Exactly one one-shot notification should be pending at this instant.
    ScheduleAt(OffsetDateTime),
}

/// When the task's reminder should fire, if at all.
///
/// An explicit future `remind_at` always wins. A stale `remind_at` falls
/// through to the 09:00 due-date default rather than suppressing it; that
/// matches the shipped behavior and is kept deliberately (see DESIGN.md).
pub fn next_reminder_instant(task: &Task, now: OffsetDateTime) -> Option<OffsetDateTime> {
    if task.completed {
        return None;
    }

    if let Some(raw) = task.remind_at.as_deref()
        && let Ok(remind_at) = dates::parse_instant(raw)
        && remind_at > now
    {
        return Some(remind_at);
    }

    let due = dates::parse_date(task.due_date.as_deref()?).ok()?;
    let scheduled = dates::at_time_of_day(
        due,
        DEFAULT_REMINDER_HOUR,
        DEFAULT_REMINDER_MINUTE,
        now.offset(),
    )?;
    (scheduled > now).then_some(scheduled)
}

pub fn decide(task: &Task, now: OffsetDateTime) -> ScheduleDecision {
    match next_reminder_instant(task, now) {
        Some(at) => ScheduleDecision::ScheduleAt(at),
        None => ScheduleDecision::Cancel,
    }
}

/// Recomputes and applies the correct notification state for one task.
/// Scheduling replaces any pending request under the task's identifier, so
/// calling this repeatedly never stacks duplicates.
pub fn reconcile(
    task: &Task,
    now: OffsetDateTime,
    delivery: &mut dyn NotificationDelivery,
) -> Result<ScheduleDecision, AppError> {
    let identifier = reminder_identifier(&task.id);
    let decision = decide(task, now);

    match decision {
        ScheduleDecision::Cancel => delivery.cancel(&identifier)?,
        ScheduleDecision::ScheduleAt(at) => {
            delivery.schedule_one_shot(&identifier, at, task.display_title(), TASK_REMINDER_BODY)?;
        }
    }

    Ok(decision)
}

/// Brings the process-wide daily review reminder in line with the settings
/// flags: scheduled only while notifications are enabled and the review
/// preference is on. Returns whether the reminder is now scheduled.
pub fn sync_daily_review(
    settings: &Settings,
    delivery: &mut dyn NotificationDelivery,
) -> Result<bool, AppError> {
    if settings.notifications_enabled && settings.daily_review_enabled {
        delivery.schedule_repeating_daily(
            DAILY_REVIEW_ID,
            DEFAULT_REMINDER_HOUR,
            DEFAULT_REMINDER_MINUTE,
            DAILY_REVIEW_TITLE,
            DAILY_REVIEW_BODY,
        )?;
        Ok(true)
    } else {
        delivery.cancel(DAILY_REVIEW_ID)?;
        Ok(false)
    }
}
