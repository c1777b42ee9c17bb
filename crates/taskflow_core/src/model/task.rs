use crate::dates;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time, UtcOffset};

pub const UNTITLED_TASK: &str = "Untitled Task";
pub const UNTITLED_SUBTASK: &str = "Untitled Subtask";

/// A checklist item owned by a task. Embedded in the parent record, so
/// deleting the task deletes its subtasks with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub created_at: String,
}

/// A free-form dated note owned by a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub remind_at: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub daily_log: Vec<LogEntry>,
}

impl Task {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_TASK
        } else {
            &self.title
        }
    }

    /// The effective date for overdue/bucketing decisions: the reminder
    /// time's calendar day when set, else the due date.
    pub fn reference_date(&self, offset: UtcOffset) -> Option<Date> {
        if let Some(raw) = self.remind_at.as_deref()
            && let Ok(instant) = dates::parse_instant(raw)
        {
            return Some(instant.to_offset(offset).date());
        }
        self.due_date
            .as_deref()
            .and_then(|raw| dates::parse_date(raw).ok())
    }

    /// Sort key within a section: reference date ascending, with the
    /// reminder's time of day breaking ties and date-only tasks at midnight.
    pub fn reference_sort_key(&self, offset: UtcOffset) -> Option<(Date, Time)> {
        if let Some(raw) = self.remind_at.as_deref()
            && let Ok(instant) = dates::parse_instant(raw)
        {
            let local = instant.to_offset(offset);
            return Some((local.date(), local.time()));
        }
        self.due_date
            .as_deref()
            .and_then(|raw| dates::parse_date(raw).ok())
            .map(|date| (date, Time::MIDNIGHT))
    }

    /// Strictly before the start of today. Completed tasks and tasks with
    /// no reference date are never overdue.
    pub fn is_overdue(&self, now: OffsetDateTime) -> bool {
        !self.completed
            && self
                .reference_date(now.offset())
                .is_some_and(|date| date < now.date())
    }

    pub fn days_until_due(&self, now: OffsetDateTime) -> Option<i64> {
        self.reference_date(now.offset())
            .map(|date| dates::whole_days_between(now.date(), date))
    }

    pub fn completed_subtask_count(&self) -> usize {
        self.subtasks.iter().filter(|sub| sub.completed).count()
    }

    /// Substitute defaults for attributes the store permits to be missing,
    /// so everything downstream consumes fully-defined values. Unparseable
    /// date strings are treated as absent.
    pub fn normalize(&mut self, now: &str) {
        if self.id.trim().is_empty() {
            self.id = generated_id("task");
        }
        if self.created_at.trim().is_empty() {
            self.created_at = now.to_string();
        }
        if let Some(raw) = self.due_date.as_deref()
            && dates::parse_date(raw).is_err()
        {
            self.due_date = None;
        }
        if let Some(raw) = self.remind_at.as_deref()
            && dates::parse_instant(raw).is_err()
        {
            self.remind_at = None;
        }
        if let Some(raw) = self.completed_at.as_deref()
            && dates::parse_instant(raw).is_err()
        {
            self.completed_at = None;
        }
        for subtask in &mut self.subtasks {
            subtask.normalize(now);
        }
        for entry in &mut self.daily_log {
            entry.normalize(now);
        }
    }
}

impl Subtask {
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            UNTITLED_SUBTASK
        } else {
            &self.title
        }
    }

    pub fn normalize(&mut self, now: &str) {
        if self.id.trim().is_empty() {
            self.id = generated_id("sub");
        }
        if self.created_at.trim().is_empty() {
            self.created_at = now.to_string();
        }
    }
}

impl LogEntry {
    pub fn normalize(&mut self, now: &str) {
        if self.id.trim().is_empty() {
            self.id = generated_id("log");
        }
        if self.timestamp.trim().is_empty() || dates::parse_instant(&self.timestamp).is_err() {
            self.timestamp = now.to_string();
        }
    }
}

pub fn generated_id(prefix: &str) -> String {
    format!(
        "{prefix}-{}",
        OffsetDateTime::now_utc().unix_timestamp_nanos()
    )
}
