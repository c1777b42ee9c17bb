use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Finish first-run setup, seeding a starter task into an empty store
    ///
    /// Example: taskflow init
    Init,
    /// Add a new task
    ///
    /// Example: taskflow add "Buy milk" --due 2026-01-15
    Add {
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Due date, YYYY-MM-DD
        #[arg(long)]
        due: Option<String>,
        /// Reminder instant, RFC 3339
        #[arg(long)]
        remind: Option<String>,
    },
    /// List open tasks grouped by time horizon
    ///
    /// Example: taskflow list
    List,
    /// Show details of a task
    ///
    /// Example: taskflow show task-1
    Show {
        id: String,
    },
    /// Edit a task's fields
    ///
    /// Example: taskflow edit task-1 --title "Buy organic milk"
    /// Example: taskflow edit task-1 --clear-due
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Due date, YYYY-MM-DD
        #[arg(long, conflicts_with = "clear_due")]
        due: Option<String>,
        #[arg(long)]
        clear_due: bool,
        /// Reminder instant, RFC 3339
        #[arg(long, conflicts_with = "clear_remind")]
        remind: Option<String>,
        #[arg(long)]
        clear_remind: bool,
    },
    /// Mark a task as completed
    ///
    /// Example: taskflow done task-1
    Done {
        id: String,
    },
    /// Mark a completed task as open again
    ///
    /// Example: taskflow undone task-1
    Undone {
        id: String,
    },
    /// Delete a task
    ///
    /// Example: taskflow delete task-1
    Delete {
        id: String,
    },
    /// Move overdue work to a new due date
    ///
    /// Example: taskflow reschedule tomorrow task-1
    /// Example: taskflow reschedule next-week (all overdue tasks)
    Reschedule {
        when: RescheduleWhen,
        /// Task to move; omitting it moves every overdue task
        id: Option<String>,
    },
    /// Manage a task's subtasks
    Subtask {
        #[command(subcommand)]
        subtask: SubtaskCommand,
    },
    /// Manage a task's daily log
    Log {
        #[command(subcommand)]
        log: LogCommand,
    },
    /// Deliver notifications that have come due
    ///
    /// Example: taskflow notify
    Notify,
    /// Manage reminder notification preferences
    Reminders {
        #[command(subcommand)]
        reminders: RemindersCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum SubtaskCommand {
    /// Add a subtask to a task
    ///
    /// Example: taskflow subtask add task-1 "Draft outline"
    Add {
        task_id: String,
        title: String,
    },
    /// Mark a subtask as completed
    Done {
        task_id: String,
        subtask_id: String,
    },
    /// Mark a subtask as open again
    Undone {
        task_id: String,
        subtask_id: String,
    },
    /// Delete a subtask
    Delete {
        task_id: String,
        subtask_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum LogCommand {
    /// Append a dated note to a task's log
    ///
    /// Example: taskflow log add task-1 "waiting on review"
    Add {
        task_id: String,
        note: String,
    },
    /// Delete a log entry
    Delete {
        task_id: String,
        entry_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RemindersCommand {
    /// Request permission and turn reminder notifications on
    Enable,
    /// Turn reminder notifications off and clear pending requests
    Disable,
    /// Turn the daily review reminder on or off
    ///
    /// Example: taskflow reminders review off
    Review {
        state: ReviewState,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum ReviewState {
    On,
    Off,
}

impl ReviewState {
    pub fn enabled(self) -> bool {
        matches!(self, ReviewState::On)
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RescheduleWhen {
    Today,
    Tomorrow,
    NextWeek,
}

impl RescheduleWhen {
    pub fn offset_days(self) -> i64 {
        match self {
            RescheduleWhen::Today => 0,
            RescheduleWhen::Tomorrow => 1,
            RescheduleWhen::NextWeek => 7,
        }
    }
}
