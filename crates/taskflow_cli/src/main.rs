use clap::Parser;
use tabled::Tabled;
use tabled::settings::Style;
use taskflow_core::classify::Classification;
use taskflow_core::error::AppError;
use taskflow_core::model::Task;
use taskflow_core::task_api::{self, TaskEdit};

mod cli;

use cli::{Cli, Command, LogCommand, RemindersCommand, SubtaskCommand};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Reminder")]
    reminder: String,
    #[tabled(rename = "Subtasks")]
    subtasks: String,
}

impl TaskRow {
    fn from_task(task: &Task) -> Self {
        let subtasks = if task.subtasks.is_empty() {
            "-".to_string()
        } else {
            format!(
                "{}/{}",
                task.completed_subtask_count(),
                task.subtasks.len()
            )
        };
        Self {
            id: task.id.clone(),
            title: task.display_title().to_string(),
            due: task.due_date.clone().unwrap_or_else(|| "-".to_string()),
            reminder: task.remind_at.clone().unwrap_or_else(|| "-".to_string()),
            subtasks,
        }
    }
}

fn render_task_table(tasks: &[Task]) -> String {
    let rows: Vec<TaskRow> = tasks.iter().map(TaskRow::from_task).collect();
    tabled::Table::new(rows).with(Style::sharp()).to_string()
}

fn print_classification_plain(result: &Classification) {
    let mut printed_any = false;

    if !result.overdue.is_empty() {
        println!("Overdue ({})", result.overdue.len());
        println!("{}", render_task_table(&result.overdue));
        printed_any = true;
    }

    for (section, tasks) in &result.sections {
        if printed_any {
            println!();
        }
        println!("{}", section.label());
        println!("{}", render_task_table(tasks));
        printed_any = true;
    }

    if !printed_any {
        println!("No open tasks.");
    }
    if result.completed_count > 0 {
        println!("Completed: {}", result.completed_count);
    }
}

fn task_to_json(task: &Task) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(task).map_err(|err| AppError::invalid_data(err.to_string()))
}

fn print_classification_json(result: &Classification) -> Result<(), AppError> {
    let mut overdue = Vec::with_capacity(result.overdue.len());
    for task in &result.overdue {
        overdue.push(task_to_json(task)?);
    }

    let mut sections = Vec::with_capacity(result.sections.len());
    for (section, tasks) in &result.sections {
        let mut payload = Vec::with_capacity(tasks.len());
        for task in tasks {
            payload.push(task_to_json(task)?);
        }
        sections.push(serde_json::json!({
            "label": section.label(),
            "tasks": payload,
        }));
    }

    let json = serde_json::json!({
        "overdue": overdue,
        "sections": sections,
        "completed_count": result.completed_count,
    });
    println!("{}", json);
    Ok(())
}

fn print_task_json(task: &Task) -> Result<(), AppError> {
    println!("{}", task_to_json(task)?);
    Ok(())
}

fn due_note(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "in 1 day".to_string(),
        d if d > 1 => format!("in {d} days"),
        -1 => "1 day overdue".to_string(),
        d => format!("{} days overdue", -d),
    }
}

fn print_task_plain(task: &Task) {
    let status = if task.completed { "completed" } else { "open" };
    println!("ID: {}", task.id);
    println!("Title: {}", task.display_title());
    if !task.description.is_empty() {
        println!("Description: {}", task.description);
    }
    println!("Status: {}", status);
    match task.due_date.as_deref() {
        Some(due) => {
            let note = (!task.completed)
                .then(|| task.days_until_due(taskflow_core::dates::now_local()))
                .flatten();
            match note {
                Some(days) => println!("Due: {} ({})", due, due_note(days)),
                None => println!("Due: {}", due),
            }
        }
        None => println!("Due: -"),
    }
    println!("Reminder: {}", task.remind_at.as_deref().unwrap_or("-"));
    println!("Created: {}", task.created_at);

    if !task.subtasks.is_empty() {
        println!(
            "Subtasks ({}/{}):",
            task.completed_subtask_count(),
            task.subtasks.len()
        );
        for subtask in &task.subtasks {
            let mark = if subtask.completed { "x" } else { " " };
            println!("  [{}] {} {}", mark, subtask.id, subtask.display_title());
        }
    }

    if !task.daily_log.is_empty() {
        println!("Log:");
        for entry in &task.daily_log {
            println!("  {} {} {}", entry.timestamp, entry.id, entry.note);
        }
    }
}

fn normalize_parse_error(err: clap::Error) -> AppError {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    let message = first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string();
    AppError::invalid_input(message)
}

fn run_command(cli: Cli) -> Result<(), AppError> {
    match cli.command {
        Command::Init => {
            let result = task_api::complete_onboarding()?;
            if cli.json {
                let seeded = match result.seeded.as_ref() {
                    Some(task) => task_to_json(task)?,
                    None => serde_json::Value::Null,
                };
                let json = serde_json::json!({
                    "settings": result.settings,
                    "seeded": seeded,
                });
                println!("{}", json);
            } else {
                println!("Setup complete.");
                if let Some(task) = result.seeded {
                    println!("Added starter task: {} ({})", task.title, task.id);
                }
            }
        }
        Command::Add {
            title,
            description,
            due,
            remind,
        } => {
            let title = match title {
                Some(value) if !value.trim().is_empty() => value,
                _ => return Err(AppError::invalid_input("title is required")),
            };

            let task = task_api::add_task(
                &title,
                description.as_deref(),
                due.as_deref(),
                remind.as_deref(),
            )?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Added task: {} ({})", task.title, task.id);
            }
        }
        Command::List => {
            let result = task_api::list_classified()?;
            if cli.json {
                print_classification_json(&result)?;
            } else {
                print_classification_plain(&result);
            }
        }
        Command::Show { id } => {
            let task = task_api::get_task(&id)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                print_task_plain(&task);
            }
        }
        Command::Edit {
            id,
            title,
            description,
            due,
            clear_due,
            remind,
            clear_remind,
        } => {
            let edit = TaskEdit {
                title,
                description,
                due_date: if clear_due { Some(None) } else { due.map(Some) },
                remind_at: if clear_remind {
                    Some(None)
                } else {
                    remind.map(Some)
                },
            };
            let task = task_api::edit_task(&id, &edit)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Updated task: {} ({})", task.display_title(), task.id);
            }
        }
        Command::Done { id } => {
            let task = task_api::set_completed(&id, true)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Completed task: {} ({})", task.display_title(), task.id);
            }
        }
        Command::Undone { id } => {
            let task = task_api::set_completed(&id, false)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Reopened task: {} ({})", task.display_title(), task.id);
            }
        }
        Command::Delete { id } => {
            let task = task_api::delete_task(&id)?;
            if cli.json {
                print_task_json(&task)?;
            } else {
                println!("Deleted task: {} ({})", task.display_title(), task.id);
            }
        }
        Command::Reschedule { when, id } => {
            let offset = when.offset_days();
            match id {
                Some(id) => {
                    let task = task_api::reschedule_task(&id, offset)?;
                    if cli.json {
                        print_task_json(&task)?;
                    } else {
                        let due = task.due_date.as_deref().unwrap_or("-");
                        println!(
                            "Rescheduled task: {} ({}) to {}",
                            task.display_title(),
                            task.id,
                            due
                        );
                    }
                }
                None => {
                    let tasks = task_api::reschedule_overdue(offset)?;
                    if cli.json {
                        let mut payload = Vec::with_capacity(tasks.len());
                        for task in &tasks {
                            payload.push(task_to_json(task)?);
                        }
                        println!("{}", serde_json::Value::Array(payload));
                    } else {
                        println!("Rescheduled {} overdue task(s)", tasks.len());
                    }
                }
            }
        }
        Command::Subtask { subtask } => match subtask {
            SubtaskCommand::Add { task_id, title } => {
                let subtask = task_api::add_subtask(&task_id, &title)?;
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_value(&subtask)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?
                    );
                } else {
                    println!("Added subtask: {} ({})", subtask.title, subtask.id);
                }
            }
            SubtaskCommand::Done {
                task_id,
                subtask_id,
            } => {
                let subtask = task_api::set_subtask_completed(&task_id, &subtask_id, true)?;
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_value(&subtask)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?
                    );
                } else {
                    println!(
                        "Completed subtask: {} ({})",
                        subtask.display_title(),
                        subtask.id
                    );
                }
            }
            SubtaskCommand::Undone {
                task_id,
                subtask_id,
            } => {
                let subtask = task_api::set_subtask_completed(&task_id, &subtask_id, false)?;
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_value(&subtask)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?
                    );
                } else {
                    println!(
                        "Reopened subtask: {} ({})",
                        subtask.display_title(),
                        subtask.id
                    );
                }
            }
            SubtaskCommand::Delete {
                task_id,
                subtask_id,
            } => {
                let subtask = task_api::delete_subtask(&task_id, &subtask_id)?;
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_value(&subtask)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?
                    );
                } else {
                    println!(
                        "Deleted subtask: {} ({})",
                        subtask.display_title(),
                        subtask.id
                    );
                }
            }
        },
        Command::Log { log } => match log {
            LogCommand::Add { task_id, note } => {
                let entry = task_api::add_log_entry(&task_id, &note)?;
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_value(&entry)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?
                    );
                } else {
                    println!("Logged: {} ({})", entry.note, entry.id);
                }
            }
            LogCommand::Delete { task_id, entry_id } => {
                let entry = task_api::delete_log_entry(&task_id, &entry_id)?;
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_value(&entry)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?
                    );
                } else {
                    println!("Deleted log entry: {}", entry.id);
                }
            }
        },
        Command::Notify => {
            let outcome = task_api::deliver_due_notifications()?;
            if cli.json {
                let fired: Vec<&str> = outcome
                    .fired
                    .iter()
                    .map(|request| request.id.as_str())
                    .collect();
                let failures: Vec<serde_json::Value> = outcome
                    .failures
                    .iter()
                    .map(|failure| {
                        serde_json::json!({
                            "id": failure.id,
                            "error": failure.error.to_string(),
                        })
                    })
                    .collect();
                let json = serde_json::json!({
                    "fired": fired,
                    "failures": failures,
                });
                println!("{}", json);
            } else {
                println!("Delivered {} notification(s)", outcome.fired.len());
                for failure in &outcome.failures {
                    eprintln!("WARN: {} - {}", failure.id, failure.error);
                }
            }
        }
        Command::Reminders { reminders } => match reminders {
            RemindersCommand::Enable => {
                let settings = task_api::enable_reminders()?;
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_value(&settings)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?
                    );
                } else if settings.notifications_enabled {
                    println!("Notifications enabled.");
                } else {
                    println!("Notification permission denied.");
                }
            }
            RemindersCommand::Disable => {
                let settings = task_api::disable_reminders()?;
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_value(&settings)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?
                    );
                } else {
                    println!("Notifications disabled.");
                }
            }
            RemindersCommand::Review { state } => {
                let settings = task_api::set_daily_review(state.enabled())?;
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_value(&settings)
                            .map_err(|err| AppError::invalid_data(err.to_string()))?
                    );
                } else if settings.daily_review_enabled {
                    println!("Daily review reminder on.");
                } else {
                    println!("Daily review reminder off.");
                }
            }
        },
    }

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err)
            if matches!(
                err.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) =>
        {
            print!("{err}");
            return;
        }
        Err(err) => {
            eprintln!("ERROR: {}", normalize_parse_error(err));
            std::process::exit(1);
        }
    };

    if let Err(err) = run_command(cli) {
        eprintln!("ERROR: {}", err);
        std::process::exit(1);
    }
}
