//! Partitions the task list into time-horizon sections for display.
//!
//! Pure over the in-memory snapshot: `now` is threaded in explicitly and no
//! state is cached between calls.

use crate::model::Task;
use time::{Duration, OffsetDateTime};

/// Days from the start of today (inclusive) still counted as Upcoming.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Today,
    Upcoming,
    Later,
    NoDate,
}

impl Section {
    pub const ORDER: [Section; 4] = [
        Section::Today,
        Section::Upcoming,
        Section::Later,
        Section::NoDate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Section::Today => "Today",
            Section::Upcoming => "Upcoming",
            Section::Later => "Later",
            Section::NoDate => "Someday",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// Incomplete tasks whose reference date is strictly before today.
    /// Reported separately, never inside a section.
    pub overdue: Vec<Task>,
    /// Non-empty sections in fixed order: Today, Upcoming, Later, NoDate.
    pub sections: Vec<(Section, Vec<Task>)>,
    pub completed_count: usize,
}

pub fn classify(tasks: &[Task], now: OffsetDateTime) -> Classification {
    let offset = now.offset();
    let today = now.date();
    let upcoming_limit = today + Duration::days(UPCOMING_WINDOW_DAYS);

    let mut overdue = Vec::new();
    let mut today_bucket = Vec::new();
    let mut upcoming = Vec::new();
    let mut later = Vec::new();
    let mut no_date = Vec::new();
    let mut completed_count = 0;

    for task in tasks {
        if task.completed {
            completed_count += 1;
            continue;
        }
        match task.reference_date(offset) {
            None => no_date.push(task.clone()),
            Some(date) if date < today => overdue.push(task.clone()),
            Some(date) if date == today => today_bucket.push(task.clone()),
            Some(date) if date <= upcoming_limit => upcoming.push(task.clone()),
            Some(_) => later.push(task.clone()),
        }
    }

    for bucket in [&mut overdue, &mut today_bucket, &mut upcoming, &mut later] {
        bucket.sort_by_key(|task| {
            let key = task.reference_sort_key(offset);
            (key.is_none(), key)
        });
    }
    // no_date keeps query order.

    let sections = Section::ORDER
        .into_iter()
        .zip([today_bucket, upcoming, later, no_date])
        .filter(|(_, tasks)| !tasks.is_empty())
        .collect();

    Classification {
        overdue,
        sections,
        completed_count,
    }
}
