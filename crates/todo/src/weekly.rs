use crate::types::Task;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

/// Number of days shown by the week overview, today included
pub const WEEK_LENGTH: i64 = 7;

/// One task placed on a concrete day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaEntry {
    /// 1-based position in the store
    pub position: usize,
    /// Due time on this day; for weekly tasks the stored time moved onto the day
    pub due: NaiveDateTime,
    pub task: Task,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayAgenda {
    pub date: NaiveDate,
    pub entries: Vec<AgendaEntry>,
}

impl DayAgenda {
    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Раскладывает задачи по дням недели, начиная с `today`.
///
/// A weekly task lands on the day matching its stored weekday, at its stored
/// time. Other tasks land on their due date if it falls inside the window.
pub fn project_week(tasks: &[Task], today: NaiveDate) -> Vec<DayAgenda> {
    (0..WEEK_LENGTH)
        .map(|offset| {
            let date = today + Duration::days(offset);
            let entries = tasks
                .iter()
                .enumerate()
                .filter_map(|(index, task)| {
                    project_onto(task, date).map(|due| AgendaEntry {
                        position: index + 1,
                        due,
                        task: task.clone(),
                    })
                })
                .collect();
            DayAgenda { date, entries }
        })
        .collect()
}

/// Where `task` falls on `date`, if it does
pub fn project_onto(task: &Task, date: NaiveDate) -> Option<NaiveDateTime> {
    if task.is_weekly() {
        (task.due.weekday() == date.weekday()).then(|| date.and_time(task.due.time()))
    } else {
        (task.due.date() == date).then_some(task.due)
    }
}
