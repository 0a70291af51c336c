use crate::dates::{clock_time, next_weekday, parse_fuzzy, weekday_from_name};
use crate::error::TaskParseError;
use crate::types::*;
use chrono::{NaiveDateTime, NaiveTime};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

lazy_static! {
    static ref EVERY: Regex = Regex::new(r"every (\w+)").expect("valid recurrence regex");
    static ref WEEKLY_TIME: Regex =
        Regex::new(r"\bat (\d{1,2})(?::(\d{2}))?\s*(am|pm)?").expect("valid weekly time regex");
}

/// Default time of day for a weekly task that names no time
const WEEKLY_DEFAULT_HOUR: u32 = 9;

/// How the due timestamp was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueDate {
    /// Found in the input text
    Parsed(NaiveDateTime),
    /// Nothing usable in the input; one hour from now was applied
    Fallback(NaiveDateTime),
}

impl DueDate {
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            DueDate::Parsed(ts) | DueDate::Fallback(ts) => *ts,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, DueDate::Fallback(_))
    }
}

/// Результат разбора одной строки ввода
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTask {
    pub name: String,
    pub due: DueDate,
    pub priority: Priority,
    pub category: Category,
    pub repeat: Repeat,
}

impl ParsedTask {
    pub fn into_task(self) -> Task {
        Task::new(self.name, self.due.timestamp())
            .priority(self.priority)
            .category(self.category)
            .repeat(self.repeat)
    }
}

/// Разбирает строку вида `"<name>[, <priority>[, <category>]]"`.
///
/// The name keeps any date words it contains. `every <weekday>` makes the
/// task weekly; otherwise the date comes from fuzzy parsing of the name.
pub fn parse_task(input: &str, now: NaiveDateTime) -> Result<ParsedTask, TaskParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TaskParseError::Empty);
    }
    if trimmed.ends_with('?') {
        return Err(TaskParseError::Question);
    }

    let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
    let name = parts[0].to_string();

    let priority = parts
        .get(1)
        .and_then(|p| p.parse::<Priority>().ok())
        .unwrap_or_default();
    let category = parts
        .get(2)
        .and_then(|c| c.parse::<Category>().ok())
        .unwrap_or_default();

    let lower = name.to_lowercase();
    let (repeat, due) = match EVERY.captures(&lower).and_then(|c| c.get(1)) {
        Some(word) => (Repeat::Weekly, weekly_due(word.as_str(), &lower, now)),
        None => {
            let due = match parse_fuzzy(&name, now) {
                Some(ts) => DueDate::Parsed(truncate_to_minute(ts)),
                None => DueDate::Fallback(fallback_due(now)),
            };
            (Repeat::None, due)
        }
    };

    debug!(%name, ?due, %priority, %category, %repeat, "parsed task");

    Ok(ParsedTask {
        name,
        due,
        priority,
        category,
        repeat,
    })
}

fn weekly_due(word: &str, lower: &str, now: NaiveDateTime) -> DueDate {
    let Some(weekday) = weekday_from_name(word) else {
        debug!(word, "recurrence word is not a weekday");
        return DueDate::Fallback(fallback_due(now));
    };

    let default_time = NaiveTime::from_hms_opt(WEEKLY_DEFAULT_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let time = WEEKLY_TIME
        .captures(lower)
        .and_then(|caps| {
            let hour = caps.get(1)?.as_str().parse().ok()?;
            let minute = match caps.get(2) {
                Some(m) => m.as_str().parse().ok()?,
                None => 0,
            };
            clock_time(hour, minute, caps.get(3).map(|m| m.as_str()))
        })
        .unwrap_or(default_time);

    DueDate::Parsed(next_weekday(now.date(), weekday).and_time(time))
}
