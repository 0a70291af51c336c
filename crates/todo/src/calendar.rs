//! iCalendar export of the task list.

use crate::types::{Priority, Task};
use chrono::NaiveDateTime;

const ICS_STAMP: &str = "%Y%m%dT%H%M%S";

/// Content lines longer than this many octets are folded
const MAX_LINE_OCTETS: usize = 75;

/// Render tasks as an RFC 5545 calendar, one event per task.
///
/// Due times are written as floating local times. `stamp` becomes every
/// event's `DTSTAMP`.
pub fn to_ics(tasks: &[Task], stamp: NaiveDateTime) -> String {
    let mut out = String::new();
    push_line(&mut out, "BEGIN:VCALENDAR");
    push_line(&mut out, "VERSION:2.0");
    push_line(&mut out, "PRODID:-//taskpilot//tasks//EN");
    push_line(&mut out, "CALSCALE:GREGORIAN");

    for (index, task) in tasks.iter().enumerate() {
        push_line(&mut out, "BEGIN:VEVENT");
        push_line(
            &mut out,
            &format!("UID:{}-{}@taskpilot", task.due.format(ICS_STAMP), index + 1),
        );
        push_line(&mut out, &format!("DTSTAMP:{}", stamp.format(ICS_STAMP)));
        push_line(&mut out, &format!("DTSTART:{}", task.due.format(ICS_STAMP)));
        push_line(&mut out, "DURATION:PT1H");
        push_line(&mut out, &format!("SUMMARY:{}", escape_text(&task.name)));
        push_line(
            &mut out,
            &format!("CATEGORIES:{}", task.category.to_string().to_uppercase()),
        );
        push_line(&mut out, &format!("PRIORITY:{}", ics_priority(task.priority)));
        if task.is_weekly() {
            push_line(&mut out, "RRULE:FREQ=WEEKLY");
        }
        push_line(&mut out, "END:VEVENT");
    }

    push_line(&mut out, "END:VCALENDAR");
    out
}

fn ics_priority(priority: Priority) -> u8 {
    match priority {
        Priority::High => 1,
        Priority::Normal => 5,
        Priority::Low => 9,
    }
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

/// Append one content line, folded with CRLF + space on char boundaries
fn push_line(out: &mut String, line: &str) {
    let mut rest = line;
    let mut limit = MAX_LINE_OCTETS;
    while rest.len() > limit {
        let mut cut = limit;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        out.push_str(&rest[..cut]);
        out.push_str("\r\n ");
        rest = &rest[cut..];
        // продолжение начинается с пробела, он тоже считается
        limit = MAX_LINE_OCTETS - 1;
    }
    out.push_str(rest);
    out.push_str("\r\n");
}
