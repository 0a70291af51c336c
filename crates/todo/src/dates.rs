//! Fuzzy date/time extraction from free text.
//!
//! Finds the date-like fragments of a sentence ("hand in essay on oct 21 at
//! 11:59pm") and ignores the rest. Nothing here knows about tasks; the parser
//! decides what to do when no date is found.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

const MONTHS: &str = "january|jan|february|feb|march|mar|april|apr|may|june|jun|july|jul|\
                      august|aug|september|sept|sep|october|oct|november|nov|december|dec";

const WEEKDAYS: &str = "monday|mon|tuesday|tues|tue|wednesday|wed|thursday|thurs|thur|thu|\
                        friday|fri|saturday|sat|sunday|sun";

lazy_static! {
    static ref RELATIVE_OFFSET: Regex =
        Regex::new(r"\bin\s+(\d{1,4})\s+(minutes?|mins?|hours?|hrs?|days?|weeks?)\b")
            .expect("valid offset regex");
    static ref CLOCK: Regex =
        Regex::new(r"\b(\d{1,2}):(\d{2})\s*(am|pm)?\b").expect("valid clock regex");
    static ref HOUR_MERIDIEM: Regex =
        Regex::new(r"\b(\d{1,2})\s*(am|pm)\b").expect("valid meridiem regex");
    static ref AT_HOUR: Regex = Regex::new(r"\bat\s+(\d{1,2})\b").expect("valid hour regex");
    static ref NAMED_TIME: Regex = Regex::new(r"\b(noon|midnight)\b").expect("valid named time regex");
    static ref ISO_DATE: Regex =
        Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").expect("valid iso regex");
    static ref SLASH_DATE: Regex =
        Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{4}|\d{2}))?\b").expect("valid slash regex");
    static ref MONTH_DAY: Regex = Regex::new(&format!(
        r"\b({MONTHS})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}})\b)?"
    ))
    .expect("valid month-day regex");
    static ref DAY_MONTH: Regex = Regex::new(&format!(
        r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTHS})\b\.?(?:,?\s+(\d{{4}})\b)?"
    ))
    .expect("valid day-month regex");
    static ref RELATIVE_DAY: Regex =
        Regex::new(r"\b(today|tonight|tomorrow)\b").expect("valid relative day regex");
    static ref WEEKDAY: Regex =
        Regex::new(&format!(r"\b({WEEKDAYS})\b")).expect("valid weekday regex");
}

/// Extract a timestamp from `text`, resolving relative words against `now`.
///
/// Returns `None` when the text holds nothing date- or time-like.
pub fn parse_fuzzy(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let lower = text.to_lowercase();

    if let Some(offset) = relative_offset(&lower) {
        debug!(?offset, "relative offset found");
        return Some(now + offset);
    }

    let time = find_time(&lower);
    let today = now.date();
    let relative = RELATIVE_DAY
        .captures(&lower)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let date = explicit_date(&lower, today)
        .or_else(|| {
            relative.as_deref().map(|word| match word {
                "tomorrow" => today + Duration::days(1),
                _ => today,
            })
        })
        .or_else(|| {
            WEEKDAY
                .captures(&lower)
                .and_then(|c| c.get(1))
                .and_then(|m| weekday_from_name(m.as_str()))
                .map(|wd| next_weekday(today, wd))
        });

    match (date, time) {
        (None, None) => None,
        (Some(date), Some(time)) => Some(date.and_time(time)),
        (None, Some(time)) => Some(today.and_time(time)),
        (Some(date), None) => {
            let default_time = if relative.as_deref() == Some("tonight") {
                NaiveTime::from_hms_opt(20, 0, 0)
            } else {
                NaiveTime::from_hms_opt(0, 0, 0)
            };
            default_time.map(|t| date.and_time(t))
        }
    }
}

/// The next date on or after `from` that falls on `weekday`.
pub fn next_weekday(from: NaiveDate, weekday: Weekday) -> NaiveDate {
    let ahead = (weekday.num_days_from_monday() as i64
        - from.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    from + Duration::days(ahead)
}

pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.to_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tues" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thurs" | "thur" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Convert a 12- or 24-hour clock reading to a time of day.
///
/// With a meridiem the hour must be 1..=12: `12am` is midnight, `12pm` is noon.
pub fn clock_time(hour: u32, minute: u32, meridiem: Option<&str>) -> Option<NaiveTime> {
    let hour = match meridiem {
        Some(m) if !(1..=12).contains(&hour) => {
            debug!(hour, meridiem = m, "hour out of range for 12-hour clock");
            return None;
        }
        Some("pm") if hour != 12 => hour + 12,
        Some("am") if hour == 12 => 0,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn relative_offset(lower: &str) -> Option<Duration> {
    let caps = RELATIVE_OFFSET.captures(lower)?;
    let amount: i64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str();
    let offset = if unit.starts_with("min") {
        Duration::minutes(amount)
    } else if unit.starts_with('h') {
        Duration::hours(amount)
    } else if unit.starts_with('d') {
        Duration::days(amount)
    } else {
        Duration::weeks(amount)
    };
    Some(offset)
}

fn find_time(lower: &str) -> Option<NaiveTime> {
    if let Some(caps) = CLOCK.captures(lower) {
        let hour = caps.get(1)?.as_str().parse().ok()?;
        let minute = caps.get(2)?.as_str().parse().ok()?;
        if let Some(t) = clock_time(hour, minute, caps.get(3).map(|m| m.as_str())) {
            return Some(t);
        }
    }
    if let Some(caps) = HOUR_MERIDIEM.captures(lower) {
        let hour = caps.get(1)?.as_str().parse().ok()?;
        if let Some(t) = clock_time(hour, 0, caps.get(2).map(|m| m.as_str())) {
            return Some(t);
        }
    }
    if let Some(caps) = AT_HOUR.captures(lower) {
        let hour = caps.get(1)?.as_str().parse().ok()?;
        if let Some(t) = clock_time(hour, 0, None) {
            return Some(t);
        }
    }
    match NAMED_TIME.captures(lower)?.get(1)?.as_str() {
        "noon" => NaiveTime::from_hms_opt(12, 0, 0),
        _ => NaiveTime::from_hms_opt(0, 0, 0),
    }
}

fn explicit_date(lower: &str, today: NaiveDate) -> Option<NaiveDate> {
    iso_date(lower)
        .or_else(|| slash_date(lower, today))
        .or_else(|| month_name_date(lower, today))
}

fn iso_date(lower: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE.captures(lower)?;
    NaiveDate::from_ymd_opt(
        caps.get(1)?.as_str().parse().ok()?,
        caps.get(2)?.as_str().parse().ok()?,
        caps.get(3)?.as_str().parse().ok()?,
    )
}

fn slash_date(lower: &str, today: NaiveDate) -> Option<NaiveDate> {
    let caps = SLASH_DATE.captures(lower)?;
    let month = caps.get(1)?.as_str().parse().ok()?;
    let day = caps.get(2)?.as_str().parse().ok()?;
    let year = match caps.get(3) {
        Some(y) if y.as_str().len() == 2 => 2000 + y.as_str().parse::<i32>().ok()?,
        Some(y) => y.as_str().parse().ok()?,
        None => today.year(),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_name_date(lower: &str, today: NaiveDate) -> Option<NaiveDate> {
    let (month, day, year) = if let Some(caps) = MONTH_DAY.captures(lower) {
        (
            month_from_name(caps.get(1)?.as_str())?,
            caps.get(2)?.as_str().parse().ok()?,
            caps.get(3),
        )
    } else {
        let caps = DAY_MONTH.captures(lower)?;
        (
            month_from_name(caps.get(2)?.as_str())?,
            caps.get(1)?.as_str().parse().ok()?,
            caps.get(3),
        )
    };
    let year = match year {
        Some(y) => y.as_str().parse().ok()?,
        None => today.year(),
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_from_name(name: &str) -> Option<u32> {
    let month = match &name[..3.min(name.len())] {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
