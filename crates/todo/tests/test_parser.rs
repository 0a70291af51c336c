use chrono::{NaiveDate, NaiveDateTime};
use rstest::rstest;
use todo::{parse_task, Category, DueDate, Priority, Repeat, TaskParseError};

// Sunday morning
fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
        .unwrap()
        .and_hms_opt(10, 15, 30)
        .unwrap()
}

fn at(m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

#[test]
fn test_full_sentence_with_priority_and_category() {
    let parsed = parse_task(
        "Remind me to hand in my Capstone Video on Monday at 11:59pm, high, school",
        now(),
    )
    .unwrap();

    assert_eq!(
        parsed.name,
        "Remind me to hand in my Capstone Video on Monday at 11:59pm"
    );
    assert_eq!(parsed.due, DueDate::Parsed(at(10, 19, 23, 59)));
    assert_eq!(parsed.priority, Priority::High);
    assert_eq!(parsed.category, Category::School);
    assert_eq!(parsed.repeat, Repeat::None);
}

#[rstest]
#[case("buy milk", Priority::Normal, Category::Life)]
#[case("buy milk, LOW", Priority::Low, Category::Life)]
#[case("buy milk, urgent, home", Priority::Normal, Category::Life)]
#[case("buy milk, normal, Work", Priority::Normal, Category::Work)]
#[case("buy milk,, school", Priority::Normal, Category::School)]
fn test_keywords_are_positional(
    #[case] input: &str,
    #[case] priority: Priority,
    #[case] category: Category,
) {
    let parsed = parse_task(input, now()).unwrap();
    assert_eq!(parsed.name, "buy milk");
    assert_eq!(parsed.priority, priority);
    assert_eq!(parsed.category, category);
}

#[test]
fn test_no_date_falls_back_to_one_hour_from_now() {
    let parsed = parse_task("buy milk", now()).unwrap();
    assert_eq!(parsed.due, DueDate::Fallback(at(10, 18, 11, 15)));
    assert!(parsed.due.is_fallback());
}

#[rstest]
#[case("Gym every monday at 6pm", at(10, 19, 18, 0))]
#[case("Gym every Sunday", at(10, 18, 9, 0))]
#[case("Standup every tuesday at 12am", at(10, 20, 0, 0))]
#[case("Standup every wednesday at 7:30", at(10, 21, 7, 30))]
#[case("Piano every friday at 13pm", at(10, 23, 9, 0))]
fn test_weekly_recurrence(#[case] input: &str, #[case] due: NaiveDateTime) {
    let parsed = parse_task(input, now()).unwrap();
    assert_eq!(parsed.repeat, Repeat::Weekly);
    assert_eq!(parsed.due, DueDate::Parsed(due));
}

#[test]
fn test_every_non_weekday_is_weekly_with_fallback_due() {
    let parsed = parse_task("Water plants every day", now()).unwrap();
    assert_eq!(parsed.repeat, Repeat::Weekly);
    assert_eq!(parsed.due, DueDate::Fallback(at(10, 18, 11, 15)));
}

#[test]
fn test_fuzzy_date_from_name_only() {
    // date words after the first comma are not part of the name
    let parsed = parse_task("call dentist, high, friday", now()).unwrap();
    assert!(parsed.due.is_fallback());
    assert_eq!(parsed.category, Category::Life);

    let parsed = parse_task("call dentist tomorrow at 4pm, high", now()).unwrap();
    assert_eq!(parsed.due, DueDate::Parsed(at(10, 19, 16, 0)));
}

#[rstest]
#[case("What is due today?", TaskParseError::Question)]
#[case("  anything for monday?  ", TaskParseError::Question)]
#[case("   ", TaskParseError::Empty)]
#[case("", TaskParseError::Empty)]
fn test_rejected_input(#[case] input: &str, #[case] expected: TaskParseError) {
    assert_eq!(parse_task(input, now()).unwrap_err(), expected);
}
