use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use cli::{Command, Flow, Session};
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use todo::{Assistant, GenerationSettings, TaskStore, TextGenerator};

struct Scripted {
    reply: Result<String, String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl TextGenerator for Scripted {
    async fn generate(&self, prompt: &str, _settings: GenerationSettings) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply.clone().map_err(anyhow::Error::msg)
    }
}

// Sunday
fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 18)
        .unwrap()
        .and_hms_opt(10, 15, 0)
        .unwrap()
}

fn session_without_assistant() -> Session<Scripted> {
    colored::control::set_override(false);
    Session::new(TaskStore::in_memory(), None).with_clock(fixed_now)
}

fn session_with_reply(reply: Result<String, String>) -> (Session<Scripted>, Arc<Mutex<Vec<String>>>) {
    colored::control::set_override(false);
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let generator = Scripted {
        reply,
        prompts: prompts.clone(),
    };
    let session = Session::new(TaskStore::in_memory(), Some(Assistant::new(generator)))
        .with_clock(fixed_now);
    (session, prompts)
}

async fn drive(session: &mut Session<Scripted>, script: &str) -> String {
    let mut out = Vec::new();
    session
        .run(Cursor::new(script.to_string()), &mut out)
        .await
        .expect("session runs to completion");
    String::from_utf8(out).expect("utf-8 output")
}

#[tokio::test]
async fn test_add_list_and_complete() {
    let mut session = session_without_assistant();
    let output = drive(
        &mut session,
        "Essay on Monday at 11:59pm, high, school\n\
         Gym every monday at 6pm\n\
         show all\n\
         done\n\
         1\n\
         show all\n\
         exit\n",
    )
    .await;

    assert!(output.contains(
        "Pending Task: 'Essay on Monday at 11:59pm' added for 2026-10-19 23:59 in category [school]"
    ));
    assert!(output.contains(
        "Pending Task: 'Gym every monday at 6pm' added for 2026-10-19 18:00 in category [life]"
    ));
    assert!(output.contains(
        "1. Essay on Monday at 11:59pm | Due: 2026-10-19 23:59 | Priority: high | Repeat: none | Category: school | PENDING"
    ));
    assert!(output.contains("Which task number to mark as done? "));
    assert!(output.contains("Deleted 'Essay on Monday at 11:59pm' (non-repeating task)."));
    assert!(output.contains(
        "1. Gym every monday at 6pm | Due: 2026-10-19 18:00 | Priority: normal | Repeat: weekly | Category: life | PENDING"
    ));
    assert!(output.trim_end().ends_with("Goodbye!"));
    assert_eq!(session.store().len(), 1);
}

#[tokio::test]
async fn test_weekly_task_marked_done_is_kept() {
    let mut session = session_without_assistant();
    let output = drive(&mut session, "Gym every friday\ndone 1\nshow week\n").await;

    assert!(output.contains("Completed Task: 'Gym every friday' marked as done."));
    assert!(output.contains("Tasks for Friday:\n  - Gym every friday | Due: 2026-10-23 09:00 | Priority: normal | COMPLETED"));
    assert!(session.store().get(1).unwrap().done);
}

#[tokio::test]
async fn test_invalid_done_answers() {
    let mut session = session_without_assistant();
    let output = drive(&mut session, "buy milk\ndone\nabc\ndone\n7\ndone 9\n").await;

    assert!(output.contains("Invalid input."));
    assert_eq!(output.matches("Invalid number.").count(), 2);
    assert_eq!(session.store().len(), 1);
}

#[tokio::test]
async fn test_done_on_empty_list_does_not_prompt() {
    let mut session = session_without_assistant();
    let output = drive(&mut session, "done\nexit\n").await;

    assert!(output.contains("No tasks added yet."));
    assert!(!output.contains("Which task number"));
}

#[tokio::test]
async fn test_clear_needs_yes() {
    let mut session = session_without_assistant();
    let output = drive(&mut session, "buy milk\nclear all\nno\n").await;
    assert!(output.contains("Clear operation canceled."));
    assert_eq!(session.store().len(), 1);

    let output = drive(&mut session, "clear all\nYES\n").await;
    assert!(output.contains("All tasks have been cleared."));
    assert!(session.store().is_empty());
}

#[tokio::test]
async fn test_fallback_due_is_reported() {
    let mut session = session_without_assistant();
    let output = drive(&mut session, "buy milk\n").await;

    assert!(output.contains("Pending Task: 'buy milk' added for 2026-10-18 11:15 in category [life]"));
    assert!(output.contains("No date found, due in one hour."));
}

#[tokio::test]
async fn test_questions_reach_the_assistant() {
    let (mut session, prompts) = session_with_reply(Ok("Start with the essay.".to_string()));
    let output = drive(
        &mut session,
        "Essay on Monday at 11:59pm, high, school\nWhat should I do first?\nai plan my week\n",
    )
    .await;

    assert_eq!(output.matches("Start with the essay.").count(), 2);
    let prompts = prompts.lock().unwrap();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[0].contains(
        "- Essay on Monday at 11:59pm (Due: 2026-10-19 23:59, Priority: high, Category: school)"
    ));
    assert!(prompts[0].ends_with("User: What should I do first?\nAssistant:"));
    assert!(prompts[1].ends_with("User: plan my week\nAssistant:"));
    // вопросы не становятся задачами
    assert_eq!(session.store().len(), 1);
}

#[tokio::test]
async fn test_assistant_failure_does_not_stop_the_loop() {
    let (mut session, _prompts) = session_with_reply(Err("model offline".to_string()));
    let output = drive(&mut session, "anything due?\nexit\n").await;

    assert!(output.contains("Error: model offline"));
    assert!(output.contains("Goodbye!"));
}

#[tokio::test]
async fn test_ask_without_assistant() {
    let mut session = session_without_assistant();
    let output = drive(&mut session, "ai hello\n").await;
    assert!(output.contains("Assistant is not configured."));
}

#[tokio::test]
async fn test_export_writes_calendar() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("week.ics");
    let mut session = session_without_assistant();
    drive(&mut session, "Gym every monday at 6pm\n").await;

    let mut out = Vec::new();
    let flow = session
        .execute(
            Command::Export(Some(path.clone())),
            &mut Cursor::new(String::new()),
            &mut out,
        )
        .await
        .unwrap();

    assert_eq!(flow, Flow::Continue);
    let ics = std::fs::read_to_string(&path).unwrap();
    assert!(ics.contains("DTSTART:20261019T180000"));
    assert!(ics.contains("RRULE:FREQ=WEEKLY"));
    assert!(String::from_utf8(out).unwrap().contains("Exported 1 task(s)"));
}

#[tokio::test]
async fn test_session_persists_to_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.json");
    colored::control::set_override(false);
    let mut session: Session<Scripted> =
        Session::new(TaskStore::open(&path).unwrap(), None).with_clock(fixed_now);

    drive(&mut session, "Essay tomorrow at 9am, low, work\n").await;

    let reopened = TaskStore::open(&path).unwrap();
    let task = reopened.get(1).unwrap();
    assert_eq!(task.name, "Essay tomorrow at 9am");
    assert_eq!(task.due_display(), "2026-10-19 09:00");
}
