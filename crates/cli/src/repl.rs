use crate::commands::Command;
use crate::render;
use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDateTime};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use todo::{
    parse_task, project_week, to_ics, Assistant, Completion, StoreError, TaskParseError,
    TaskStore, TextGenerator,
};
use tracing::{debug, warn};

pub const PROMPT: &str = "What can I help you with? ";

const DEFAULT_EXPORT: &str = "tasks.ics";

const NOT_UNDERSTOOD: &str = "Couldn't understand. Try rephrasing or use 'ai [question]'.";

const NO_ASSISTANT: &str =
    "Assistant is not configured. Set LLM_PROVIDER and the matching API key, then restart.";

/// Продолжать ли цикл после команды
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

type Clock = Box<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Состояние сеанса: хранилище задач и, если настроен, ассистент
pub struct Session<G> {
    store: TaskStore,
    assistant: Option<Assistant<G>>,
    clock: Clock,
}

impl<G: TextGenerator> Session<G> {
    pub fn new(store: TaskStore, assistant: Option<Assistant<G>>) -> Self {
        Self {
            store,
            assistant,
            clock: Box::new(|| Local::now().naive_local()),
        }
    }

    /// Replace the wall clock, for reproducible dates
    pub fn with_clock<F>(mut self, clock: F) -> Self
    where
        F: Fn() -> NaiveDateTime + Send + Sync + 'static,
    {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Interactive loop until `exit` or end of input.
    ///
    /// A failing command is reported and the loop goes on.
    pub async fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        writeln!(out, "\n{}\n", render::help())?;

        loop {
            let Some(line) = prompt(&mut input, &mut out, PROMPT)? else {
                writeln!(out)?;
                break;
            };
            let command = Command::decode(&line);
            debug!(?command, "decoded input");

            match self.execute(command, &mut input, &mut out).await {
                Ok(Flow::Exit) => break,
                Ok(Flow::Continue) => {}
                Err(e) => {
                    warn!("Command failed: {:#}", e);
                    writeln!(out, "Error: {:#}", e)?;
                }
            }
        }
        Ok(())
    }

    /// Выполнить одну команду
    ///
    /// `input` is only read by commands that ask a follow-up question.
    pub async fn execute<R: BufRead, W: Write>(
        &mut self,
        command: Command,
        input: &mut R,
        out: &mut W,
    ) -> Result<Flow> {
        match command {
            Command::Empty => {}
            Command::Exit => {
                writeln!(out, "Goodbye!")?;
                return Ok(Flow::Exit);
            }
            Command::Help => writeln!(out, "{}", render::help())?,
            Command::Add(text) => self.add(&text, out)?,
            Command::ShowAll => write!(out, "{}", render::all_tasks(self.store.tasks()))?,
            Command::ShowWeek => {
                let today = (self.clock)().date();
                let days = project_week(self.store.tasks(), today);
                write!(out, "{}", render::week(&days))?;
            }
            Command::Done(Some(position)) => self.complete(position, out)?,
            Command::Done(None) => {
                write!(out, "{}", render::all_tasks(self.store.tasks()))?;
                if self.store.is_empty() {
                    return Ok(Flow::Continue);
                }
                let answer = prompt(input, out, "Which task number to mark as done? ")?;
                match answer.as_deref().map(str::trim).map(str::parse::<usize>) {
                    Some(Ok(position)) => self.complete(position, out)?,
                    _ => writeln!(out, "Invalid input.")?,
                }
            }
            Command::ClearAll { confirmed } => {
                let confirmed = confirmed || {
                    let answer = prompt(
                        input,
                        out,
                        "Are you sure you want to delete all tasks? (yes/no): ",
                    )?;
                    answer.is_some_and(|a| a.trim().eq_ignore_ascii_case("yes"))
                };
                if confirmed {
                    self.store.clear()?;
                    writeln!(out, "All tasks have been cleared.")?;
                } else {
                    writeln!(out, "Clear operation canceled.")?;
                }
            }
            Command::Ask(question) => {
                let Some(assistant) = &self.assistant else {
                    writeln!(out, "{}", NO_ASSISTANT)?;
                    return Ok(Flow::Continue);
                };
                let answer = assistant.ask(self.store.tasks(), &question).await?;
                writeln!(out, "{}", answer)?;
            }
            Command::Export(path) => {
                let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT));
                let ics = to_ics(self.store.tasks(), (self.clock)());
                std::fs::write(&path, ics)
                    .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;
                writeln!(
                    out,
                    "Exported {} task(s) to {}",
                    self.store.len(),
                    path.display()
                )?;
            }
        }
        Ok(Flow::Continue)
    }

    fn add<W: Write>(&mut self, text: &str, out: &mut W) -> Result<()> {
        match parse_task(text, (self.clock)()) {
            Ok(parsed) => {
                let due = parsed.due;
                let task = parsed.into_task();
                let line = render::added(&task, &due);
                self.store.add(task)?;
                writeln!(out, "{}", line)?;
            }
            Err(TaskParseError::Empty | TaskParseError::Question) => {
                writeln!(out, "{}", NOT_UNDERSTOOD)?;
            }
        }
        Ok(())
    }

    fn complete<W: Write>(&mut self, position: usize, out: &mut W) -> Result<()> {
        match self.store.complete(position) {
            Ok(Completion::Deleted(task)) => {
                writeln!(out, "Deleted '{}' (non-repeating task).", task.name)?
            }
            Ok(Completion::MarkedDone(task)) => {
                writeln!(out, "Completed Task: '{}' marked as done.", task.name)?
            }
            Err(StoreError::InvalidPosition { .. }) => writeln!(out, "Invalid number.")?,
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

/// Print `text`, read one line; `None` at end of input
fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, text: &str) -> Result<Option<String>> {
    write!(out, "{}", text)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}
