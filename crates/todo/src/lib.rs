#![allow(clippy::uninlined_format_args)]

pub mod assistant;
pub mod calendar;
pub mod dates;
pub mod error;
pub mod parser;
pub mod store;
pub mod types;
pub mod weekly;

pub use assistant::{build_prompt, Assistant, GenerationSettings, TextGenerator};
pub use calendar::to_ics;
pub use error::{StoreError, TaskParseError};
pub use parser::{parse_task, DueDate, ParsedTask};
pub use store::{Completion, TaskStore};
pub use types::*;
pub use weekly::{project_week, AgendaEntry, DayAgenda};

/// Разобрать строку и сразу сохранить задачу
///
/// # Пример
/// ```no_run
/// use todo::{add_from_text, TaskStore};
///
/// fn main() -> anyhow::Result<()> {
///     let mut store = TaskStore::open("tasks.json")?;
///     let now = chrono::Local::now().naive_local();
///     let (position, parsed) = add_from_text(&mut store, "Essay on oct 21 at 11:59pm, high, school", now)?;
///     println!("#{} due {}", position, parsed.due.timestamp());
///     Ok(())
/// }
/// ```
pub fn add_from_text(
    store: &mut TaskStore,
    input: &str,
    now: chrono::NaiveDateTime,
) -> anyhow::Result<(usize, ParsedTask)> {
    let parsed = parse_task(input, now)?;
    let position = store.add(parsed.clone().into_task())?;
    Ok((position, parsed))
}
