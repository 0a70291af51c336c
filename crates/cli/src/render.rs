use colored::*;
use todo::{Category, DayAgenda, DueDate, Task, DUE_FORMAT};

pub const BANNER: &str = "Smart Task Assistant: Now with AI support!";

pub const EXAMPLE: &str =
    "Type tasks like: 'Remind me to hand in my Capstone Video on Monday at 11:59pm, high, school'";

pub const COMMANDS: &str =
    "Commands: show week | show all | done [n] | clear all | export calendar [path] | ai [question] | exit";

/// Имя задачи в цвете её категории
pub fn colored_name(task: &Task) -> ColoredString {
    match task.category {
        Category::School => task.name.blue(),
        Category::Work => task.name.green(),
        Category::Life => task.name.yellow(),
    }
}

/// Строка полного списка, позиция 1-based
pub fn task_line(position: usize, task: &Task) -> String {
    format!(
        "{}. {} | Due: {} | Priority: {} | Repeat: {} | Category: {} | {}",
        position,
        colored_name(task),
        task.due_display(),
        task.priority,
        task.repeat,
        task.category,
        task.status_label()
    )
}

pub fn all_tasks(tasks: &[Task]) -> String {
    let mut out = String::from("\nAll Tasks:\n");
    if tasks.is_empty() {
        out.push_str("No tasks added yet.\n");
        return out;
    }
    for (index, task) in tasks.iter().enumerate() {
        out.push_str(&task_line(index + 1, task));
        out.push('\n');
    }
    out
}

pub fn week(days: &[DayAgenda]) -> String {
    let mut out = String::from("\nWeek Overview:\n");
    for day in days {
        out.push_str(&format!("\nTasks for {}:\n", day.date.format("%A")));
        if day.is_empty() {
            out.push_str("  No tasks for that day!\n");
            continue;
        }
        for entry in &day.entries {
            out.push_str(&format!(
                "  - {} | Due: {} | Priority: {} | {}\n",
                colored_name(&entry.task),
                entry.due.format(DUE_FORMAT),
                entry.task.priority,
                entry.task.status_label()
            ));
        }
    }
    out
}

pub fn added(task: &Task, due: &DueDate) -> String {
    let mut line = format!(
        "Pending Task: '{}' added for {} in category [{}]",
        task.name,
        task.due_display(),
        task.category
    );
    if due.is_fallback() {
        line.push_str(&format!("\n{}", "  No date found, due in one hour.".dimmed()));
    }
    line
}

pub fn help() -> String {
    format!("{}\n{}\n{}", BANNER.bold(), EXAMPLE, COMMANDS)
}
