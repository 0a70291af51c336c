use std::path::PathBuf;

/// Команда, декодированная из одной строки ввода
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line, nothing to do
    Empty,
    /// Free text to parse into a task
    Add(String),
    ShowAll,
    ShowWeek,
    /// Mark a task done; `None` asks which one
    Done(Option<usize>),
    ClearAll { confirmed: bool },
    Ask(String),
    Export(Option<PathBuf>),
    Help,
    Exit,
}

impl Command {
    /// Decode a line typed at the interactive prompt.
    ///
    /// Keywords are matched case-insensitively on the trimmed line. Anything
    /// ending in `?` goes to the assistant; anything unrecognised is a task.
    pub fn decode(line: &str) -> Self {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();

        if trimmed.is_empty() {
            return Command::Empty;
        }

        match lower.as_str() {
            "exit" | "quit" => return Command::Exit,
            "help" => return Command::Help,
            "clear all" => return Command::ClearAll { confirmed: false },
            "show week" => return Command::ShowWeek,
            "show all" => return Command::ShowAll,
            "done" => return Command::Done(None),
            "export calendar" => return Command::Export(None),
            _ => {}
        }

        if let Some(question) = strip_keyword(trimmed, "ai ") {
            return Command::Ask(question.trim().to_string());
        }
        if trimmed.ends_with('?') {
            return Command::Ask(trimmed.to_string());
        }
        if let Some(rest) = strip_keyword(trimmed, "done ") {
            if let Ok(number) = rest.trim().parse::<usize>() {
                return Command::Done(Some(number));
            }
        }
        if let Some(path) = strip_keyword(trimmed, "export calendar ") {
            return Command::Export(Some(expand_home(path.trim())));
        }

        Command::Add(trimmed.to_string())
    }
}

/// `~` or `~/...` resolved against the user's home directory
fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// Case-insensitive ASCII prefix match, returning the rest of `line`
fn strip_keyword<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let head = line.get(..keyword.len())?;
    head.eq_ignore_ascii_case(keyword)
        .then(|| &line[keyword.len()..])
}
