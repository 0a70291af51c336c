use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Формат, в котором срок хранится в файле и показывается пользователю
pub const DUE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Приоритет задачи
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Normal,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Normal => write!(f, "normal"),
            Priority::Low => write!(f, "low"),
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            _ => Err(anyhow::anyhow!("Unknown priority: {}", s)),
        }
    }
}

/// Категория задачи, определяет цвет в выводе
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    School,
    Work,
    #[default]
    Life,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::School => write!(f, "school"),
            Category::Work => write!(f, "work"),
            Category::Life => write!(f, "life"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "school" => Ok(Category::School),
            "work" => Ok(Category::Work),
            "life" => Ok(Category::Life),
            _ => Err(anyhow::anyhow!("Unknown category: {}", s)),
        }
    }
}

/// Правило повторения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Repeat {
    #[default]
    None,
    Weekly,
}

impl std::fmt::Display for Repeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Repeat::None => write!(f, "none"),
            Repeat::Weekly => write!(f, "weekly"),
        }
    }
}

/// Основная структура задачи
///
/// Идентичность позиционная: задачу определяет её место в списке хранилища.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub name: String,
    #[serde(with = "due_format")]
    pub due: NaiveDateTime,
    pub priority: Priority,
    pub repeat: Repeat,
    pub done: bool,
    // Старые файлы не содержат категорию
    #[serde(default)]
    pub category: Category,
}

impl Task {
    pub fn new(name: impl Into<String>, due: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            due: truncate_to_minute(due),
            priority: Priority::default(),
            repeat: Repeat::default(),
            done: false,
            category: Category::default(),
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn is_weekly(&self) -> bool {
        self.repeat == Repeat::Weekly
    }

    pub fn status_label(&self) -> &'static str {
        if self.done {
            "COMPLETED"
        } else {
            "PENDING"
        }
    }

    pub fn due_display(&self) -> String {
        self.due.format(DUE_FORMAT).to_string()
    }
}

/// Срок по умолчанию, когда во вводе нет даты
pub fn fallback_due(now: NaiveDateTime) -> NaiveDateTime {
    truncate_to_minute(now + Duration::hours(1))
}

pub(crate) fn truncate_to_minute(ts: NaiveDateTime) -> NaiveDateTime {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}

mod due_format {
    use super::DUE_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(due: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&due.format(DUE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, DUE_FORMAT).map_err(serde::de::Error::custom)
    }
}
