use std::path::PathBuf;
use thiserror::Error;

/// Why a line of input could not become a task
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskParseError {
    #[error("input is empty")]
    Empty,

    /// Вопросы уходят ассистенту, задачей они не становятся
    #[error("input is a question, not a task")]
    Question,
}

/// Ошибки хранилища задач
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("no task at position {position} (store holds {len})")]
    InvalidPosition { position: usize, len: usize },

    #[error("failed to read task file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write task file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("task file {path} is corrupted: {source}")]
    Corrupted {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
