use crate::error::StoreError;
use crate::types::*;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Итог отметки задачи выполненной
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Non-repeating task, removed from the list
    Deleted(Task),
    /// Weekly task, kept with `done = true`
    MarkedDone(Task),
}

/// Упорядоченный список задач, зеркалируемый в JSON файл
///
/// Every mutation is written out before the call returns.
#[derive(Debug)]
pub struct TaskStore {
    path: Option<PathBuf>,
    tasks: Vec<Task>,
}

impl TaskStore {
    /// Открыть хранилище; отсутствующий файл означает пустой список
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let tasks = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => Vec::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|source| StoreError::Corrupted {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.clone(),
                    source,
                })
            }
        };

        info!(path = %path.display(), count = tasks.len(), "task store opened");

        Ok(Self {
            path: Some(path),
            tasks,
        })
    }

    /// Хранилище без файла
    pub fn in_memory() -> Self {
        Self {
            path: None,
            tasks: Vec::new(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks that are not done, in store order
    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.done)
    }

    /// Задача по 1-based позиции
    pub fn get(&self, position: usize) -> Option<&Task> {
        position.checked_sub(1).and_then(|i| self.tasks.get(i))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Append a task; returns its 1-based position
    pub fn add(&mut self, task: Task) -> Result<usize, StoreError> {
        debug!(name = %task.name, due = %task.due_display(), "adding task");
        let mut next = self.tasks.clone();
        next.push(task);
        self.commit(next)?;
        Ok(self.tasks.len())
    }

    /// Отметить задачу выполненной.
    ///
    /// Non-repeating tasks are deleted; weekly tasks stay with `done = true`
    /// and are never reset automatically.
    pub fn complete(&mut self, position: usize) -> Result<Completion, StoreError> {
        let len = self.tasks.len();
        let index = position
            .checked_sub(1)
            .filter(|i| *i < len)
            .ok_or(StoreError::InvalidPosition { position, len })?;

        let mut next = self.tasks.clone();
        let completion = if next[index].is_weekly() {
            next[index].done = true;
            Completion::MarkedDone(next[index].clone())
        } else {
            Completion::Deleted(next.remove(index))
        };

        self.commit(next)?;
        Ok(completion)
    }

    /// Удалить все задачи вместе с файлом
    pub fn clear(&mut self) -> Result<(), StoreError> {
        if let Some(path) = &self.path {
            match fs::remove_file(path) {
                Ok(()) => info!(path = %path.display(), "task file removed"),
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(source) => {
                    return Err(StoreError::Write {
                        path: path.clone(),
                        source,
                    })
                }
            }
        }
        self.tasks.clear();
        Ok(())
    }

    /// Записать `next` на диск и только потом заменить список в памяти
    fn commit(&mut self, next: Vec<Task>) -> Result<(), StoreError> {
        self.save(&next)?;
        self.tasks = next;
        Ok(())
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let json = serde_json::to_string_pretty(tasks)?;
        let write_err = |source: std::io::Error| StoreError::Write {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        // Пишем во временный файл и переименовываем, чтобы не оставить обрывок
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, path).map_err(write_err)?;

        debug!(path = %path.display(), count = tasks.len(), "tasks saved");
        Ok(())
    }
}
