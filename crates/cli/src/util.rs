use std::path::PathBuf;
use tracing::warn;

/// Каталог данных: `$TASKPILOT_HOME` или `~/.taskpilot`
pub fn taskpilot_home() -> PathBuf {
    let dir = match std::env::var("TASKPILOT_HOME") {
        Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
        _ => {
            let mut dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            dir.push(".taskpilot");
            dir
        }
    };
    if let Err(e) = std::fs::create_dir_all(&dir) {
        warn!("Cannot create {}: {}", dir.display(), e);
    }
    dir
}
