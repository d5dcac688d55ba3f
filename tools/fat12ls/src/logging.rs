use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use serde_json::json;

pub const LOG_JSON_PATH_ENV: &str = "FAT12LS_LOG_JSON_PATH";

/// Human-readable lines on stderr, mirrored as JSON lines when
/// `FAT12LS_LOG_JSON_PATH` is set. Command output itself goes to stdout.
pub struct Logger {
    json_file: Option<File>,
    quiet: bool,
}

impl Logger {
    pub fn from_env() -> Result<Self> {
        let path = std::env::var(LOG_JSON_PATH_ENV).ok();
        Self::new(path.map(PathBuf::from))
    }

    pub fn new(path: Option<PathBuf>) -> Result<Self> {
        let json_file = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("opening log file {}", path.display()))?;
                Some(file)
            }
            None => None,
        };
        Ok(Self {
            json_file,
            quiet: false,
        })
    }

    /// Logger that only writes the JSON mirror, if any.
    pub fn quiet() -> Self {
        Self {
            json_file: None,
            quiet: true,
        }
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("{}", message.as_ref());
        }
        self.event("info", message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        if !self.quiet {
            eprintln!("warning: {}", message.as_ref());
        }
        self.event("warn", message.as_ref());
    }

    pub fn event(&mut self, level: &str, message: &str) {
        let Some(file) = &mut self.json_file else {
            return;
        };

        let ts_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let entry = json!({
            "ts_ms": ts_ms,
            "level": level,
            "msg": message,
        });

        let _ = writeln!(file, "{}", entry);
        let _ = file.flush();
    }
}
