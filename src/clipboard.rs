use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("clipboard command is empty")]
    NoCommand,

    #[error("could not run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Exit { program: String, status: String },

    #[error("could not write {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub trait Clipboard {
    fn name(&self) -> String;
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// Pipes text into an external program such as `xclip` or `wl-copy`.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Splits a command line on whitespace.
    pub fn from_command_line(line: &str) -> Result<Self, ClipboardError> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or(ClipboardError::NoCommand)?;
        Ok(Self::new(program, parts.collect()))
    }
}

impl Clipboard for CommandClipboard {
    fn name(&self) -> String {
        self.program.clone()
    }

    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let spawn_err = |source| ClipboardError::Spawn {
            program: self.program.clone(),
            source,
        };
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_err)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(text.as_bytes()).map_err(spawn_err)?;
        }
        let status = child.wait().map_err(spawn_err)?;
        if status.success() {
            Ok(())
        } else {
            Err(ClipboardError::Exit {
                program: self.program.clone(),
                status: status.to_string(),
            })
        }
    }
}

/// Writes the text to a file the user can open and copy from.
#[derive(Debug, Clone)]
pub struct FileClipboard {
    path: PathBuf,
}

impl FileClipboard {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Clipboard for FileClipboard {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let file_err = |source| ClipboardError::File {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(file_err)?;
        }
        fs::write(&self.path, text).map_err(file_err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Primary,
    Fallback(String),
    Failed(String),
}

/// Tries `primary`, then `fallback`. Failures are logged and reported, never raised.
pub fn copy_with_fallback(
    text: &str,
    primary: &dyn Clipboard,
    fallback: &dyn Clipboard,
) -> CopyOutcome {
    let primary_err = match primary.copy(text) {
        Ok(()) => {
            info!(target_name = %primary.name(), "copied report");
            return CopyOutcome::Primary;
        }
        Err(err) => err,
    };
    warn!(error = %primary_err, "primary clipboard failed, trying fallback");

    match fallback.copy(text) {
        Ok(()) => {
            info!(target_name = %fallback.name(), "copied report via fallback");
            CopyOutcome::Fallback(fallback.name())
        }
        Err(err) => {
            warn!(error = %err, "fallback clipboard failed");
            CopyOutcome::Failed(format!("{primary_err}; {err}"))
        }
    }
}
