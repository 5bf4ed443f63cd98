//! Line editing for the interactive shell.

use std::path::PathBuf;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::{debug, warn};

use crate::repl::{LineSource, ReadOutcome};

/// Terminal input with line editing and optional persistent history
pub struct Editor {
    inner: DefaultEditor,
    history_file: Option<PathBuf>,
}

impl Editor {
    /// Create an editor, loading history from `history_file` if it exists
    pub fn new(history_file: Option<PathBuf>) -> rustyline::Result<Self> {
        let mut inner = DefaultEditor::new()?;
        if let Some(path) = &history_file {
            if path.exists() {
                if let Err(e) = inner.load_history(path) {
                    warn!(path = %path.display(), error = %e, "Could not load shell history");
                }
            }
        }
        Ok(Editor {
            inner,
            history_file,
        })
    }
}

impl LineSource for Editor {
    fn read_line(&mut self, prompt: &str) -> ReadOutcome {
        let read = outcome(self.inner.readline(prompt));
        if let ReadOutcome::Line(line) = &read {
            if !line.trim().is_empty() {
                if let Err(e) = self.inner.add_history_entry(line.as_str()) {
                    debug!(error = %e, "Could not record history entry");
                }
            }
        }
        read
    }

    fn close(&mut self) {
        if let Some(path) = &self.history_file {
            if let Err(e) = self.inner.save_history(path) {
                warn!(path = %path.display(), error = %e, "Could not save shell history");
            }
        }
    }
}

/// Map a readline result; unexpected errors end the session with a warning
fn outcome(result: rustyline::Result<String>) -> ReadOutcome {
    match result {
        Ok(line) => ReadOutcome::Line(line),
        Err(ReadlineError::Interrupted) => ReadOutcome::Interrupted,
        Err(ReadlineError::Eof) => ReadOutcome::Eof,
        Err(e) => {
            warn!(error = %e, "Cannot read input; leaving the shell");
            ReadOutcome::Eof
        }
    }
}
