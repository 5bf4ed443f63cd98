//! WAL (Write-Ahead Log) module
//!
//! - `entry`: WalEntry and frame encoding
//! - `reader`: replay and tail truncation (WalReader)
//! - this module: the append side (Wal, DurabilityMode)

pub mod entry;
pub mod reader;

pub use entry::{WalEntry, FRAME_HEADER_LEN, MAX_PAYLOAD_LEN};
pub use reader::{TruncateInfo, WalCorruptionInfo, WalReadResult, WalReader};

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use population_core::{PopulationError, PopulationResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

/// WAL file name inside a database directory
pub const WAL_FILE_NAME: &str = "population.wal";

/// How hard each commit is pushed to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurabilityMode {
    /// Flush and fsync before the commit becomes visible
    #[default]
    Strict,
    /// Flush to the OS before the commit becomes visible; no fsync
    Buffered,
    /// Nothing is logged; state lives only as long as the process
    None,
}

impl DurabilityMode {
    /// True if commits are written to the log at all
    pub fn writes_log(&self) -> bool {
        !matches!(self, DurabilityMode::None)
    }
}

/// Append-only log of committed transactions
///
/// Each append is one `write_all` of a complete frame. A failed append is cut
/// back off the file before the error is returned, so an aborted commit never
/// reaches a later replay. If that cut itself fails the log is poisoned and
/// every later append fails.
pub struct Wal {
    path: PathBuf,
    inner: Mutex<WalInner>,
}

struct WalInner {
    mode: DurabilityMode,
    file: File,
    /// Length of the valid log; every append starts here
    len: u64,
    poisoned: bool,
}

impl Wal {
    /// Open (or create) the log at `path` for appending
    pub fn open(path: impl AsRef<Path>, mode: DurabilityMode) -> PopulationResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| PopulationError::io(format!("cannot open WAL {}", path.display()), e))?;
        let len = file
            .metadata()
            .map_err(|e| PopulationError::io(format!("cannot stat WAL {}", path.display()), e))?
            .len();

        debug!(path = %path.display(), ?mode, len, "WAL opened");
        Ok(Wal {
            path,
            inner: Mutex::new(WalInner {
                mode,
                file,
                len,
                poisoned: false,
            }),
        })
    }

    /// Log file location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Active durability mode
    pub fn mode(&self) -> DurabilityMode {
        self.inner.lock().mode
    }

    /// Change the durability mode for subsequent appends
    pub fn set_mode(&self, mode: DurabilityMode) {
        self.inner.lock().mode = mode;
    }

    /// Length of the valid log in bytes
    pub fn len(&self) -> u64 {
        self.inner.lock().len
    }

    /// True if nothing has been logged
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Encode and append one entry, honoring the durability mode
    pub fn append(&self, entry: &WalEntry) -> PopulationResult<Option<u64>> {
        if !self.mode().writes_log() {
            return Ok(None);
        }
        self.append_frame(&entry.encode()?)
    }

    /// Append an already encoded frame.
    ///
    /// Returns the offset the frame starts at, for [`Wal::truncate_to`], or
    /// `None` when the mode does not log. On error the file is left exactly
    /// as it was before the call.
    pub fn append_frame(&self, frame: &[u8]) -> PopulationResult<Option<u64>> {
        let mut inner = self.inner.lock();
        if !inner.mode.writes_log() {
            return Ok(None);
        }
        self.ensure_usable(&inner)?;

        let start = inner.len;
        let written = inner.file.write_all(frame).and_then(|_| {
            if inner.mode == DurabilityMode::Strict {
                inner.file.sync_data()
            } else {
                Ok(())
            }
        });

        match written {
            Ok(()) => {
                inner.len = start + frame.len() as u64;
                Ok(Some(start))
            }
            Err(e) => {
                self.cut(&mut inner, start);
                Err(self.io_error("cannot append to WAL", e))
            }
        }
    }

    /// Drop everything from `offset` on.
    ///
    /// Used to take back a frame whose commit was aborted after it was logged.
    pub fn truncate_to(&self, offset: u64) -> PopulationResult<()> {
        let mut inner = self.inner.lock();
        self.ensure_usable(&inner)?;
        if offset >= inner.len {
            return Ok(());
        }
        if self.cut(&mut inner, offset) {
            Ok(())
        } else {
            Err(PopulationError::storage(format!(
                "cannot truncate WAL {} to {} bytes",
                self.path.display(),
                offset
            )))
        }
    }

    /// fsync the log
    pub fn flush(&self) -> PopulationResult<()> {
        let inner = self.inner.lock();
        inner
            .file
            .sync_all()
            .map_err(|e| self.io_error("cannot flush WAL", e))
    }

    /// Cut the file back to `offset`; poison the log if that fails
    fn cut(&self, inner: &mut WalInner, offset: u64) -> bool {
        match inner.file.set_len(offset).and_then(|_| inner.file.sync_data()) {
            Ok(()) => {
                debug!(path = %self.path.display(), offset, "WAL cut back");
                inner.len = offset;
                true
            }
            Err(e) => {
                error!(
                    path = %self.path.display(),
                    offset,
                    error = %e,
                    "Cannot cut WAL back; refusing further appends"
                );
                inner.poisoned = true;
                false
            }
        }
    }

    fn ensure_usable(&self, inner: &WalInner) -> PopulationResult<()> {
        if inner.poisoned {
            return Err(PopulationError::storage(format!(
                "WAL {} holds an aborted frame that could not be removed",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn io_error(&self, message: &str, e: std::io::Error) -> PopulationError {
        PopulationError::io(format!("{} {}", message, self.path.display()), e)
    }
}

impl std::fmt::Debug for Wal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wal")
            .field("path", &self.path)
            .field("mode", &self.mode())
            .field("len", &self.len())
            .finish()
    }
}
