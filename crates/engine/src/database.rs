//! Database: world state, commit path, WAL and notifications in one handle
//!
//! A database is either directory-backed (`open`) or purely in memory
//! (`cache`). A directory holds:
//!
//! - `population.wal`: committed transactions
//! - `population.toml`: configuration
//! - `population.lock`: exclusive lock held while open
//!
//! On open the WAL is replayed into a fresh world state; a damaged tail is
//! truncated first.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use fs2::FileExt;
use parking_lot::RwLock;
use population_concurrency::{CommitPipeline, TransactionContext, TransactionManager};
use population_core::{
    ChangeEvent, CommitRecord, PopulationError, PopulationResult, Storage, Timestamp, Version,
};
use population_durability::{Wal, WalEntry, WalReader, WAL_FILE_NAME};
use population_storage::WorldState;
use tracing::{debug, error, info, warn};

use crate::config::{PopulationConfig, CONFIG_FILE_NAME};
use crate::notify::{self, ChangeSink, EventHub, NotificationPolicy, SinkId};

/// Lock file name inside a database directory
pub const LOCK_FILE_NAME: &str = "population.lock";

/// Embedded registry database
pub struct Database {
    path: Option<PathBuf>,
    storage: WorldState,
    manager: TransactionManager,
    wal: Option<Wal>,
    events: EventHub,
    config: RwLock<PopulationConfig>,
    /// Held for the lifetime of the handle; released on drop
    _lock: Option<File>,
}

impl Database {
    /// Open a directory-backed database, loading or creating `population.toml`
    pub fn open(path: impl AsRef<Path>) -> PopulationResult<Self> {
        let path = path.as_ref();
        create_dir(path)?;
        let lock = lock_dir(path)?;
        let config = PopulationConfig::load_or_init(path)?;
        Self::recover(path, config, lock)
    }

    /// Open a directory-backed database with an explicit configuration.
    ///
    /// The configuration file in the directory is neither read nor written.
    pub fn open_with_config(
        path: impl AsRef<Path>,
        config: PopulationConfig,
    ) -> PopulationResult<Self> {
        config.validate()?;
        let path = path.as_ref();
        create_dir(path)?;
        let lock = lock_dir(path)?;
        Self::recover(path, config, lock)
    }

    /// In-memory database with default configuration; nothing is persisted
    pub fn cache() -> PopulationResult<Self> {
        Self::cache_with_config(PopulationConfig::default())
    }

    /// In-memory database with the given configuration
    pub fn cache_with_config(config: PopulationConfig) -> PopulationResult<Self> {
        config.validate()?;
        Ok(Database {
            path: None,
            storage: WorldState::new(),
            manager: TransactionManager::default(),
            wal: None,
            events: EventHub::new(),
            config: RwLock::new(config),
            _lock: None,
        })
    }

    fn recover(dir: &Path, config: PopulationConfig, lock: File) -> PopulationResult<Self> {
        let wal_path = dir.join(WAL_FILE_NAME);
        let result = WalReader::read(&wal_path)?;
        WalReader::truncate(&wal_path, &result)?;

        let storage = WorldState::new();
        let mut last_timestamp = Timestamp::EPOCH;
        for record in &result.records {
            storage.apply(record)?;
            last_timestamp = last_timestamp.max(record.timestamp);
            debug!(tx_id = %record.tx_id, version = record.version, "Replayed commit");
        }
        storage.set_version(result.last_version());

        let wal = Wal::open(&wal_path, config.durability)?;
        info!(
            path = %dir.display(),
            commits = result.records.len(),
            keys = storage.key_count(),
            version = storage.version(),
            "Database opened"
        );

        Ok(Database {
            path: Some(dir.to_path_buf()),
            storage,
            manager: TransactionManager::new(last_timestamp),
            wal: Some(wal),
            events: EventHub::new(),
            config: RwLock::new(config),
            _lock: Some(lock),
        })
    }

    /// Run `f` in a transaction and commit it.
    ///
    /// If `f` fails, the transaction is aborted and nothing is written.
    /// A concurrent commit that changed anything `f` read fails the commit
    /// with `Conflict`; there is no retry. Called from inside a
    /// [`ChangeSink`], only read-only transactions are allowed.
    pub fn transaction<F, T>(&self, f: F) -> PopulationResult<T>
    where
        F: FnOnce(&mut TransactionContext<'_>) -> PopulationResult<T>,
    {
        let mut txn = TransactionContext::new(&self.storage);
        match f(&mut txn) {
            Ok(value) => {
                // the commit lock is held while sinks run
                if !txn.is_read_only() && notify::delivering() {
                    debug!(tx_id = %txn.tx_id(), "Write from inside a change sink refused");
                    txn.abort();
                    return Err(PopulationError::invalid_input(
                        "change sinks cannot write to the database",
                    ));
                }
                let hooks = CommitHooks {
                    wal: self.wal.as_ref(),
                    events: &self.events,
                    policy: self.config.read().notification_policy,
                };
                self.manager.commit(txn, &self.storage, &hooks)?;
                Ok(value)
            }
            Err(e) => {
                debug!(tx_id = %txn.tx_id(), error = %e, "Transaction aborted");
                txn.abort();
                Err(e)
            }
        }
    }

    /// Subscribe to change events through a bounded channel
    pub fn subscribe(&self) -> Receiver<ChangeEvent> {
        let capacity = self.config.read().event_channel_capacity;
        self.events.subscribe(capacity)
    }

    /// Register a custom change sink
    pub fn add_sink(&self, sink: Arc<dyn ChangeSink>) -> SinkId {
        self.events.add_sink(sink)
    }

    /// Unregister a change sink
    pub fn remove_sink(&self, id: SinkId) -> bool {
        self.events.remove_sink(id)
    }

    /// Current configuration
    pub fn config(&self) -> PopulationConfig {
        self.config.read().clone()
    }

    /// Modify the configuration.
    ///
    /// The change applies to subsequent transactions and, for a
    /// directory-backed database, is saved to `population.toml`.
    pub fn update_config<F>(&self, f: F) -> PopulationResult<()>
    where
        F: FnOnce(&mut PopulationConfig),
    {
        let mut config = self.config.write();
        let mut updated = config.clone();
        f(&mut updated);
        updated.validate()?;

        if let Some(path) = &self.path {
            updated.save(&path.join(CONFIG_FILE_NAME))?;
        }
        if let Some(wal) = &self.wal {
            wal.set_mode(updated.durability);
        }
        *config = updated;
        Ok(())
    }

    /// Committed world state
    pub fn storage(&self) -> &WorldState {
        &self.storage
    }

    /// Highest committed version
    pub fn version(&self) -> Version {
        self.storage.version()
    }

    /// Directory backing this database, `None` for an in-memory one
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True if nothing is persisted
    pub fn is_ephemeral(&self) -> bool {
        self.path.is_none()
    }

    /// Flush and fsync the WAL
    pub fn flush(&self) -> PopulationResult<()> {
        match &self.wal {
            Some(wal) => wal.flush(),
            None => Ok(()),
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!(error = %e, "Failed to flush WAL on close");
        }
        if let Some(path) = &self.path {
            info!(path = %path.display(), "Database closed");
        }
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("path", &self.path)
            .field("version", &self.storage.version())
            .field("keys", &self.storage.key_count())
            .field("events", &self.events)
            .finish()
    }
}

/// Durability and notification steps of one commit
struct CommitHooks<'a> {
    wal: Option<&'a Wal>,
    events: &'a EventHub,
    policy: NotificationPolicy,
}

impl CommitPipeline for CommitHooks<'_> {
    /// Log the commit, then deliver a strict event.
    ///
    /// The frame is encoded before anything is written so size and encoding
    /// errors surface first. A rejected delivery takes the frame back off the
    /// log, so a failed commit leaves neither an event nor a logged write.
    fn prepare(&self, commit: &CommitRecord, event: Option<&ChangeEvent>) -> PopulationResult<()> {
        let logged = match self.wal {
            Some(wal) if wal.mode().writes_log() => {
                let frame = WalEntry::Commit(commit.clone()).encode()?;
                wal.append_frame(&frame)?.map(|offset| (wal, offset))
            }
            _ => None,
        };

        if let (NotificationPolicy::Strict, Some(event)) = (self.policy, event) {
            if let Err(e) = self.events.deliver(event) {
                if let Some((wal, offset)) = logged {
                    if let Err(cut) = wal.truncate_to(offset) {
                        error!(tx_id = %commit.tx_id, error = %cut, "Aborted commit left in WAL");
                    }
                }
                return Err(e);
            }
        }
        Ok(())
    }

    fn committed(&self, commit: &CommitRecord, event: Option<ChangeEvent>) {
        if let (NotificationPolicy::BestEffort, Some(event)) = (self.policy, event) {
            if let Err(e) = self.events.deliver(&event) {
                warn!(
                    tx_id = %commit.tx_id,
                    version = commit.version,
                    error = %e,
                    "Change notification not delivered"
                );
            }
        }
    }
}

fn create_dir(path: &Path) -> PopulationResult<()> {
    fs::create_dir_all(path)
        .map_err(|e| PopulationError::io(format!("cannot create {}", path.display()), e))
}

fn lock_dir(path: &Path) -> PopulationResult<File> {
    let lock_path = path.join(LOCK_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(&lock_path)
        .map_err(|e| PopulationError::io(format!("cannot open {}", lock_path.display()), e))?;
    file.try_lock_exclusive().map_err(|e| {
        PopulationError::io(
            format!("database {} is in use by another process", path.display()),
            e,
        )
    })?;
    Ok(file)
}
