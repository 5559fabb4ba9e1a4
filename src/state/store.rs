//! State persistence for the release in progress.
//!
//! The store reads and writes a single JSON file and guards each command's
//! critical section with an advisory lock on a sibling lock file.

use crate::error::{LifecycleError, Result, StateError};
use crate::state::ReleaseState;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// File name of the persisted release state
pub const STATE_FILE_NAME: &str = ".release.json";

/// File name of the command lock when kept in the git directory
pub const LOCK_FILE_NAME: &str = "releasectl.lock";

/// Default time to wait for another command to release the lock
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Reads and writes [`ReleaseState`] at a fixed path
#[derive(Debug, Clone)]
pub struct StateStore {
    /// Path to state file
    state_file_path: PathBuf,
    /// Path to lock file
    lock_file_path: PathBuf,
    /// How long `lock` waits before giving up
    lock_timeout: Duration,
}

/// Exclusive advisory lock held for the duration of one command.
///
/// The lock is released when the guard is dropped.
pub struct StateLock {
    path: PathBuf,
    #[cfg(unix)]
    _flock: nix::fcntl::Flock<fs::File>,
    #[cfg(not(unix))]
    _file: fs::File,
}

impl std::fmt::Debug for StateLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateLock").field("path", &self.path).finish()
    }
}

impl StateLock {
    /// Path of the lock file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(not(unix))]
impl Drop for StateLock {
    fn drop(&mut self) {
        // Without flock the lock file itself is the lock.
        let _ = fs::remove_file(&self.path);
    }
}

impl StateStore {
    /// Create a store for the given state file path
    pub fn new<P: AsRef<Path>>(state_file_path: P) -> Self {
        let state_file_path = state_file_path.as_ref().to_path_buf();
        let lock_file_path = state_file_path.with_extension("lock");

        Self {
            state_file_path,
            lock_file_path,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
        }
    }

    /// Create a store for the well-known state file inside `dir`
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join(STATE_FILE_NAME))
    }

    /// Keep the lock file at `path` instead of next to the state file
    pub fn with_lock_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.lock_file_path = path.as_ref().to_path_buf();
        self
    }

    /// Override how long `lock` waits for a competing command
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// Path to the state file
    pub fn path(&self) -> &Path {
        &self.state_file_path
    }

    /// Check if state file exists
    pub fn exists(&self) -> bool {
        self.state_file_path.exists()
    }

    /// Load the persisted state.
    ///
    /// Fails with [`LifecycleError::NoActiveRelease`] when the file is absent
    /// and with [`StateError::Corrupted`] when it cannot be decoded.
    pub fn load(&self) -> Result<ReleaseState> {
        if !self.exists() {
            return Err(LifecycleError::NoActiveRelease.into());
        }

        let contents =
            fs::read_to_string(&self.state_file_path).map_err(|e| StateError::LoadFailed {
                reason: format!(
                    "Failed to read file {}: {}",
                    self.state_file_path.display(),
                    e
                ),
            })?;

        let state: ReleaseState =
            serde_json::from_str(&contents).map_err(|e| StateError::Corrupted {
                reason: format!(
                    "{} is not a valid release state: {}",
                    self.state_file_path.display(),
                    e
                ),
            })?;

        log::debug!("Loaded state from {}", self.state_file_path.display());
        Ok(state)
    }

    /// Persist `state`, replacing whatever was stored before
    pub fn save(&self, state: &ReleaseState) -> Result<()> {
        let serialized =
            serde_json::to_string_pretty(state).map_err(|e| StateError::SaveFailed {
                reason: format!("Failed to serialize state: {}", e),
            })?;

        // Write to temporary file first (atomic operation)
        let temp_file_path = self.state_file_path.with_extension("tmp");

        {
            let mut file =
                fs::File::create(&temp_file_path).map_err(|e| StateError::SaveFailed {
                    reason: format!("Failed to create temp file: {}", e),
                })?;

            file.write_all(serialized.as_bytes())
                .map_err(|e| StateError::SaveFailed {
                    reason: format!("Failed to write state: {}", e),
                })?;

            file.sync_all().map_err(|e| StateError::SaveFailed {
                reason: format!("Failed to sync file: {}", e),
            })?;
        }

        fs::rename(&temp_file_path, &self.state_file_path).map_err(|e| StateError::SaveFailed {
            reason: format!("Failed to rename temp file: {}", e),
        })?;

        log::debug!("Saved state to {}", self.state_file_path.display());
        Ok(())
    }

    /// Remove the persisted state. Removing an absent file succeeds.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.state_file_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StateError::RemoveFailed {
                path: self.state_file_path.clone(),
                reason: e.to_string(),
            }
            .into()),
        }
    }

    /// Acquire the exclusive command lock, waiting up to the lock timeout
    pub fn lock(&self) -> Result<StateLock> {
        let start_time = Instant::now();

        loop {
            if let Some(lock) = self.try_lock()? {
                return Ok(lock);
            }

            if start_time.elapsed() >= self.lock_timeout {
                return Err(StateError::LockTimeout {
                    path: self.lock_file_path.clone(),
                }
                .into());
            }

            log::debug!("Lock held by another process, waiting...");
            std::thread::sleep(LOCK_POLL_INTERVAL);
        }
    }

    #[cfg(unix)]
    fn try_lock(&self) -> Result<Option<StateLock>> {
        use nix::errno::Errno;
        use nix::fcntl::{Flock, FlockArg};

        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_file_path)
            .map_err(|e| StateError::LockFailed {
                path: self.lock_file_path.clone(),
                reason: e.to_string(),
            })?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(flock) => {
                write_pid(&flock, &self.lock_file_path)?;
                Ok(Some(StateLock {
                    path: self.lock_file_path.clone(),
                    _flock: flock,
                }))
            }
            Err((_, e)) if e == Errno::EWOULDBLOCK => Ok(None),
            Err((_, e)) => Err(StateError::LockFailed {
                path: self.lock_file_path.clone(),
                reason: format!("flock: {}", e),
            }
            .into()),
        }
    }

    #[cfg(not(unix))]
    fn try_lock(&self) -> Result<Option<StateLock>> {
        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.lock_file_path)
        {
            Ok(file) => {
                write_pid(&file, &self.lock_file_path)?;
                Ok(Some(StateLock {
                    path: self.lock_file_path.clone(),
                    _file: file,
                }))
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(StateError::LockFailed {
                path: self.lock_file_path.clone(),
                reason: e.to_string(),
            }
            .into()),
        }
    }
}

fn write_pid(mut file: &fs::File, path: &Path) -> Result<()> {
    file.set_len(0).ok();
    write!(file, "{}", std::process::id()).map_err(|e| StateError::LockFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(())
}
