pub mod error;
pub mod models;
pub mod queries;

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use chirpy_crypto::Credentials;
use tracing::{info, warn};

pub use error::{Result, StoreError};
pub use models::{Snapshot, SortOrder};

/// File-backed record store for chirps and users.
///
/// All state lives in memory behind one reader/writer lock and is mirrored to
/// a single JSON snapshot. Readers share the lock. A writer holds it across
/// the mutation and the snapshot write, so two writers can never interleave
/// their files.
pub struct Store {
    path: PathBuf,
    state: RwLock<Snapshot>,
    credentials: Credentials,
}

impl Store {
    /// Open the snapshot at `path` with the default password cost.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, Credentials::default())
    }

    /// Open the snapshot at `path`. A missing file starts an empty store with
    /// the counter at 1; a present but unreadable or inconsistent file is an
    /// error.
    pub fn open_with(path: &Path, credentials: Credentials) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let snapshot = load_snapshot(path)?;

        info!(
            "Store opened at {} ({} chirps, {} users, next id {})",
            path.display(),
            snapshot.chirps.len(),
            snapshot.users.len(),
            snapshot.next_id
        );
        Ok(Self {
            path: path.to_path_buf(),
            state: RwLock::new(snapshot),
            credentials,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Run `f` under the shared section.
    pub fn with_state<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Snapshot) -> Result<T>,
    {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        f(&state)
    }

    /// Run `f` against a copy of the state under the exclusive section, write
    /// the copy to disk, then publish it. If `f` or the write fails, the live
    /// state is left untouched.
    pub fn with_state_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Snapshot) -> Result<T>,
    {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = state.clone();
        let result = f(&mut next)?;
        write_snapshot(&self.path, &next)?;
        *state = next;
        Ok(result)
    }

    /// Delete the backing file and clear both maps. The id counter keeps
    /// counting so ids handed out before the reset are never reused.
    pub fn reset(&self) -> Result<()> {
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Store file {} already gone", self.path.display());
            }
            Err(e) => return Err(e.into()),
        }
        state.chirps.clear();
        state.users.clear();

        info!("Store reset, removed {}", self.path.display());
        Ok(())
    }
}

fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Snapshot::default()),
        Err(e) => return Err(e.into()),
    };

    let snapshot: Snapshot = serde_json::from_slice(&raw).map_err(StoreError::Decode)?;
    snapshot.check_invariants().map_err(StoreError::Corrupt)?;
    Ok(snapshot)
}

/// Write to `<path>.tmp`, flush it to disk, then rename over `path`. A crash
/// or power loss mid-write leaves the previous snapshot in place.
fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    let payload = serde_json::to_vec(snapshot).map_err(StoreError::Encode)?;

    let mut tmp = OsString::from(path.as_os_str());
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = File::create(&tmp)?;
    file.write_all(&payload)?;
    file.sync_all()?;
    drop(file);

    fs::rename(&tmp, path)?;
    Ok(())
}
