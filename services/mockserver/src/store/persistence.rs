//! Snapshot persistence strategies.
//!
//! # Purpose
//! The store serializes its whole state to one JSON document; a
//! [`Persistence`] decides where (if anywhere) those bytes go.
//!
//! # Durability
//! - [`NoopPersistence`]: nothing is written; state ends with the process.
//! - [`FilePersistence`]: the snapshot is written to a sibling temporary file
//!   and renamed over the target, so a failed write never truncates the
//!   previous snapshot.
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub trait Persistence: Send + Sync {
    /// Read the stored snapshot, or `None` if there is none yet.
    fn read(&self) -> io::Result<Option<Vec<u8>>>;
    /// Replace the stored snapshot.
    fn write(&self, snapshot: &[u8]) -> io::Result<()>;
    /// Whether snapshots survive a restart. Non-durable backends are skipped
    /// entirely on save.
    fn is_durable(&self) -> bool;
    /// Backend identifier used in logs and diagnostics.
    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPersistence;

impl Persistence for NoopPersistence {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn write(&self, _snapshot: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl Persistence for FilePersistence {
    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            // First run: no snapshot yet.
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn write(&self, snapshot: &[u8]) -> io::Result<()> {
        let temp = self.temp_path();
        let result = write_private(&temp, snapshot).and_then(|()| fs::rename(&temp, &self.path));
        if result.is_err() {
            let _ = fs::remove_file(&temp);
        }
        result
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}
