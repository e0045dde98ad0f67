//! Persistence hooks
//!
//! A store is hydrated from a [`Loader`] once on `load()` and flushed to a
//! [`Writer`] after every mutation. Both see the engine's full serialized
//! image; neither knows anything about its layout.
//!
//! Plain closures implement both traits:
//!
//! ```no_run
//! use docstore::{Result, StoreConfig};
//!
//! let config = StoreConfig::builder()
//!     .name("notes")
//!     .loader(|| -> Result<Option<Vec<u8>>> { Ok(std::fs::read("notes.db").ok()) })
//!     .writer(|bytes: &[u8]| -> Result<()> { Ok(std::fs::write("notes.db", bytes)?) })
//!     .build()
//!     .unwrap();
//! ```

use std::fs::{self, File};
use std::io::{ErrorKind, Write as _};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;

/// Source of a previously saved engine image
pub trait Loader: Send + Sync {
    /// Return the saved image, or `None` when nothing has been saved yet
    fn load(&self) -> Result<Option<Vec<u8>>>;
}

/// Sink for full engine images
pub trait Writer: Send + Sync {
    /// Persist a full engine image
    fn write(&self, snapshot: &[u8]) -> Result<()>;
}

impl<F> Loader for F
where
    F: Fn() -> Result<Option<Vec<u8>>> + Send + Sync,
{
    fn load(&self) -> Result<Option<Vec<u8>>> {
        self()
    }
}

impl<F> Writer for F
where
    F: Fn(&[u8]) -> Result<()> + Send + Sync,
{
    fn write(&self, snapshot: &[u8]) -> Result<()> {
        self(snapshot)
    }
}

// =============================================================================
// File Sink
// =============================================================================

/// Keeps the engine image in a single file
///
/// Writes go to a sibling temp file which is synced and renamed over the
/// target, so a crash mid-write leaves the previous image intact.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink backed by `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the image file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl Loader for FileSink {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Writer for FileSink {
    fn write(&self, snapshot: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp = self.temp_path();
        {
            let mut file = File::create(&temp)?;
            file.write_all(snapshot)?;
            file.sync_all()?;
        }
        fs::rename(&temp, &self.path)?;

        tracing::trace!("Wrote {} byte image to {}", snapshot.len(), self.path.display());
        Ok(())
    }
}

// =============================================================================
// Memory Sink
// =============================================================================

/// Keeps the last written image in memory
///
/// Clones share the same slot, so one handle can be given to a store while
/// another inspects what was written or seeds a second store.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    snapshot: Arc<Mutex<Option<Vec<u8>>>>,
    writes: Arc<AtomicUsize>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink pre-seeded with an image
    pub fn with_snapshot(snapshot: Vec<u8>) -> Self {
        let sink = Self::default();
        *sink.snapshot.lock() = Some(snapshot);
        sink
    }

    /// The last image written (or seeded)
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.snapshot.lock().clone()
    }

    /// Number of writes received
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl Loader for MemorySink {
    fn load(&self) -> Result<Option<Vec<u8>>> {
        Ok(self.snapshot())
    }
}

impl Writer for MemorySink {
    fn write(&self, snapshot: &[u8]) -> Result<()> {
        *self.snapshot.lock() = Some(snapshot.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
