//! Storage backends for recordings.
//!
//! The capture session writes through a [`WritableSink`] obtained from a
//! [`Storage`]; playback reads whole recordings back as lines.

use crate::{Error, Result};
use log::debug;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// An open output that accepts one line at a time
pub trait WritableSink: Send {
    /// Append one line (the terminator is added by the sink)
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Flush and release the underlying resource
    fn close(self: Box<Self>) -> Result<()>;
}

/// Named, line-oriented storage
pub trait Storage: Send {
    /// Create (or truncate) `name` and return a sink writing to it
    fn open(&self, name: &str) -> Result<Box<dyn WritableSink>>;

    /// Read every line of `name`
    fn read_all_lines(&self, name: &str) -> Result<Vec<String>>;
}

/// Storage rooted at a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create storage resolving names relative to `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Full path for a recording name
    #[must_use]
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for FileStorage {
    fn open(&self, name: &str) -> Result<Box<dyn WritableSink>> {
        let path = self.path_for(name);
        debug!("Opening {} for writing", path.display());
        let file = File::create(&path)?;
        Ok(Box::new(FileSink {
            writer: BufWriter::new(file),
        }))
    }

    fn read_all_lines(&self, name: &str) -> Result<Vec<String>> {
        let path = self.path_for(name);
        debug!("Reading {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        reader.lines().map(|l| l.map_err(Error::from)).collect()
    }
}

struct FileSink {
    writer: BufWriter<File>,
}

impl WritableSink for FileSink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    files: HashMap<String, Vec<String>>,
    open_handles: usize,
}

/// In-memory storage, cloneable so a test can inspect what a session wrote
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    /// Create empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // State stays consistent across a panicking writer
        self.state.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Store `lines` under `name`, replacing any previous content
    pub fn insert(&self, name: &str, lines: Vec<String>) {
        self.lock().files.insert(name.to_string(), lines);
    }

    /// Lines written to `name` so far
    #[must_use]
    pub fn lines(&self, name: &str) -> Option<Vec<String>> {
        self.lock().files.get(name).cloned()
    }

    /// Number of sinks opened and not yet closed or dropped
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.lock().open_handles
    }
}

impl Storage for MemoryStorage {
    fn open(&self, name: &str) -> Result<Box<dyn WritableSink>> {
        {
            let mut state = self.lock();
            state.files.insert(name.to_string(), Vec::new());
            state.open_handles += 1;
        }
        Ok(Box::new(MemorySink {
            storage: self.clone(),
            name: name.to_string(),
            released: false,
        }))
    }

    fn read_all_lines(&self, name: &str) -> Result<Vec<String>> {
        self.lines(name).ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no recording named {name}"),
            ))
        })
    }
}

struct MemorySink {
    storage: MemoryStorage,
    name: String,
    released: bool,
}

impl MemorySink {
    fn release(&mut self) {
        if !self.released {
            self.released = true;
            let mut state = self.storage.lock();
            state.open_handles = state.open_handles.saturating_sub(1);
        }
    }
}

impl WritableSink for MemorySink {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.storage
            .lock()
            .files
            .entry(self.name.clone())
            .or_default()
            .push(line.to_string());
        Ok(())
    }

    fn close(mut self: Box<Self>) -> Result<()> {
        self.release();
        Ok(())
    }
}

impl Drop for MemorySink {
    fn drop(&mut self) {
        self.release();
    }
}
