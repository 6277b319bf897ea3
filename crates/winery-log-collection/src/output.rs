//! Output writers for log targets

use crate::types::LogEntry;
use crate::{LogError, LogResult};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;

/// Trait for writing log entries to various outputs
pub trait OutputWriter: Send + Sync {
    /// Write a log entry
    fn write(&mut self, entry: &LogEntry) -> LogResult<()>;

    /// Flush any buffered output
    fn flush(&mut self) -> LogResult<()>;
}

/// Append-only file output writer. Each entry is flushed as it is written.
pub struct FileOutputWriter {
    writer: BufWriter<File>,
}

impl FileOutputWriter {
    pub fn new(path: impl Into<PathBuf>) -> LogResult<Self> {
        let path = path.into();
        let open_err = |source| LogError::Open {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(open_err)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(open_err)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }
}

impl OutputWriter for FileOutputWriter {
    fn write(&mut self, entry: &LogEntry) -> LogResult<()> {
        writeln!(self.writer, "{}", entry.to_line())?;
        self.writer.flush()?;
        Ok(())
    }

    fn flush(&mut self) -> LogResult<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Bounded in-memory writer keeping the last `capacity` entries.
///
/// Clones share the same buffer, so one clone can be handed to the
/// service log while another is kept for reading.
#[derive(Clone)]
pub struct MemoryOutputWriter {
    buffer: Arc<Mutex<VecDeque<LogEntry>>>,
    capacity: usize,
}

impl MemoryOutputWriter {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.buffer.lock().iter().cloned().collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.buffer.lock().iter().map(|e| e.message.clone()).collect()
    }
}

impl OutputWriter for MemoryOutputWriter {
    fn write(&mut self, entry: &LogEntry) -> LogResult<()> {
        if self.capacity == 0 {
            return Ok(());
        }
        let mut buffer = self.buffer.lock();
        if buffer.len() == self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(entry.clone());
        Ok(())
    }

    fn flush(&mut self) -> LogResult<()> {
        Ok(())
    }
}
