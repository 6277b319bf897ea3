//! Service log implementation

use crate::output::OutputWriter;
use crate::types::{LogEntry, StreamType};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Callback invoked with every line read from a stream, after it was
/// recorded in the service log.
pub type LineCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Counters of the service log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceLogStatus {
    pub stdout_lines: u64,
    pub stderr_lines: u64,
}

/// Line-oriented sink for the supervised service's raw output.
///
/// Cloning is cheap; clones share outputs and counters.
#[derive(Clone, Default)]
pub struct ServiceLog {
    outputs: Arc<RwLock<Vec<Box<dyn OutputWriter>>>>,
    stdout_lines: Arc<AtomicU64>,
    stderr_lines: Arc<AtomicU64>,
}

impl std::fmt::Debug for ServiceLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceLog")
            .field("outputs_count", &self.outputs.read().len())
            .field("status", &self.status())
            .finish()
    }
}

impl ServiceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(self, output: impl OutputWriter + 'static) -> Self {
        self.add_output(output);
        self
    }

    pub fn add_output(&self, output: impl OutputWriter + 'static) {
        self.outputs.write().push(Box::new(output));
    }

    /// Record one line verbatim. Write failures are reported, not returned:
    /// a broken log target must not disturb the supervised process.
    pub fn record(&self, stream: StreamType, line: &str) {
        match stream {
            StreamType::Stdout => self.stdout_lines.fetch_add(1, Ordering::SeqCst),
            StreamType::Stderr => self.stderr_lines.fetch_add(1, Ordering::SeqCst),
        };

        let entry = LogEntry::new(stream, line);
        let mut outputs = self.outputs.write();
        for output in outputs.iter_mut() {
            if let Err(e) = output.write(&entry) {
                warn!(error = %e, "Failed to write service log line");
            }
        }
    }

    pub fn flush(&self) {
        for output in self.outputs.write().iter_mut() {
            if let Err(e) = output.flush() {
                warn!(error = %e, "Failed to flush service log");
            }
        }
    }

    pub fn status(&self) -> ServiceLogStatus {
        ServiceLogStatus {
            stdout_lines: self.stdout_lines.load(Ordering::SeqCst),
            stderr_lines: self.stderr_lines.load(Ordering::SeqCst),
        }
    }

    /// Read `stream` line by line on a background task until it ends.
    ///
    /// Lines are decoded lossily, so output in a foreign encoding does not
    /// end the capture. The returned handle completes once the stream is
    /// exhausted, which lets the caller drain the output of a process that
    /// has already exited.
    pub fn collect_from_stream<R>(
        &self,
        stream: R,
        stream_type: StreamType,
        on_line: Option<LineCallback>,
    ) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let log = self.clone();
        tokio::spawn(async move {
            log.stream_reader(stream, stream_type, on_line).await;
        })
    }

    async fn stream_reader<R>(&self, stream: R, stream_type: StreamType, on_line: Option<LineCallback>)
    where
        R: AsyncRead + Unpin,
    {
        debug!("stream_reader started ({})", stream_type);
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        let mut line_num = 0u64;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => {
                    debug!(stream = %stream_type, "Stream ended");
                    break;
                }
                Ok(_) => {
                    line_num += 1;
                    let line = String::from_utf8_lossy(trim_line_ending(&buf));
                    self.record(stream_type, &line);
                    if let Some(ref callback) = on_line {
                        callback(&line);
                    }
                }
                Err(e) => {
                    error!(stream = %stream_type, error = %e, "Error reading from stream");
                    break;
                }
            }
        }

        debug!(stream = %stream_type, lines = line_num, "Stream reader finished");
    }
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
