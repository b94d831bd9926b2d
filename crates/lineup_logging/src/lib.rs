//! Shared logging utilities for Lineup binaries.

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "lineup=info,lineup_core=info";
const VERBOSE_LOG_FILTER: &str = "lineup=debug,lineup_core=debug";

/// Lines kept when the caller does not pick a capacity
pub const DEFAULT_RING_CAPACITY: usize = 1000;

/// Logging configuration shared by Lineup binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    /// Also capture formatted lines into this ring
    pub ring: Option<LogRing>,
}

/// Initialize tracing with stderr output and an optional in-memory ring.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let base_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_filter = if config.verbose && std::env::var_os("RUST_LOG").is_none() {
        EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        base_filter.clone()
    };

    let ring_layer = config.ring.map(|ring| {
        tracing_subscriber::fmt::layer()
            .with_writer(ring)
            .with_ansi(false)
            .with_target(false)
            .with_filter(base_filter)
    });

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .with(ring_layer)
        .try_init()
        .with_context(|| format!("Failed to initialize logging for {}", config.app_name))?;

    Ok(())
}

// ============================================================================
// Log ring
// ============================================================================

/// Bounded buffer of recent log lines
///
/// Cloning shares the buffer. Pushing past capacity drops the oldest line.
#[derive(Clone, Debug)]
pub struct LogRing {
    inner: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new(DEFAULT_RING_CAPACITY)
    }
}

impl LogRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VecDeque::with_capacity(capacity.min(DEFAULT_RING_CAPACITY)))),
            capacity,
        }
    }

    pub fn push(&self, line: impl Into<String>) {
        if self.capacity == 0 {
            return;
        }
        let mut lines = self.lock();
        while lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line.into());
    }

    /// Snapshot, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    /// The newest `n` lines, oldest first
    pub fn tail(&self, n: usize) -> Vec<String> {
        let lines = self.lock();
        let skip = lines.len().saturating_sub(n);
        lines.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    // A panic while holding the lock leaves the deque itself intact.
    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Buffers one formatted event; lines land in the ring on flush or drop
pub struct LogRingWriter {
    ring: LogRing,
    buf: Vec<u8>,
}

impl LogRingWriter {
    fn drain_lines(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let text = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            self.ring.push(line);
        }
    }
}

impl Write for LogRingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.drain_lines();
        Ok(())
    }
}

impl Drop for LogRingWriter {
    fn drop(&mut self) {
        self.drain_lines();
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogRing {
    type Writer = LogRingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogRingWriter {
            ring: self.clone(),
            buf: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn test_push_drops_oldest() {
        let ring = LogRing::new(3);
        for i in 0..5 {
            ring.push(format!("line {}", i));
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.lines(), vec!["line 2", "line 3", "line 4"]);
        assert_eq!(ring.tail(2), vec!["line 3", "line 4"]);
        assert_eq!(ring.tail(10).len(), 3);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let ring = LogRing::new(0);
        ring.push("dropped");
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 0);
    }

    #[test]
    fn test_clones_share_buffer() {
        let ring = LogRing::new(4);
        let other = ring.clone();
        other.push("shared");
        assert_eq!(ring.lines(), vec!["shared"]);
        ring.clear();
        assert!(other.is_empty());
    }

    #[test]
    fn test_writer_splits_lines_on_drop() {
        let ring = LogRing::new(10);
        {
            let mut writer = ring.make_writer();
            writer.write_all(b"first\nsecond\n\n").unwrap();
            assert!(ring.is_empty());
        }
        assert_eq!(ring.lines(), vec!["first", "second"]);
    }

    #[test]
    fn test_ring_captures_tracing_events() {
        let ring = LogRing::new(10);
        let subscriber = tracing_subscriber::fmt()
            .with_writer(ring.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(groups = 2, "grouped files");
        });

        let lines = ring.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("grouped files"));
        assert!(lines[0].contains("groups=2"));
    }
}
