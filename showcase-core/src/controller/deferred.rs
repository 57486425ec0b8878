//! Deferred, coalescing URL writes
//!
//! Each `schedule` supersedes the previous pending write. Only the last
//! write scheduled within the delay window reaches the sink.

use crate::controller::url::QueryParams;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

/// Destination of URL state, e.g. the browser location or a response header
pub trait UrlSink: Send + Sync {
    fn replace_query(&self, params: &QueryParams);
}

/// Sink that records what it was given
#[derive(Debug, Default)]
pub struct RecordingSink {
    writes: Mutex<Vec<QueryParams>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<QueryParams> {
        self.writes.lock().map(|w| w.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<QueryParams> {
        self.writes.lock().ok().and_then(|w| w.last().cloned())
    }
}

impl UrlSink for RecordingSink {
    fn replace_query(&self, params: &QueryParams) {
        if let Ok(mut writes) = self.writes.lock() {
            writes.push(params.clone());
        }
    }
}

struct Shared {
    sink: Arc<dyn UrlSink>,
    pending: Mutex<Option<QueryParams>>,
    last_written: Mutex<Option<QueryParams>>,
    generation: AtomicU64,
}

impl Shared {
    fn write_pending(&self) {
        let pending = match self.pending.lock() {
            Ok(mut pending) => pending.take(),
            Err(_) => {
                warn!("URL write state poisoned; dropping pending write");
                return;
            }
        };
        let Some(params) = pending else {
            return;
        };

        if let Ok(mut last) = self.last_written.lock() {
            if last.as_ref() == Some(&params) {
                debug!("Skipping URL write identical to the previous one");
                return;
            }
            *last = Some(params.clone());
        }
        self.sink.replace_query(&params);
    }
}

/// Schedules URL writes after a delay, coalescing bursts
#[derive(Clone)]
pub struct DeferredWriter {
    shared: Arc<Shared>,
    delay: Duration,
}

impl DeferredWriter {
    pub fn new(sink: Arc<dyn UrlSink>, delay: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                sink,
                pending: Mutex::new(None),
                last_written: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
            delay,
        }
    }

    /// Queue a write. Outside a tokio runtime the write happens immediately.
    pub fn schedule(&self, params: QueryParams) {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Ok(mut pending) = self.shared.pending.lock() {
            *pending = Some(params);
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let shared = Arc::clone(&self.shared);
                let delay = self.delay;
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    if shared.generation.load(Ordering::SeqCst) == generation {
                        shared.write_pending();
                    }
                });
            }
            Err(_) => self.flush(),
        }
    }

    /// Write any pending params now
    pub fn flush(&self) {
        self.shared.write_pending();
    }

    pub fn has_pending(&self) -> bool {
        self.shared
            .pending
            .lock()
            .map(|p| p.is_some())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(query: &str) -> QueryParams {
        QueryParams::parse(query)
    }

    #[tokio::test]
    async fn test_burst_coalesces_to_last_write() {
        let sink = Arc::new(RecordingSink::new());
        let writer = DeferredWriter::new(sink.clone(), Duration::from_millis(20));

        writer.schedule(params("filter=a"));
        writer.schedule(params("filter=a,b"));
        writer.schedule(params("filter=b"));
        assert!(sink.writes().is_empty());

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(sink.writes(), vec![params("filter=b")]);
        assert!(!writer.has_pending());
    }

    #[tokio::test]
    async fn test_identical_writes_are_skipped() {
        let sink = Arc::new(RecordingSink::new());
        let writer = DeferredWriter::new(sink.clone(), Duration::from_millis(5));

        writer.schedule(params("sort=name"));
        tokio::time::sleep(Duration::from_millis(40)).await;
        writer.schedule(params("sort=name"));
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(sink.writes().len(), 1);
    }

    #[test]
    fn test_without_runtime_writes_immediately() {
        let sink = Arc::new(RecordingSink::new());
        let writer = DeferredWriter::new(sink.clone(), Duration::from_millis(50));

        writer.schedule(params("filter=a"));

        assert_eq!(sink.last(), Some(params("filter=a")));
    }

    #[tokio::test]
    async fn test_flush_writes_pending() {
        let sink = Arc::new(RecordingSink::new());
        let writer = DeferredWriter::new(sink.clone(), Duration::from_secs(60));

        writer.schedule(params("filter=a"));
        writer.flush();

        assert_eq!(sink.last(), Some(params("filter=a")));
    }
}
