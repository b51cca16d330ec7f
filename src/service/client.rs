//! MatchService: fire-and-forget term scans on a background worker
//!
//! The caller submits `(text, terms)` with a continuation and keeps going.
//! Completions are delivered on the caller's thread by `poll`/`wait`; the
//! pending map is owned by the service, so no locking is involved.
//!
//! No back-pressure is applied: callers are expected to coalesce requests
//! (one scan per page, debounce on scroll).

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use super::protocol::{handle_search, RequestId, SearchRequest, SearchResponse};
use super::worker::{spawn_worker, WorkerEvent};
use crate::config::ServiceConfig;
use crate::error::GlossError;
use crate::matcher::TermMatch;

/// Outcome handed to a continuation
pub type ScanOutcome = Result<Vec<TermMatch>, GlossError>;

type Continuation = Box<dyn FnOnce(ScanOutcome)>;

pub struct MatchService {
    request_tx: Option<Sender<SearchRequest>>,
    event_rx: Receiver<WorkerEvent>,
    pending: HashMap<RequestId, Continuation>,
    next_id: RequestId,
    failure: Option<GlossError>,
    worker: Option<JoinHandle<()>>,
}

impl MatchService {
    /// Start a service backed by the standard search handler
    pub fn spawn(config: &ServiceConfig) -> Result<Self, GlossError> {
        Self::spawn_with(config, handle_search)
    }

    /// Start a service with a custom request handler
    pub fn spawn_with<H>(config: &ServiceConfig, handler: H) -> Result<Self, GlossError>
    where
        H: FnMut(SearchRequest) -> SearchResponse + Send + 'static,
    {
        let (request_tx, request_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let worker = spawn_worker(config, request_rx, event_tx, handler)?;
        log::debug!("match service started on thread '{}'", config.thread_name);

        Ok(Self {
            request_tx: Some(request_tx),
            event_rx,
            pending: HashMap::new(),
            next_id: 0,
            failure: None,
            worker: Some(worker),
        })
    }

    /// Queue a scan. `on_done` runs on the caller's thread during a later
    /// `poll`/`wait`, exactly once, with the matches or a worker failure.
    pub fn submit<F>(&mut self, text: impl Into<String>, terms: Vec<String>, on_done: F) -> Result<RequestId, GlossError>
    where
        F: FnOnce(ScanOutcome) + 'static,
    {
        if self.failure.is_some() || self.request_tx.is_none() {
            return Err(GlossError::WorkerUnavailable);
        }

        self.next_id += 1;
        let id = self.next_id;
        let request = SearchRequest {
            id,
            text: text.into(),
            terms,
        };

        self.pending.insert(id, Box::new(on_done));
        let sent = self
            .request_tx
            .as_ref()
            .map(|tx| tx.send(request).is_ok())
            .unwrap_or(false);
        if !sent {
            // Worker is gone; surface whatever it reported, then reject the rest
            self.poll();
            if self.failure.is_none() {
                self.fail_all("worker channel closed".to_string());
            }
        }
        Ok(id)
    }

    /// Deliver every completion already available. Returns how many
    /// continuations ran.
    pub fn poll(&mut self) -> usize {
        let mut delivered = 0;
        loop {
            match self.event_rx.try_recv() {
                Ok(event) => delivered += self.handle_event(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    delivered += self.handle_disconnect();
                    break;
                }
            }
        }
        delivered
    }

    /// Block until no request is pending or `timeout` elapses.
    /// Returns true when everything settled.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while !self.pending.is_empty() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.event_rx.recv_timeout(remaining) {
                Ok(event) => {
                    self.handle_event(event);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    self.handle_disconnect();
                }
            }
        }
        true
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// The failure that stopped the worker, if any
    pub fn failure(&self) -> Option<&GlossError> {
        self.failure.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// Stop accepting work and wait for the worker to drain and exit.
    /// Requests still queued are answered before the thread stops; their
    /// continuations are dropped without running.
    pub fn shutdown(mut self) {
        self.request_tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("scan worker terminated abnormally");
            }
        }
    }

    fn handle_event(&mut self, event: WorkerEvent) -> usize {
        match event {
            WorkerEvent::Completed(response) => match self.pending.remove(&response.id) {
                Some(on_done) => {
                    on_done(Ok(response.matches));
                    1
                }
                None => {
                    log::warn!("discarding result for unknown request #{}", response.id);
                    0
                }
            },
            WorkerEvent::Fatal(message) => self.fail_all(message),
        }
    }

    fn handle_disconnect(&mut self) -> usize {
        if self.failure.is_some() {
            return 0;
        }
        self.fail_all("worker disconnected".to_string())
    }

    /// Reject every pending request with one failure and retire the worker
    fn fail_all(&mut self, message: String) -> usize {
        let error = GlossError::WorkerFailed(message);
        log::error!("{} ({} pending requests rejected)", error, self.pending.len());

        self.request_tx = None;
        self.failure = Some(error.clone());

        let pending: Vec<(RequestId, Continuation)> = self.pending.drain().collect();
        let count = pending.len();
        for (_, on_done) in pending {
            on_done(Err(error.clone()));
        }
        count
    }
}

impl Drop for MatchService {
    fn drop(&mut self) {
        // Closing the request channel lets the worker loop exit on its own
        self.request_tx.take();
    }
}
