//! Scan Worker Thread
//!
//! Hosts automaton construction and scanning off the caller's thread.
//! Receives requests via channel, processes them in submission order, and
//! sends results back. A panic inside the handler is reported once as a
//! fatal event and ends the worker.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use super::protocol::{SearchRequest, SearchResponse};
use crate::config::ServiceConfig;
use crate::error::GlossError;

/// Events flowing from the worker back to the caller
#[derive(Debug)]
pub enum WorkerEvent {
    Completed(SearchResponse),
    /// The worker hit an unrecoverable failure and has stopped
    Fatal(String),
}

/// Spawn the scan worker thread
///
/// # Arguments
/// * `config` - Service configuration (thread name)
/// * `request_rx` - Channel to receive requests from the caller
/// * `event_tx` - Channel to send results and failures to the caller
/// * `handler` - Request handler, normally [`super::protocol::handle_search`]
pub fn spawn_worker<H>(
    config: &ServiceConfig,
    request_rx: Receiver<SearchRequest>,
    event_tx: Sender<WorkerEvent>,
    handler: H,
) -> Result<JoinHandle<()>, GlossError>
where
    H: FnMut(SearchRequest) -> SearchResponse + Send + 'static,
{
    thread::Builder::new()
        .name(config.thread_name.clone())
        .spawn(move || worker_loop(request_rx, event_tx, handler))
        .map_err(|e| GlossError::WorkerFailed(format!("failed to spawn worker: {}", e)))
}

/// Main worker loop - processes requests until the channel is closed
fn worker_loop<H>(request_rx: Receiver<SearchRequest>, event_tx: Sender<WorkerEvent>, mut handler: H)
where
    H: FnMut(SearchRequest) -> SearchResponse,
{
    while let Ok(request) = request_rx.recv() {
        let id = request.id;
        match panic::catch_unwind(AssertUnwindSafe(|| handler(request))) {
            Ok(response) => {
                if event_tx.send(WorkerEvent::Completed(response)).is_err() {
                    // Caller dropped the service
                    break;
                }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                log::error!("scan worker failed on request #{}: {}", id, message);
                let _ = event_tx.send(WorkerEvent::Fatal(message));
                return;
            }
        }
    }

    log::debug!("scan worker shutting down");
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "worker panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::protocol::handle_search;
    use std::sync::mpsc;
    use std::time::Duration;

    fn request(id: u64, text: &str, terms: &[&str]) -> SearchRequest {
        SearchRequest {
            id,
            text: text.to_string(),
            terms: terms.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_processes_in_submission_order() {
        let (req_tx, req_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        let handle = spawn_worker(&ServiceConfig::default(), req_rx, evt_tx, handle_search).unwrap();

        req_tx.send(request(1, "x", &["x"])).unwrap();
        req_tx.send(request(2, "y", &["y"])).unwrap();
        drop(req_tx);

        let ids: Vec<u64> = evt_rx
            .iter()
            .map(|e| match e {
                WorkerEvent::Completed(r) => r.id,
                WorkerEvent::Fatal(m) => panic!("unexpected failure: {}", m),
            })
            .collect();
        assert_eq!(ids, vec![1, 2]);
        handle.join().unwrap();
    }

    #[test]
    fn test_panic_reported_as_fatal() {
        let (req_tx, req_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        let handle = spawn_worker(&ServiceConfig::default(), req_rx, evt_tx, |_req: SearchRequest| -> SearchResponse {
            panic!("boom")
        })
        .unwrap();

        req_tx.send(request(1, "x", &["x"])).unwrap();
        match evt_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WorkerEvent::Fatal(message) => assert_eq!(message, "boom"),
            other => panic!("expected fatal, got {:?}", other),
        }
        // Worker has exited; the thread joins cleanly
        handle.join().unwrap();
    }

    #[test]
    fn test_thread_is_named() {
        let (req_tx, req_rx) = mpsc::channel();
        let (evt_tx, evt_rx) = mpsc::channel();
        let config = ServiceConfig { thread_name: "scan-test".to_string() };
        spawn_worker(&config, req_rx, evt_tx, |req: SearchRequest| SearchResponse {
            id: req.id,
            matches: vec![crate::matcher::TermMatch::new(
                thread::current().name().unwrap_or_default(),
                0,
                1,
            )],
        })
        .unwrap();

        req_tx.send(request(9, "", &[])).unwrap();
        match evt_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
            WorkerEvent::Completed(r) => assert_eq!(r.matches[0].term, "scan-test"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
