use crate::upload::transport::{TransferRequest, Transport};
use crate::upload::types::{SessionEvent, SessionId, TransferEvent, TransferOutcome};
use std::sync::mpsc::Sender;
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Transport that only remembers what it was asked to do; tests push the
/// events a real transfer would produce.
#[derive(Default)]
pub struct RecordingTransport {
    requests: Mutex<Vec<TransferRequest>>,
    started: Mutex<usize>,
}

impl Transport for RecordingTransport {
    fn start(&self, request: TransferRequest) {
        *self.started.lock().unwrap() += 1;
        self.requests.lock().unwrap().push(request);
    }
}

impl RecordingTransport {
    pub fn started(&self) -> usize {
        *self.started.lock().unwrap()
    }

    pub fn last_file_name(&self) -> Option<String> {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.file.name.clone())
    }

    pub fn last_cancel(&self) -> CancellationToken {
        self.last(|r| r.cancel.clone())
    }

    pub fn last_sender(&self) -> Sender<SessionEvent> {
        self.last(|r| r.events.clone())
    }

    pub fn progress(&self, loaded: u64, total: Option<u64>) {
        self.send(TransferEvent::Progress { loaded, total });
    }

    pub fn finish(&self, outcome: TransferOutcome) {
        self.send(TransferEvent::Finished(outcome));
    }

    pub fn drop_senders(&self) {
        self.requests.lock().unwrap().clear();
    }

    fn send(&self, event: TransferEvent) {
        let (session, sender): (SessionId, Sender<SessionEvent>) =
            self.last(|r| (r.session, r.events.clone()));
        sender.send(SessionEvent { session, event }).unwrap();
    }

    fn last<T>(&self, f: impl FnOnce(&TransferRequest) -> T) -> T {
        let requests = self.requests.lock().unwrap();
        f(requests.last().expect("no transfer started"))
    }
}
