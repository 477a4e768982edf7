use crate::app::presenter;
use crate::app::{Locale, WidgetModel};
use crate::error::UploadError;
use crate::upload::transport::{TransferRequest, Transport};
use crate::upload::types::{
    percent_of, SelectedFile, SessionEvent, SessionId, TransferEvent, TransferOutcome,
    UploadResponse, UploadSession, UploadState,
};
use derivative::Derivative;
use log::{debug, info, warn};
use std::sync::mpsc::{self as std_mpsc, Receiver, TryRecvError};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Derivative)]
#[derivative(Debug)]
struct ActiveTransfer {
    session: SessionId,
    #[derivative(Debug = "ignore")]
    receiver: Receiver<SessionEvent>,
    cancel: CancellationToken,
}

/// Owns the single upload session and drives it through its states.
pub struct UploadController {
    transport: Arc<dyn Transport>,
    locale: Locale,
    session: UploadSession,
    active: Option<ActiveTransfer>,
    next_id: u64,
}

impl UploadController {
    pub fn new(transport: Arc<dyn Transport>, locale: Locale) -> Self {
        Self {
            transport,
            locale,
            session: UploadSession::default(),
            active: None,
            next_id: 0,
        }
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn is_uploading(&self) -> bool {
        self.session.state == UploadState::Uploading
    }

    /// Begins a fresh session for `file`. A session still in flight is
    /// cancelled and its remaining events are discarded.
    pub fn start_upload(&mut self, file: SelectedFile, model: &mut WidgetModel) -> SessionId {
        self.abandon_in_flight();

        self.next_id += 1;
        let id = SessionId(self.next_id);
        let (sender, receiver) = std_mpsc::channel();
        let cancel = CancellationToken::new();

        info!("Starting upload of {} ({} bytes), session {}", file.name, file.size, id);
        self.session = UploadSession::start(id, file.name.clone());
        self.render(model);

        self.transport.start(TransferRequest {
            session: id,
            file,
            events: sender,
            cancel: cancel.clone(),
        });
        self.active = Some(ActiveTransfer {
            session: id,
            receiver,
            cancel,
        });
        id
    }

    /// Asks the running transfer to stop. The abort is reported through
    /// `poll` like any other terminal outcome.
    pub fn cancel(&mut self) -> bool {
        match &self.active {
            Some(active) => {
                info!("Canceling upload session {}", active.session);
                active.cancel.cancel();
                true
            }
            None => false,
        }
    }

    /// Drops the current session without rendering anything.
    pub fn reset(&mut self) {
        self.abandon_in_flight();
        self.session = UploadSession::default();
    }

    /// Applies every event the transport has produced so far. Returns
    /// whether the model changed.
    pub fn poll(&mut self, model: &mut WidgetModel) -> bool {
        let Some(active) = &self.active else {
            return false;
        };

        let session = active.session;
        let mut pending = Vec::new();
        let mut disconnected = false;
        loop {
            match active.receiver.try_recv() {
                Ok(event) => pending.push(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        let mut changed = false;
        for event in pending {
            changed |= self.handle_event(event, model);
        }

        if disconnected && self.session.id == session && self.is_uploading() {
            warn!("Transfer for session {} ended without a result", session);
            changed |= self.handle_event(
                SessionEvent {
                    session,
                    event: TransferEvent::Finished(TransferOutcome::TransportError(
                        "transfer ended without a result".to_string(),
                    )),
                },
                model,
            );
        }
        changed
    }

    /// Advances the state machine by one transport event.
    pub fn handle_event(&mut self, event: SessionEvent, model: &mut WidgetModel) -> bool {
        if event.session != self.session.id || !self.is_uploading() {
            debug!("Ignoring {:?} for session {}", event.event, event.session);
            return false;
        }

        match event.event {
            TransferEvent::Progress { loaded, total } => {
                let Some(percent) = total.and_then(|total| percent_of(loaded, total)) else {
                    return false;
                };
                let percent = self.session.percent.map_or(percent, |p| p.max(percent));
                if self.session.percent == Some(percent) {
                    return false;
                }
                debug!("Session {} at {}%", self.session.id, percent);
                self.session.percent = Some(percent);
            }
            TransferEvent::Finished(outcome) => {
                self.session.state = self.resolve(outcome, model);
                self.active = None;
                match &self.session.state {
                    UploadState::Succeeded { temp_filename, .. } => {
                        info!("Session {} stored as {}", self.session.id, temp_filename)
                    }
                    state => info!("Session {} ended: {:?}", self.session.id, state),
                }
            }
        }

        self.render(model);
        true
    }

    fn resolve(&self, outcome: TransferOutcome, model: &mut WidgetModel) -> UploadState {
        match outcome {
            TransferOutcome::Success { body, .. } => match UploadResponse::parse(&body) {
                Ok(response) => {
                    model.form.temp_filename = response.temp_filename.clone();
                    model
                        .form
                        .set_hidden_field("original_filename", response.original_filename.clone());
                    UploadState::Succeeded {
                        temp_filename: response.temp_filename,
                        original_filename: response.original_filename,
                    }
                }
                Err(e) => {
                    warn!("Session {}: {}", self.session.id, e);
                    UploadState::Failed(e)
                }
            },
            TransferOutcome::ServerError { status } => UploadState::Failed(UploadError::Server(status)),
            TransferOutcome::TransportError(message) => {
                UploadState::Failed(UploadError::Transport(message))
            }
            TransferOutcome::ReadError(message) => {
                warn!("Session {}: {}", self.session.id, message);
                UploadState::Failed(UploadError::Io(message))
            }
            TransferOutcome::Aborted => UploadState::Aborted,
        }
    }

    fn abandon_in_flight(&mut self) {
        if let Some(active) = self.active.take() {
            debug!("Abandoning upload session {}", active.session);
            active.cancel.cancel();
        }
    }

    fn render(&self, model: &mut WidgetModel) {
        presenter::render_upload(&self.session.state, self.session.percent, self.locale, model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::StatusClass;
    use crate::upload::testing::RecordingTransport;
    use crate::upload::PDF_MIME;

    fn setup() -> (UploadController, Arc<RecordingTransport>, WidgetModel) {
        let transport = Arc::new(RecordingTransport::default());
        let controller = UploadController::new(transport.clone(), Locale::En);
        let model = WidgetModel::new(Locale::En.extract_label());
        (controller, transport, model)
    }

    fn report_pdf() -> SelectedFile {
        SelectedFile::new("report.pdf", PDF_MIME, vec![0u8; 2_097_152])
    }

    #[test]
    fn happy_path_fills_carrier_and_hidden_field() {
        let (mut controller, transport, mut model) = setup();
        controller.start_upload(report_pdf(), &mut model);
        assert_eq!(model.upload_status.text, "Uploading...");
        assert!(!model.extract_button.enabled);

        transport.progress(1_048_576, Some(2_097_152));
        assert!(controller.poll(&mut model));
        assert_eq!(model.upload_status.text, "Uploading: 50%");

        transport.finish(TransferOutcome::Success {
            status: 200,
            body: r#"{"temp_filename":"tmp123","original_filename":"report.pdf"}"#.to_string(),
        });
        assert!(controller.poll(&mut model));

        assert_eq!(model.form.temp_filename, "tmp123");
        assert_eq!(model.form.hidden_field("original_filename"), Some("report.pdf"));
        assert_eq!(model.upload_status.text, "Upload complete");
        assert_eq!(model.upload_status.class, StatusClass::Success);
        assert!(model.extract_button.enabled);
        assert_eq!(controller.session().temp_filename(), Some("tmp123"));
    }

    #[test]
    fn server_error_allows_retry() {
        let (mut controller, transport, mut model) = setup();
        controller.start_upload(report_pdf(), &mut model);
        transport.finish(TransferOutcome::ServerError { status: 500 });
        controller.poll(&mut model);

        assert_eq!(model.upload_status.text, "Upload failed");
        assert_eq!(model.upload_status.class, StatusClass::Error);
        assert!(model.extract_button.enabled);
        assert!(model.form.temp_filename.is_empty());
        assert_eq!(
            controller.session().state,
            UploadState::Failed(UploadError::Server(500))
        );
    }

    #[test]
    fn cancel_reports_aborted_as_neutral() {
        let (mut controller, transport, mut model) = setup();
        controller.start_upload(report_pdf(), &mut model);
        transport.progress(100, Some(1000));

        assert!(controller.cancel());
        assert!(transport.last_cancel().is_cancelled());
        transport.finish(TransferOutcome::Aborted);
        controller.poll(&mut model);

        assert_eq!(model.upload_status.text, "Upload canceled");
        assert_eq!(model.upload_status.class, StatusClass::Neutral);
        assert!(model.extract_button.enabled);
        assert!(!controller.cancel());
    }

    #[test]
    fn percent_never_goes_backwards() {
        let (mut controller, transport, mut model) = setup();
        controller.start_upload(report_pdf(), &mut model);

        transport.progress(600, Some(1000));
        transport.progress(400, Some(1000));
        transport.progress(600, Some(1000));
        controller.poll(&mut model);
        assert_eq!(controller.session().percent, Some(60));
        assert_eq!(model.upload_status.text, "Uploading: 60%");
    }

    #[test]
    fn progress_tracks_rounded_ratio() {
        let (mut controller, transport, mut model) = setup();
        controller.start_upload(report_pdf(), &mut model);

        let total = 3_000u64;
        let mut last = 0u8;
        for loaded in (0..=total).step_by(250) {
            transport.progress(loaded, Some(total));
            controller.poll(&mut model);
            let percent = controller.session().percent.unwrap();
            assert!(percent >= last);
            assert_eq!(
                percent,
                ((loaded as f64 / total as f64) * 100.0).round() as u8
            );
            last = percent;
        }
    }

    #[test]
    fn unknown_total_leaves_percent_alone() {
        let (mut controller, transport, mut model) = setup();
        controller.start_upload(report_pdf(), &mut model);

        transport.progress(500, None);
        transport.progress(500, Some(0));
        assert!(!controller.poll(&mut model));
        assert_eq!(controller.session().percent, None);
        assert_eq!(model.upload_status.text, "Uploading...");
    }

    #[test]
    fn events_after_terminal_state_are_ignored() {
        let (mut controller, transport, mut model) = setup();
        let id = controller.start_upload(report_pdf(), &mut model);
        transport.finish(TransferOutcome::ServerError { status: 503 });
        controller.poll(&mut model);
        let settled = model.clone();

        let late = [
            TransferEvent::Progress {
                loaded: 10,
                total: Some(10),
            },
            TransferEvent::Finished(TransferOutcome::Success {
                status: 200,
                body: r#"{"temp_filename":"x","original_filename":"y"}"#.to_string(),
            }),
        ];
        for event in late {
            assert!(!controller.handle_event(SessionEvent { session: id, event }, &mut model));
        }
        assert_eq!(model, settled);
    }

    #[test]
    fn restart_cancels_previous_and_drops_its_events() {
        let (mut controller, transport, mut model) = setup();
        let first = controller.start_upload(report_pdf(), &mut model);
        let first_cancel = transport.last_cancel();
        let first_sender = transport.last_sender();

        let second = controller.start_upload(report_pdf(), &mut model);
        assert_ne!(first, second);
        assert!(first_cancel.is_cancelled());
        assert!(!transport.last_cancel().is_cancelled());
        assert_eq!(transport.started(), 2);

        let _ = first_sender.send(SessionEvent {
            session: first,
            event: TransferEvent::Finished(TransferOutcome::Aborted),
        });
        assert!(!controller.handle_event(
            SessionEvent {
                session: first,
                event: TransferEvent::Finished(TransferOutcome::Aborted),
            },
            &mut model,
        ));
        assert!(controller.is_uploading());
        assert_eq!(model.upload_status.text, "Uploading...");
    }

    #[test]
    fn repeated_success_keeps_one_original_filename() {
        let (mut controller, transport, mut model) = setup();
        for (tmp, name) in [("tmp1", "a.pdf"), ("tmp2", "b.pdf")] {
            controller.start_upload(SelectedFile::new(name, PDF_MIME, vec![1u8; 8]), &mut model);
            transport.finish(TransferOutcome::Success {
                status: 201,
                body: format!(r#"{{"temp_filename":"{}","original_filename":"{}"}}"#, tmp, name),
            });
            controller.poll(&mut model);
        }

        assert_eq!(model.form.temp_filename, "tmp2");
        assert_eq!(model.form.hidden_fields().len(), 1);
        assert_eq!(model.form.hidden_field("original_filename"), Some("b.pdf"));
    }

    #[test]
    fn malformed_success_body_is_a_failure() {
        let (mut controller, transport, mut model) = setup();
        controller.start_upload(report_pdf(), &mut model);
        transport.finish(TransferOutcome::Success {
            status: 200,
            body: r#"{"original_filename":"report.pdf"}"#.to_string(),
        });
        controller.poll(&mut model);

        assert!(matches!(
            controller.session().state,
            UploadState::Failed(UploadError::ResponseParse(_))
        ));
        assert_eq!(model.upload_status.class, StatusClass::Error);
        assert!(model.form.temp_filename.is_empty());
        assert!(model.form.hidden_fields().is_empty());
    }

    #[test]
    fn transport_error_and_vanished_task() {
        let (mut controller, transport, mut model) = setup();
        controller.start_upload(report_pdf(), &mut model);
        transport.finish(TransferOutcome::TransportError("connection refused".into()));
        controller.poll(&mut model);
        assert_eq!(model.upload_status.text, "Upload error");

        controller.start_upload(report_pdf(), &mut model);
        transport.drop_senders();
        assert!(controller.poll(&mut model));
        assert!(matches!(
            controller.session().state,
            UploadState::Failed(UploadError::Transport(_))
        ));
    }

    #[test]
    fn unreadable_payload_fails_the_session() {
        let (mut controller, transport, mut model) = setup();
        controller.start_upload(report_pdf(), &mut model);
        transport.finish(TransferOutcome::ReadError("permission denied".into()));
        controller.poll(&mut model);

        assert_eq!(
            controller.session().state,
            UploadState::Failed(UploadError::Io("permission denied".into()))
        );
        assert_eq!(model.upload_status.text, "Upload failed");
        assert_eq!(model.upload_status.class, StatusClass::Error);
        assert!(model.extract_button.enabled);
    }

    #[test]
    fn reset_returns_to_idle() {
        let (mut controller, transport, mut model) = setup();
        controller.start_upload(report_pdf(), &mut model);
        controller.reset();

        assert!(transport.last_cancel().is_cancelled());
        assert_eq!(controller.session(), &UploadSession::default());
        assert!(!controller.poll(&mut model));
    }
}
