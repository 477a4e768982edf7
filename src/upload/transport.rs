use crate::config::UploaderConfig;
use crate::error::ConfigError;
use crate::upload::types::{SelectedFile, SessionEvent, SessionId, TransferEvent, TransferOutcome};
use bytes::Bytes;
use futures_util::stream;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use std::sync::mpsc::Sender;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Everything a transport needs to run one session.
#[derive(Debug)]
pub struct TransferRequest {
    pub session: SessionId,
    pub file: SelectedFile,
    pub events: Sender<SessionEvent>,
    pub cancel: CancellationToken,
}

/// Starts a transfer in the background. Implementations must send zero or
/// more `Progress` events followed by exactly one `Finished` event, unless
/// the receiving side has gone away.
pub trait Transport: Send + Sync {
    fn start(&self, request: TransferRequest);
}

/// Multipart POST of the file through `reqwest`, spawned on a tokio runtime.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
    field_name: String,
    chunk_size: usize,
    runtime: Handle,
}

impl HttpTransport {
    pub fn new(config: &UploaderConfig, runtime: Handle) -> Result<Self, ConfigError> {
        Ok(Self {
            client: config.http_client()?,
            url: config.upload_url(),
            field_name: config.field_name.clone(),
            chunk_size: config.chunk_size.max(1),
            runtime,
        })
    }
}

impl Transport for HttpTransport {
    fn start(&self, request: TransferRequest) {
        let transport = self.clone();
        self.runtime.spawn(async move {
            let TransferRequest {
                session,
                file,
                events,
                cancel,
            } = request;

            info!("Uploading {} ({} bytes) as session {}", file.name, file.size, session);
            let outcome = tokio::select! {
                _ = cancel.cancelled() => TransferOutcome::Aborted,
                outcome = transport.send_file(session, file, events.clone()) => outcome,
            };
            debug!("Session {} finished: {:?}", session, outcome);

            if events
                .send(SessionEvent {
                    session,
                    event: TransferEvent::Finished(outcome),
                })
                .is_err()
            {
                debug!("Session {} result dropped, nobody is listening", session);
            }
        });
    }
}

impl HttpTransport {
    async fn send_file(
        &self,
        session: SessionId,
        file: SelectedFile,
        events: Sender<SessionEvent>,
    ) -> TransferOutcome {
        let data = match file.load().await {
            Ok(data) => data,
            Err(e) => {
                warn!("Could not read {}: {}", file.name, e);
                return TransferOutcome::ReadError(e.to_string());
            }
        };
        let total = data.len() as u64;
        let body = progress_body(data, self.chunk_size, move |loaded| {
            let _ = events.send(SessionEvent {
                session,
                event: TransferEvent::Progress {
                    loaded,
                    total: Some(total),
                },
            });
        });

        let part = match Part::stream_with_length(body, total)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
        {
            Ok(part) => part,
            Err(e) => return TransferOutcome::TransportError(e.to_string()),
        };
        let form = Form::new().part(self.field_name.clone(), part);

        let response = match self.client.post(&self.url).multipart(form).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Upload of {} failed to send: {}", file.name, e);
                return TransferOutcome::TransportError(e.to_string());
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!("Upload of {} rejected with status {}", file.name, status);
            return TransferOutcome::ServerError {
                status: status.as_u16(),
            };
        }

        match response.text().await {
            Ok(body) => TransferOutcome::Success {
                status: status.as_u16(),
                body,
            },
            Err(e) => TransferOutcome::TransportError(e.to_string()),
        }
    }
}

/// Wraps the payload in a chunked stream that reports the running byte
/// count each time a chunk is handed to the connection.
fn progress_body<F>(data: Bytes, chunk_size: usize, mut on_progress: F) -> Body
where
    F: FnMut(u64) + Send + Sync + 'static,
{
    let chunks = split_chunks(&data, chunk_size);
    let mut loaded = 0u64;
    let stream = stream::iter(chunks.into_iter().map(move |chunk| {
        loaded += chunk.len() as u64;
        on_progress(loaded);
        Ok::<Bytes, std::io::Error>(chunk)
    }));
    Body::wrap_stream(stream)
}

fn split_chunks(data: &Bytes, chunk_size: usize) -> Vec<Bytes> {
    let chunk_size = chunk_size.max(1);
    (0..data.len())
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(data.len())))
        .collect()
}
