use crate::error::UploadError;
use bytes::Bytes;
use derivative::Derivative;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const PDF_MIME: &str = "application/pdf";
const OCTET_STREAM_MIME: &str = "application/octet-stream";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Payload {
    Memory(Bytes),
    Disk(PathBuf),
}

/// The file the user picked. Files picked from disk are only read once the
/// transfer task asks for the bytes.
#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub size: u64,
    #[derivative(Debug = "ignore")]
    payload: Payload,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            size: data.len() as u64,
            payload: Payload::Memory(data),
        }
    }

    /// Describes a file on disk, reporting the MIME type a file picker would:
    /// by extension only. Only metadata is touched here.
    pub fn from_path(path: &Path) -> Result<Self, UploadError> {
        let name = path
            .file_name()
            .ok_or_else(|| UploadError::Io(format!("{} has no file name", path.display())))?
            .to_string_lossy()
            .to_string();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(UploadError::Io(format!("{} is not a file", path.display())));
        }

        Ok(Self {
            name,
            mime_type: mime_for_path(path).to_string(),
            size: metadata.len(),
            payload: Payload::Disk(path.to_path_buf()),
        })
    }

    /// The file contents. Disk-backed files are read asynchronously, so call
    /// this from the runtime rather than the UI thread.
    pub async fn load(&self) -> io::Result<Bytes> {
        match &self.payload {
            Payload::Memory(data) => Ok(data.clone()),
            Payload::Disk(path) => Ok(tokio::fs::read(path).await?.into()),
        }
    }

    pub fn is_pdf(&self) -> bool {
        self.mime_type == PDF_MIME
    }
}

fn mime_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => PDF_MIME,
        _ => OCTET_STREAM_MIME,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
    Succeeded {
        temp_filename: String,
        original_filename: String,
    },
    Failed(UploadError),
    Aborted,
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            UploadState::Succeeded { .. } | UploadState::Failed(_) | UploadState::Aborted
        )
    }

    /// Whether this state lets the user trigger extraction.
    pub fn allows_extract(&self) -> bool {
        !matches!(self, UploadState::Uploading)
    }
}

/// One upload attempt, from `start_upload` to a terminal outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadSession {
    pub id: SessionId,
    pub file_name: String,
    pub state: UploadState,
    /// `None` until the first progress event with a known total.
    pub percent: Option<u8>,
}

impl UploadSession {
    pub fn start(id: SessionId, file_name: impl Into<String>) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            state: UploadState::Uploading,
            percent: None,
        }
    }

    pub fn temp_filename(&self) -> Option<&str> {
        match &self.state {
            UploadState::Succeeded { temp_filename, .. } => Some(temp_filename),
            _ => None,
        }
    }

    pub fn original_filename(&self) -> Option<&str> {
        match &self.state {
            UploadState::Succeeded {
                original_filename, ..
            } => Some(original_filename),
            _ => None,
        }
    }
}

/// Notifications produced by a running transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    Progress { loaded: u64, total: Option<u64> },
    Finished(TransferOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Success { status: u16, body: String },
    ServerError { status: u16 },
    TransportError(String),
    /// The selected file could not be read when the transfer started.
    ReadError(String),
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: TransferEvent,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UploadResponse {
    pub temp_filename: String,
    pub original_filename: String,
}

impl UploadResponse {
    pub fn parse(body: &str) -> Result<Self, UploadError> {
        serde_json::from_str(body).map_err(|e| UploadError::ResponseParse(e.to_string()))
    }
}

/// `round(loaded / total * 100)`, clamped to 100.
pub fn percent_of(loaded: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let ratio = (loaded as f64 / total as f64) * 100.0;
    Some(ratio.round().clamp(0.0, 100.0) as u8)
}
