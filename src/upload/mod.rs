mod controller;
#[cfg(test)]
pub(crate) mod testing;
mod transport;
mod types;

pub use controller::UploadController;
pub use transport::{HttpTransport, TransferRequest, Transport};
pub use types::{
    percent_of, SelectedFile, SessionEvent, SessionId, TransferEvent, TransferOutcome,
    UploadResponse, UploadSession, UploadState, PDF_MIME,
};
