//! Pure mapping from upload and processing state onto the widget model.
//! Both functions overwrite every field they own, so calling them twice with
//! the same input leaves the model unchanged.

use super::locale::Locale;
use super::state::{ProcessingState, StatusClass, WidgetModel};
use crate::error::UploadError;
use crate::upload::UploadState;

pub fn render_upload(state: &UploadState, percent: Option<u8>, locale: Locale, model: &mut WidgetModel) {
    let status = &mut model.upload_status;
    match state {
        UploadState::Idle => {
            status.hide();
            return;
        }
        UploadState::Uploading => match percent {
            Some(percent) => status.show(locale.uploading(percent), StatusClass::Uploading),
            None => status.show(locale.uploading_started(), StatusClass::Uploading),
        },
        UploadState::Succeeded { .. } => status.show(locale.upload_complete(), StatusClass::Success),
        UploadState::Failed(UploadError::Transport(_)) => {
            status.show(locale.upload_error(), StatusClass::Error)
        }
        UploadState::Aborted => {
            status.show(locale.upload_canceled(), StatusClass::Neutral)
        }
        UploadState::Failed(_) => status.show(locale.upload_failed(), StatusClass::Error),
    }

    model.extract_button.enabled =
        state.allows_extract() && model.extract_button.processing.is_none();
}

/// `extract_allowed` is whether the upload side would let an extraction start
/// (a file is selected and no upload is in flight). Finishing a job only
/// re-enables the button when that still holds.
pub fn render_processing(
    state: ProcessingState,
    extract_allowed: bool,
    locale: Locale,
    model: &mut WidgetModel,
) {
    let button = &mut model.extract_button;
    match state {
        ProcessingState::Processing(percent) => {
            let percent = percent.min(100);
            button.enabled = false;
            button.processing = Some(percent);
            button.label = format!("{}%", percent);
            model.results_section.active = true;
        }
        ProcessingState::Idle => {
            button.enabled = extract_allowed;
            button.processing = None;
            button.label = locale.extract_label().to_string();
        }
    }
}
