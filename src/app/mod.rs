mod locale;
pub mod presenter;
mod state;
mod ui;

use crate::config::UploaderConfig;
use crate::error::ConfigError;
use crate::extract::{Extractor, JobId, JobUpdate, ProcessingFeed, ProcessingUpdate};
use crate::upload::{HttpTransport, SelectedFile, Transport, UploadController};
use crate::utils::clipboard::{
    self, ClipboardSink, CopyFeedback, CopyOutcome, ManualCopyBuffer, SystemClipboard,
};
use eframe::{egui, App};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

pub use locale::{ExtractLanguage, Locale};
pub use state::{
    ExtractButton, FormState, ProcessingState, ResultsSection, StatusClass, StatusLine, WidgetModel,
};

pub struct PdfUploader {
    locale: Locale,
    language: ExtractLanguage,
    font_path: Option<PathBuf>,
    model: WidgetModel,
    controller: UploadController,
    processing: ProcessingState,
    feed: ProcessingFeed,
    processing_updates: Receiver<JobUpdate>,
    job: JobId,
    extractor: Option<Extractor>,
    selected_size: Option<u64>,
    clipboard: Box<dyn ClipboardSink>,
    copy_buffer: ManualCopyBuffer,
    copy_feedback: CopyFeedback,
    alert: Option<String>,
    // Keeps transfer tasks alive; dropped last.
    _runtime: Option<Runtime>,
}

impl PdfUploader {
    pub fn new(config: UploaderConfig) -> Result<Self, ConfigError> {
        info!("Initializing PDF uploader against {}", config.base_url);
        let runtime = Runtime::new()?;
        let transport = HttpTransport::new(&config, runtime.handle().clone())?;
        let extractor = Extractor::new(&config, runtime.handle().clone())?;

        let mut app = Self::with_transport(&config, Arc::new(transport), Some(extractor));
        app._runtime = Some(runtime);
        Ok(app)
    }

    /// Builds the widget around any transport; extraction is disabled when
    /// no extractor is given.
    pub fn with_transport(
        config: &UploaderConfig,
        transport: Arc<dyn Transport>,
        extractor: Option<Extractor>,
    ) -> Self {
        let (feed, processing_updates) = ProcessingFeed::channel();
        Self {
            locale: config.locale,
            language: config.language,
            font_path: config.font_path.clone(),
            model: WidgetModel::new(config.locale.extract_label()),
            controller: UploadController::new(transport, config.locale),
            processing: ProcessingState::Idle,
            feed,
            processing_updates,
            job: JobId::default(),
            extractor,
            selected_size: None,
            clipboard: Box::<SystemClipboard>::default(),
            copy_buffer: ManualCopyBuffer::default(),
            copy_feedback: CopyFeedback::default(),
            alert: None,
            _runtime: None,
        }
    }

    /// Replaces the system clipboard as the first copy target.
    pub fn with_clipboard(mut self, clipboard: Box<dyn ClipboardSink>) -> Self {
        self.clipboard = clipboard;
        self
    }

    pub fn model(&self) -> &WidgetModel {
        &self.model
    }

    pub fn controller(&self) -> &UploadController {
        &self.controller
    }

    pub fn processing(&self) -> ProcessingState {
        self.processing
    }

    /// Handle for whoever reports on the current extraction job. Handles
    /// issued before the job changed stop having any effect.
    pub fn processing_feed(&self) -> ProcessingFeed {
        self.feed.for_job(self.job)
    }

    /// Extraction is possible once a file is chosen and no upload for it is
    /// still in flight.
    fn extract_allowed(&self) -> bool {
        !self.model.file_name_display.is_empty()
            && self.controller.session().state.allows_extract()
    }

    fn render_processing(&mut self) {
        let allowed = self.extract_allowed();
        presenter::render_processing(self.processing, allowed, self.locale, &mut self.model);
    }

    /// Reacts to a change of the file picker.
    pub fn on_file_selected(&mut self, selection: Option<SelectedFile>) {
        // A new selection invalidates whatever the previous one uploaded.
        self.controller.reset();
        self.model.form = FormState::default();

        let Some(file) = selection else {
            info!("Selection cleared");
            self.selected_size = None;
            self.model.file_name_display.clear();
            self.model.upload_status.hide();
            self.model.results_section = ResultsSection::default();
            // Whatever job was running reports into a widget that no longer exists.
            self.job = self.job.next();
            self.processing = ProcessingState::Idle;
            self.render_processing();
            return;
        };

        self.model.file_name_display = file.name.clone();
        self.selected_size = Some(file.size);
        self.model.upload_status.hide();
        self.model.extract_button.enabled = self.processing == ProcessingState::Idle;

        if file.is_pdf() {
            self.controller.start_upload(file, &mut self.model);
        } else {
            debug!("{} is {}, not uploading", file.name, file.mime_type);
        }
    }

    pub fn select_path(&mut self, path: &Path) {
        match SelectedFile::from_path(path) {
            Ok(file) => self.on_file_selected(Some(file)),
            Err(e) => {
                warn!("Could not read {}: {}", path.display(), e);
                self.on_file_selected(None);
                self.model
                    .upload_status
                    .show(format!("{}: {}", self.locale.upload_failed(), e), StatusClass::Error);
            }
        }
    }

    pub fn pick_file(&mut self) {
        let picked = rfd::FileDialog::new()
            .add_filter("PDF", &["pdf"])
            .add_filter("All files", &["*"])
            .pick_file();
        match picked {
            Some(path) => self.select_path(&path),
            None => self.on_file_selected(None),
        }
    }

    pub fn cancel_upload(&mut self) -> bool {
        self.controller.cancel()
    }

    pub fn update_processing_status(&mut self, progress: u8) {
        self.processing = ProcessingState::Processing(progress.min(100));
        self.render_processing();
    }

    pub fn disable_extract_button(&mut self) {
        self.model.extract_button.enabled = false;
    }

    pub fn enable_extract_button(&mut self) {
        self.processing = ProcessingState::Idle;
        self.render_processing();
    }

    pub fn show_results(&mut self, body: impl Into<String>) {
        self.model.results_section.active = true;
        self.model.results_section.body = body.into();
    }

    /// Sends the form (carrier field, hidden fields, language) for extraction.
    pub fn submit_extraction(&mut self) -> bool {
        if !self.model.extract_button.enabled {
            return false;
        }
        let Some(extractor) = &self.extractor else {
            warn!("Extraction requested but no extractor is configured");
            return false;
        };

        self.job = self.job.next();
        debug!("Starting extraction {}", self.job);
        extractor.submit(
            self.model.form.submission_fields(),
            self.language,
            self.feed.for_job(self.job),
        );
        self.disable_extract_button();
        true
    }

    /// Copies the upload handle: system clipboard first, then the manual
    /// copy window, then an alert.
    pub fn copy_temp_filename(&mut self) {
        let text = self.model.form.temp_filename.clone();
        match clipboard::copy_with_fallback(&text, self.clipboard.as_mut(), &mut self.copy_buffer) {
            CopyOutcome::Copied => self.copy_feedback.confirm(Instant::now()),
            CopyOutcome::CopiedWithFallback => {}
            CopyOutcome::Failed => self.alert = Some(self.locale.copy_failed().to_string()),
        }
    }

    /// Applies pending transport and processing events. Returns whether the
    /// model changed.
    pub fn update_state(&mut self) -> bool {
        let mut changed = self.controller.poll(&mut self.model);
        while let Ok(JobUpdate { job, update }) = self.processing_updates.try_recv() {
            if job != self.job {
                debug!("Ignoring {:?} from stale {}", update, job);
                continue;
            }
            changed = true;
            match update {
                ProcessingUpdate::Status { progress } => self.update_processing_status(progress),
                ProcessingUpdate::DisableExtract => self.disable_extract_button(),
                ProcessingUpdate::EnableExtract => self.enable_extract_button(),
                ProcessingUpdate::Results(body) => self.show_results(body),
            }
        }
        changed
    }

    fn is_busy(&self) -> bool {
        self.controller.is_uploading() || self.processing != ProcessingState::Idle
    }
}

impl App for PdfUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.update_state() {
            ctx.request_repaint();
        }
        if self.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
        self.render(ctx);
    }
}
