//! Extraction submission and the processing feed that reports on it.

use crate::app::ExtractLanguage;
use crate::config::UploaderConfig;
use crate::error::{ConfigError, ExtractError};
use log::{info, warn};
use reqwest::multipart::Form;
use reqwest::Client;
use std::fmt;
use std::sync::mpsc::{self as std_mpsc, Receiver, Sender};
use tokio::runtime::Handle;

/// Identifies one extraction job. Updates carrying an older id than the
/// widget's current job are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct JobId(pub u64);

impl JobId {
    pub fn next(self) -> Self {
        JobId(self.0 + 1)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job #{}", self.0)
    }
}

/// Inbound calls from whoever drives the downstream extraction job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessingUpdate {
    Status { progress: u8 },
    DisableExtract,
    EnableExtract,
    Results(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobUpdate {
    pub job: JobId,
    pub update: ProcessingUpdate,
}

/// Cloneable handle for pushing processing updates to the UI thread. Every
/// update is stamped with the job the handle was issued for.
#[derive(Debug, Clone)]
pub struct ProcessingFeed {
    sender: Sender<JobUpdate>,
    job: JobId,
}

impl ProcessingFeed {
    pub fn channel() -> (Self, Receiver<JobUpdate>) {
        let (sender, receiver) = std_mpsc::channel();
        (
            Self {
                sender,
                job: JobId::default(),
            },
            receiver,
        )
    }

    /// A handle on the same channel that reports for `job`.
    pub fn for_job(&self, job: JobId) -> Self {
        Self {
            sender: self.sender.clone(),
            job,
        }
    }

    pub fn job(&self) -> JobId {
        self.job
    }

    pub fn update_processing_status(&self, progress: u8) {
        self.push(ProcessingUpdate::Status { progress });
    }

    pub fn disable_extract_button(&self) {
        self.push(ProcessingUpdate::DisableExtract);
    }

    pub fn enable_extract_button(&self) {
        self.push(ProcessingUpdate::EnableExtract);
    }

    pub fn show_results(&self, body: impl Into<String>) {
        self.push(ProcessingUpdate::Results(body.into()));
    }

    fn push(&self, update: ProcessingUpdate) {
        let _ = self.sender.send(JobUpdate {
            job: self.job,
            update,
        });
    }
}

/// Submits the upload form to the extraction endpoint.
#[derive(Clone)]
pub struct Extractor {
    client: Client,
    url: String,
    runtime: Handle,
}

impl Extractor {
    pub fn new(config: &UploaderConfig, runtime: Handle) -> Result<Self, ConfigError> {
        Ok(Self {
            client: config.http_client()?,
            url: config.extract_url(),
            runtime,
        })
    }

    /// Fires the submission in the background. The feed sees the button
    /// switch to processing, then the response text, then re-enable.
    pub fn submit(
        &self,
        fields: Vec<(String, String)>,
        language: ExtractLanguage,
        feed: ProcessingFeed,
    ) {
        let extractor = self.clone();
        feed.update_processing_status(0);
        self.runtime.spawn(async move {
            match extractor.send(fields, language).await {
                Ok(body) => feed.show_results(body),
                Err(e) => {
                    warn!("Extraction failed: {}", e);
                    feed.show_results(e.to_string());
                }
            }
            feed.enable_extract_button();
        });
    }

    pub async fn send(
        &self,
        fields: Vec<(String, String)>,
        language: ExtractLanguage,
    ) -> Result<String, ExtractError> {
        let has_upload = fields
            .iter()
            .any(|(name, value)| name == "temp_filename" && !value.is_empty());
        if !has_upload {
            return Err(ExtractError::MissingUpload);
        }

        let form = fields
            .into_iter()
            .fold(Form::new(), |form, (name, value)| form.text(name, value))
            .text("language", language.as_str());

        info!("Submitting extraction request to {}", self.url);
        let response = self.client.post(&self.url).multipart(form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ExtractError::Server {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_delivers_in_order() {
        let (feed, receiver) = ProcessingFeed::channel();
        feed.disable_extract_button();
        feed.update_processing_status(40);
        feed.show_results("done");
        feed.enable_extract_button();

        let updates: Vec<_> = receiver.try_iter().map(|u| u.update).collect();
        assert_eq!(
            updates,
            vec![
                ProcessingUpdate::DisableExtract,
                ProcessingUpdate::Status { progress: 40 },
                ProcessingUpdate::Results("done".to_string()),
                ProcessingUpdate::EnableExtract,
            ]
        );
    }

    #[test]
    fn updates_carry_the_issuing_job() {
        let (feed, receiver) = ProcessingFeed::channel();
        let later = feed.for_job(feed.job().next());
        feed.show_results("old");
        later.update_processing_status(5);

        let jobs: Vec<_> = receiver.try_iter().map(|u| u.job).collect();
        assert_eq!(jobs, vec![JobId(0), JobId(1)]);
        assert_eq!(later.job().to_string(), "job #1");
    }

    #[tokio::test]
    async fn refuses_without_uploaded_file() {
        let extractor = Extractor::new(&UploaderConfig::default(), Handle::current()).unwrap();
        let fields = vec![("temp_filename".to_string(), String::new())];

        let err = extractor.send(fields, ExtractLanguage::Cn).await.unwrap_err();
        assert!(matches!(err, ExtractError::MissingUpload));
    }
}
