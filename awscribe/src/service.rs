use std::fmt;

use async_trait::async_trait;
use aws_sdk_transcribe::error::DisplayErrorContext;
use aws_sdk_transcribe::types::{LanguageCode as SdkLanguageCode, Media, MediaFormat};
use tracing::debug;

use crate::config::LanguageCode;
use crate::error::{Error, Result};

/// Status of a job as reported by the transcription service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    InProgress,
    Completed,
    Failed { reason: Option<String> },
}

impl JobStatus {
    /// Map the service's status string (e.g. "IN_PROGRESS").
    pub fn from_service(status: &str, failure_reason: Option<&str>) -> Result<Self> {
        match status {
            "QUEUED" => Ok(JobStatus::Queued),
            "IN_PROGRESS" => Ok(JobStatus::InProgress),
            "COMPLETED" => Ok(JobStatus::Completed),
            "FAILED" => Ok(JobStatus::Failed {
                reason: failure_reason.map(str::to_owned),
            }),
            other => Err(Error::Service(format!("unrecognized job status: {other}"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "QUEUED",
            JobStatus::InProgress => "IN_PROGRESS",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed { .. } => "FAILED",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An existing job, as found by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub name: String,
    pub status: JobStatus,
}

/// Everything needed to submit a new job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSubmission {
    pub job_name: String,
    pub language: LanguageCode,
    pub media_uri: String,
    pub output_bucket: String,
}

/// A managed, asynchronous transcription service.
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// The job whose name is exactly `name`, if any.
    async fn find_job(&self, name: &str) -> Result<Option<JobSummary>>;

    /// Submit a new job and return its initial status.
    async fn start_job(&self, submission: &JobSubmission) -> Result<JobStatus>;
}

/// [`TranscriptionService`] backed by Amazon Transcribe batch jobs.
#[derive(Debug, Clone)]
pub struct AwsTranscribeService {
    client: aws_sdk_transcribe::Client,
}

impl AwsTranscribeService {
    pub fn new(config: &aws_config::SdkConfig) -> Self {
        Self {
            client: aws_sdk_transcribe::Client::new(config),
        }
    }

    pub fn from_client(client: aws_sdk_transcribe::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TranscriptionService for AwsTranscribeService {
    /// The service only offers a substring filter, so every page of matches is
    /// narrowed down to the exact name.
    async fn find_job(&self, name: &str) -> Result<Option<JobSummary>> {
        let mut next_token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_transcription_jobs()
                .job_name_contains(name)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| {
                    Error::Service(format!(
                        "failed to list transcription jobs: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            let found = page
                .transcription_job_summaries()
                .iter()
                .find(|summary| summary.transcription_job_name() == Some(name));

            if let Some(summary) = found {
                debug!(?summary, "found transcription job");
                let status = summary
                    .transcription_job_status()
                    .ok_or_else(|| Error::Service(format!("job {name} has no status")))?;
                return Ok(Some(JobSummary {
                    name: name.to_string(),
                    status: JobStatus::from_service(status.as_str(), summary.failure_reason())?,
                }));
            }

            match page.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => return Ok(None),
            }
        }
    }

    async fn start_job(&self, submission: &JobSubmission) -> Result<JobStatus> {
        let output = self
            .client
            .start_transcription_job()
            .transcription_job_name(&submission.job_name)
            .language_code(SdkLanguageCode::from(submission.language.as_str()))
            .media(
                Media::builder()
                    .media_file_uri(&submission.media_uri)
                    .build(),
            )
            .media_format(MediaFormat::Mp4)
            .output_bucket_name(&submission.output_bucket)
            .send()
            .await
            .map_err(|e| {
                Error::Service(format!(
                    "failed to start job {}: {}",
                    submission.job_name,
                    DisplayErrorContext(&e)
                ))
            })?;

        debug!(?output, "start_transcription_job response");

        let job = output.transcription_job().ok_or_else(|| {
            Error::Service(format!("no job returned for {}", submission.job_name))
        })?;
        let status = job.transcription_job_status().ok_or_else(|| {
            Error::Service(format!("job {} has no status", submission.job_name))
        })?;
        JobStatus::from_service(status.as_str(), job.failure_reason())
    }
}
