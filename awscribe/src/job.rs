use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::JobPlan;
use crate::error::Result;
use crate::service::{JobStatus, JobSubmission, TranscriptionService};
use crate::storage::ObjectStore;
use crate::transcript;

/// Result of one check-and-act pass over a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// No job existed; a new one was submitted.
    Submitted { status: JobStatus },
    /// The job exists but has not finished yet.
    Pending { status: JobStatus },
    /// The job finished and its transcript is on disk.
    Completed {
        transcript_path: PathBuf,
        downloaded: bool,
        text: Option<String>,
    },
    /// The service gave up on the job.
    Failed { reason: Option<String> },
}

impl JobOutcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        match self {
            JobOutcome::Failed { .. } => 2,
            _ => 0,
        }
    }
}

/// Submit the job if it does not exist yet, otherwise report on it and
/// fetch the transcript once it is complete.
pub async fn check_or_start(
    service: &dyn TranscriptionService,
    store: &dyn ObjectStore,
    plan: &JobPlan,
) -> Result<JobOutcome> {
    let Some(existing) = service.find_job(&plan.job_name).await? else {
        return submit(service, plan).await;
    };
    debug!(job = %existing.name, status = %existing.status, "job exists");

    match existing.status {
        JobStatus::Completed => {
            info!("Job {} is complete", plan.job_name);
            collect_result(store, plan).await
        }
        JobStatus::Failed { reason } => {
            info!("Status of job {} is FAILED", plan.job_name);
            Ok(JobOutcome::Failed { reason })
        }
        status => {
            info!("Status of job {} is {status}", plan.job_name);
            Ok(JobOutcome::Pending { status })
        }
    }
}

async fn submit(service: &dyn TranscriptionService, plan: &JobPlan) -> Result<JobOutcome> {
    info!("Creating new transcription job called {}", plan.job_name);

    let submission = JobSubmission {
        job_name: plan.job_name.clone(),
        language: plan.language,
        media_uri: plan.media_uri(),
        output_bucket: plan.bucket.clone(),
    };
    debug!(?submission, "submitting job");

    let status = service.start_job(&submission).await?;
    info!("Job {} status is {status}", plan.job_name);
    Ok(JobOutcome::Submitted { status })
}

async fn collect_result(store: &dyn ObjectStore, plan: &JobPlan) -> Result<JobOutcome> {
    let downloaded = if plan.outfile.exists() {
        info!("Results saved at {}", plan.outfile.display());
        false
    } else {
        info!("Downloading result as {}", plan.outfile.display());
        store
            .download(&plan.bucket, &plan.transcript_key(), &plan.outfile)
            .await?;
        true
    };

    let text = if plan.print_result {
        Some(transcript::read_transcript(&plan.outfile)?)
    } else {
        None
    };

    Ok(JobOutcome::Completed {
        transcript_path: plan.outfile.clone(),
        downloaded,
        text,
    })
}
