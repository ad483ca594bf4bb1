//! Audio file in, Amazon Transcribe job out.
//!
//! **awscribe** runs one idempotent pass over a local audio file: convert it
//! to MP4 (via ffmpeg) if needed, upload it to S3 if the key is absent, then
//! submit a transcription job or report on the existing one, downloading the
//! transcript once the job has completed. Run it again to poll.
//!
//! # Quick start
//!
//! ```rust,no_run
//! # #[tokio::main]
//! # async fn main() -> awscribe::Result<()> {
//! use awscribe::{AwsTranscribeService, Ffmpeg, JobOptions, Pipeline, S3Store};
//!
//! let sdk_config = awscribe::aws::load_sdk_config(None).await;
//! let encoder = Ffmpeg::default();
//! let store = S3Store::new(&sdk_config);
//! let service = AwsTranscribeService::new(&sdk_config);
//!
//! let pipeline = Pipeline::new(&encoder, &store, &service);
//! let outcome = pipeline
//!     .run("clip.wav".as_ref(), "mybucket", &JobOptions::new().print_result(true))
//!     .await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod audio;
pub mod aws;
pub mod config;
pub mod error;
#[cfg(test)]
mod fakes;
pub mod job;
pub mod service;
pub mod storage;
pub mod transcript;

pub use audio::{Encoder, Ffmpeg};
pub use config::{JobOptions, JobPlan, LanguageCode};
pub use error::{Error, Result};
pub use job::JobOutcome;
pub use service::{AwsTranscribeService, JobStatus, TranscriptionService};
pub use storage::{ObjectStore, S3Store, UploadOutcome};

use std::path::Path;

use tracing::info_span;
use tracing::Instrument;

/// The three external collaborators a pass talks to.
pub struct Pipeline<'a> {
    encoder: &'a dyn Encoder,
    store: &'a dyn ObjectStore,
    service: &'a dyn TranscriptionService,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        encoder: &'a dyn Encoder,
        store: &'a dyn ObjectStore,
        service: &'a dyn TranscriptionService,
    ) -> Self {
        Self {
            encoder,
            store,
            service,
        }
    }

    /// Run one check-and-act pass for `audio_file` against `bucket`.
    pub async fn run(
        &self,
        audio_file: &Path,
        bucket: &str,
        options: &JobOptions,
    ) -> Result<JobOutcome> {
        if !audio_file.is_file() {
            return Err(Error::InputNotFound {
                path: audio_file.to_path_buf(),
            });
        }

        let audio = audio::normalize(audio_file, self.encoder)?;
        let plan = options.resolve(&audio, bucket);

        let span = info_span!("job", name = %plan.job_name);
        async {
            storage::ensure_uploaded(self.store, &audio, &plan.bucket, &plan.key).await?;
            job::check_or_start(self.service, self.store, &plan).await
        }
        .instrument(span)
        .await
    }
}
