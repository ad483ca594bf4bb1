//! In-memory stand-ins for the encoder, object store and transcription
//! service, counting how often they are asked to do real work.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::audio::Encoder;
use crate::error::{Error, Result};
use crate::service::{JobStatus, JobSubmission, JobSummary, TranscriptionService};
use crate::storage::ObjectStore;

#[derive(Clone, Copy)]
enum EncoderMode {
    Writes,
    Fails,
    Silent,
}

pub struct CountingEncoder {
    mode: EncoderMode,
    calls: AtomicUsize,
}

impl CountingEncoder {
    /// Writes a placeholder output file.
    pub fn new() -> Self {
        Self::with_mode(EncoderMode::Writes)
    }

    /// Fails like an encoder exiting nonzero.
    pub fn failing() -> Self {
        Self::with_mode(EncoderMode::Fails)
    }

    /// Succeeds without writing anything.
    pub fn silent() -> Self {
        Self::with_mode(EncoderMode::Silent)
    }

    fn with_mode(mode: EncoderMode) -> Self {
        Self {
            mode,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Encoder for CountingEncoder {
    fn encode(&self, _input: &Path, output: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            EncoderMode::Writes => {
                std::fs::write(output, b"converted")?;
                Ok(())
            }
            EncoderMode::Fails => Err(Error::ConversionFailed("exit status: 1".into())),
            EncoderMode::Silent => Ok(()),
        }
    }
}

/// Object store without a direct existence query, so `exists` goes through
/// the listing fallback.
pub struct MemoryStore {
    objects: Mutex<BTreeMap<(String, String), Vec<u8>>>,
    reachable: bool,
    listings: AtomicUsize,
    uploads: AtomicUsize,
    downloads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            reachable: true,
            listings: AtomicUsize::new(0),
            uploads: AtomicUsize::new(0),
            downloads: AtomicUsize::new(0),
        }
    }

    /// Every call fails like a store rejecting our credentials.
    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    pub fn insert(&self, bucket: &str, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data.to_vec());
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    pub fn uploads(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.downloads.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<()> {
        if self.reachable {
            Ok(())
        } else {
            Err(Error::Storage("access denied".into()))
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list_keys(&self, bucket: &str) -> Result<Vec<String>> {
        self.check_reachable()?;
        self.listings.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect())
    }

    async fn upload(&self, bucket: &str, key: &str, file: &Path) -> Result<()> {
        self.check_reachable()?;
        self.uploads.fetch_add(1, Ordering::SeqCst);
        let data = std::fs::read(file)?;
        self.insert(bucket, key, &data);
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<()> {
        self.check_reachable()?;
        let data = self
            .object(bucket, key)
            .ok_or_else(|| Error::Storage(format!("no such key: {key}")))?;
        self.downloads.fetch_add(1, Ordering::SeqCst);
        std::fs::write(dest, data)?;
        Ok(())
    }
}

/// Transcription service that records submissions and starts every job
/// as `IN_PROGRESS`.
pub struct FakeService {
    jobs: Mutex<BTreeMap<String, JobStatus>>,
    submissions: Mutex<Vec<JobSubmission>>,
    reachable: bool,
}

impl FakeService {
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(BTreeMap::new()),
            submissions: Mutex::new(Vec::new()),
            reachable: true,
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reachable: false,
            ..Self::new()
        }
    }

    pub fn insert(&self, name: &str, status: JobStatus) {
        self.jobs.lock().unwrap().insert(name.to_string(), status);
    }

    pub fn submissions(&self) -> Vec<JobSubmission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl TranscriptionService for FakeService {
    async fn find_job(&self, name: &str) -> Result<Option<JobSummary>> {
        if !self.reachable {
            return Err(Error::Service("UnrecognizedClientException".into()));
        }
        Ok(self
            .jobs
            .lock()
            .unwrap()
            .get(name)
            .map(|status| JobSummary {
                name: name.to_string(),
                status: status.clone(),
            }))
    }

    async fn start_job(&self, submission: &JobSubmission) -> Result<JobStatus> {
        if !self.reachable {
            return Err(Error::Service("UnrecognizedClientException".into()));
        }
        self.submissions.lock().unwrap().push(submission.clone());
        self.insert(&submission.job_name, JobStatus::InProgress);
        Ok(JobStatus::InProgress)
    }
}
