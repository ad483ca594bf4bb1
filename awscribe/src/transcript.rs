use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// The part of the service's transcript document this crate reads.
#[derive(Debug, Deserialize)]
pub struct TranscriptDocument {
    pub results: TranscriptResults,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptResults {
    pub transcripts: Vec<TranscriptAlternative>,
}

#[derive(Debug, Deserialize)]
pub struct TranscriptAlternative {
    pub transcript: String,
}

impl TranscriptDocument {
    /// Text of the first alternative.
    pub fn text(&self) -> Option<&str> {
        self.results
            .transcripts
            .first()
            .map(|alt| alt.transcript.as_str())
    }
}

/// Parse a transcript document and return the first alternative's text.
pub fn parse_transcript(json: &str, path: &Path) -> Result<String> {
    let malformed = |reason: String| Error::MalformedResult {
        path: path.to_path_buf(),
        reason,
    };

    let doc: TranscriptDocument =
        serde_json::from_str(json).map_err(|e| malformed(e.to_string()))?;

    doc.text()
        .map(str::to_owned)
        .ok_or_else(|| malformed("no transcript alternatives".into()))
}

/// Read a downloaded transcript file and return the first alternative's text.
pub fn read_transcript(path: &Path) -> Result<String> {
    let json = std::fs::read_to_string(path)?;
    parse_transcript(&json, path)
}
