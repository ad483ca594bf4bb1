use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

/// Locale codes accepted by Amazon Transcribe batch jobs.
const SUPPORTED_LANGUAGES: [&str; 31] = [
    "en-US", "es-US", "en-AU", "fr-CA", "en-GB", "de-DE", "pt-BR", "fr-FR", "it-IT", "ko-KR",
    "es-ES", "en-IN", "hi-IN", "ar-SA", "ru-RU", "zh-CN", "nl-NL", "id-ID", "ta-IN", "fa-IR",
    "en-IE", "en-AB", "en-WL", "pt-PT", "te-IN", "tr-TR", "de-CH", "he-IL", "ms-MY", "ja-JP",
    "ar-AE",
];

const DEFAULT_LANGUAGE: &str = "en-US";

/// A validated transcription locale (e.g. "en-US").
///
/// Codes are matched exactly, including case, against the fixed list
/// returned by [`LanguageCode::supported`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageCode(&'static str);

impl LanguageCode {
    pub fn new(code: &str) -> Result<Self, Error> {
        SUPPORTED_LANGUAGES
            .iter()
            .copied()
            .find(|supported| *supported == code)
            .map(LanguageCode)
            .ok_or_else(|| Error::UnsupportedLanguage(code.to_string()))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }

    /// All supported locale codes.
    pub fn supported() -> &'static [&'static str] {
        &SUPPORTED_LANGUAGES
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        LanguageCode(DEFAULT_LANGUAGE)
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LanguageCode::new(s)
    }
}

/// Builder for a single upload-and-transcribe pass.
///
/// Every field left unset is derived from the normalized audio file when the
/// options are resolved into a [`JobPlan`].
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    pub key: Option<String>,
    pub language: LanguageCode,
    pub job_name: Option<String>,
    pub outfile: Option<PathBuf>,
    pub print_result: bool,
}

impl JobOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Object key to upload under. Defaults to the normalized file's name.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn language(mut self, language: LanguageCode) -> Self {
        self.language = language;
        self
    }

    /// Job name. Defaults to the normalized file's stem.
    pub fn job_name(mut self, name: impl Into<String>) -> Self {
        self.job_name = Some(name.into());
        self
    }

    /// Local transcript path. Always ends up with a `.json` suffix.
    pub fn outfile(mut self, path: impl Into<PathBuf>) -> Self {
        self.outfile = Some(path.into());
        self
    }

    pub fn print_result(mut self, enabled: bool) -> Self {
        self.print_result = enabled;
        self
    }

    /// Fill in the defaults for an already normalized audio file.
    pub fn resolve(&self, audio: &Path, bucket: &str) -> JobPlan {
        let key = self.key.clone().unwrap_or_else(|| file_name(audio));
        let job_name = self.job_name.clone().unwrap_or_else(|| file_stem(audio));
        let outfile = match &self.outfile {
            Some(path) => with_json_suffix(path),
            None => audio.with_extension("json"),
        };

        JobPlan {
            bucket: bucket.to_string(),
            key,
            job_name,
            language: self.language,
            outfile,
            print_result: self.print_result,
        }
    }
}

/// Fully resolved parameters for one pass over a single audio file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPlan {
    pub bucket: String,
    pub key: String,
    pub job_name: String,
    pub language: LanguageCode,
    pub outfile: PathBuf,
    pub print_result: bool,
}

impl JobPlan {
    /// `s3://` URI of the uploaded audio.
    pub fn media_uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }

    /// Key the service writes the finished transcript under.
    pub fn transcript_key(&self) -> String {
        format!("{}.json", self.job_name)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn with_json_suffix(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext == "json") {
        path.to_path_buf()
    } else {
        path.with_extension("json")
    }
}
