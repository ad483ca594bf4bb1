use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::{Error, Result};

/// Container suffix the transcription jobs are submitted with.
pub const TARGET_EXTENSION: &str = "mp4";

/// Longest stretch of encoder stderr carried in an error.
const MAX_STDERR_CHARS: usize = 1000;

/// Converts one audio file into another container format.
pub trait Encoder: Send + Sync {
    fn encode(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Encoder backed by an `ffmpeg` subprocess.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl Encoder for Ffmpeg {
    /// Arguments go straight to the process (no shell). `-n` makes ffmpeg
    /// refuse to overwrite an existing output.
    fn encode(&self, input: &Path, output: &Path) -> Result<()> {
        debug!(
            program = %self.program.display(),
            input = %input.display(),
            output = %output.display(),
            "running encoder"
        );

        let result = Command::new(&self.program)
            .args(["-nostdin", "-hide_banner", "-n", "-i"])
            .arg(input)
            .arg(output)
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::ConversionFailed(format!(
                        "{} not found, install with: apt install ffmpeg",
                        self.program.display()
                    ))
                } else {
                    Error::ConversionFailed(format!(
                        "failed to run {}: {e}",
                        self.program.display()
                    ))
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let stderr_truncated: String = stderr.chars().take(MAX_STDERR_CHARS).collect();
            return Err(Error::ConversionFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                result.status,
                stderr_truncated.trim()
            )));
        }

        Ok(())
    }
}

/// Whether the file already carries the target container suffix.
pub fn has_target_format(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(TARGET_EXTENSION))
}

/// Return a path to `path` in the target container format.
///
/// Files already in the target format come back unchanged. Otherwise the
/// sibling with the target suffix is returned, running the encoder only when
/// that sibling does not exist yet.
pub fn normalize(path: &Path, encoder: &dyn Encoder) -> Result<PathBuf> {
    if has_target_format(path) {
        debug!(path = %path.display(), "audio already in target format");
        return Ok(path.to_path_buf());
    }

    let output = path.with_extension(TARGET_EXTENSION);
    if output.exists() {
        info!(
            "No need to convert audio file format. {} already exists.",
            output.display()
        );
        return Ok(output);
    }

    info!("Converting to {}", output.display());
    encoder.encode(path, &output)?;

    if !output.exists() {
        return Err(Error::ConversionFailed(format!(
            "encoder reported success but {} was not created",
            output.display()
        )));
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::fakes::CountingEncoder;

    #[test]
    fn test_has_target_format() {
        assert!(has_target_format(Path::new("clip.mp4")));
        assert!(has_target_format(Path::new("/a/b/clip.MP4")));
        assert!(!has_target_format(Path::new("clip.wav")));
        assert!(!has_target_format(Path::new("clip")));
        assert!(!has_target_format(Path::new("clip.mp4.wav")));
    }

    #[test]
    fn test_normalize_target_format_is_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.mp4");
        fs::write(&input, b"audio").unwrap();

        let encoder = CountingEncoder::new();
        let output = normalize(&input, &encoder).unwrap();

        assert_eq!(output, input);
        assert_eq!(encoder.calls(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_normalize_converts_to_sibling() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        fs::write(&input, b"audio").unwrap();

        let encoder = CountingEncoder::new();
        let output = normalize(&input, &encoder).unwrap();

        assert_eq!(output, dir.path().join("clip.mp4"));
        assert!(output.exists());
        assert!(input.exists(), "original must be left in place");
        assert_eq!(encoder.calls(), 1);
    }

    #[test]
    fn test_normalize_twice_encodes_once() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        fs::write(&input, b"audio").unwrap();

        let encoder = CountingEncoder::new();
        let first = normalize(&input, &encoder).unwrap();
        let second = normalize(&input, &encoder).unwrap();

        assert_eq!(first, second);
        assert_eq!(encoder.calls(), 1);
    }

    #[test]
    fn test_normalize_skips_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        fs::write(&input, b"audio").unwrap();
        fs::write(dir.path().join("clip.mp4"), b"converted earlier").unwrap();

        let encoder = CountingEncoder::new();
        let output = normalize(&input, &encoder).unwrap();

        assert_eq!(output, dir.path().join("clip.mp4"));
        assert_eq!(encoder.calls(), 0);
    }

    #[test]
    fn test_normalize_propagates_encoder_failure() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        fs::write(&input, b"audio").unwrap();

        let encoder = CountingEncoder::failing();
        let err = normalize(&input, &encoder).unwrap_err();

        assert!(matches!(err, Error::ConversionFailed(_)));
        assert!(!dir.path().join("clip.mp4").exists());
    }

    #[test]
    fn test_normalize_rejects_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        fs::write(&input, b"audio").unwrap();

        let encoder = CountingEncoder::silent();
        let err = normalize(&input, &encoder).unwrap_err();

        assert!(matches!(err, Error::ConversionFailed(ref msg) if msg.contains("not created")));
    }

    #[test]
    fn test_ffmpeg_missing_binary() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        fs::write(&input, b"audio").unwrap();

        let encoder = Ffmpeg::new("/nonexistent/bin/ffmpeg-awscribe-test");
        let err = encoder
            .encode(&input, &dir.path().join("clip.mp4"))
            .unwrap_err();

        assert!(matches!(err, Error::ConversionFailed(ref msg) if msg.contains("not found")));
    }

    #[cfg(unix)]
    #[test]
    fn test_ffmpeg_nonzero_exit() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("clip.wav");
        fs::write(&input, b"audio").unwrap();

        // `false` ignores its arguments and exits 1.
        let encoder = Ffmpeg::new("false");
        let err = encoder
            .encode(&input, &dir.path().join("clip.mp4"))
            .unwrap_err();

        assert!(matches!(err, Error::ConversionFailed(ref msg) if msg.contains("exited with")));
    }
}
