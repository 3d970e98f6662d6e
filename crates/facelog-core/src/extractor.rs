//! Signature extraction contract.
//!
//! Turning an image into facial signature vectors is the job of an
//! external encoder; facelog only defines the boundary. The production
//! adapter shells out to a configured command, which keeps the
//! computer-vision stack (and its model files) out of this process
//! entirely.

use std::path::Path;
use std::process::Command;

use thiserror::Error;

use crate::types::Signature;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("failed to launch encoder `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("encoder exited with {status}: {stderr}")]
    EncoderFailed { status: String, stderr: String },
    #[error("encoder produced malformed output: {0}")]
    MalformedOutput(#[from] serde_json::Error),
}

/// Produces zero or more signatures from an image, one per detected face,
/// in the order the underlying detector reports them. Callers use only
/// the first; an empty result means no face was detected.
pub trait SignatureExtractor: Send + Sync {
    fn extract(&self, image: &Path) -> Result<Vec<Signature>, ExtractorError>;
}

/// Extractor that runs an external encoder command.
///
/// The image path is appended as the final argument. The command must
/// print a JSON array of number arrays on stdout, e.g. `[[0.1, -0.2, ...]]`,
/// and exit zero. An image with no detectable face is `[]`, not a failure.
pub struct CommandExtractor {
    program: String,
    args: Vec<String>,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a configured command line on whitespace into program + args.
    /// Paths with spaces are not supported; configure args separately
    /// if that ever matters.
    pub fn from_command_line(command: &str) -> Self {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next().unwrap_or_default();
        Self {
            program,
            args: parts.collect(),
        }
    }
}

impl SignatureExtractor for CommandExtractor {
    fn extract(&self, image: &Path) -> Result<Vec<Signature>, ExtractorError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(image)
            .output()
            .map_err(|source| ExtractorError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(
                program = %self.program,
                status = %output.status,
                stderr = %stderr,
                "encoder failed"
            );
            return Err(ExtractorError::EncoderFailed {
                status: output.status.to_string(),
                stderr,
            });
        }

        let vectors: Vec<Vec<f64>> = serde_json::from_slice(&output.stdout)?;
        tracing::debug!(image = %image.display(), faces = vectors.len(), "encoder output parsed");
        Ok(vectors.into_iter().map(Signature::new).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    // `sh -c '<script>' <image>` ignores the appended image path (it
    // becomes $0), which lets these tests script the encoder's stdout.
    fn scripted(script: &str) -> CommandExtractor {
        CommandExtractor::new("sh", vec!["-c".into(), script.into()])
    }

    #[test]
    fn parses_signature_vectors() {
        let extractor = scripted("echo '[[0.1, 0.2], [0.3, 0.4]]'");
        let sigs = extractor.extract(&PathBuf::from("ignored.jpg")).unwrap();
        assert_eq!(sigs.len(), 2);
        assert_eq!(sigs[0].values, vec![0.1, 0.2]);
        assert_eq!(sigs[1].values, vec![0.3, 0.4]);
    }

    #[test]
    fn empty_array_means_no_faces() {
        let extractor = scripted("echo '[]'");
        let sigs = extractor.extract(&PathBuf::from("ignored.jpg")).unwrap();
        assert!(sigs.is_empty());
    }

    #[test]
    fn nonzero_exit_is_an_encoder_failure() {
        let extractor = scripted("echo boom >&2; exit 3");
        let err = extractor.extract(&PathBuf::from("ignored.jpg")).unwrap_err();
        match err {
            ExtractorError::EncoderFailed { stderr, .. } => assert_eq!(stderr, "boom"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn garbage_stdout_is_malformed_output() {
        let extractor = scripted("echo 'not json'");
        let err = extractor.extract(&PathBuf::from("ignored.jpg")).unwrap_err();
        assert!(matches!(err, ExtractorError::MalformedOutput(_)));
    }

    #[test]
    fn missing_program_is_a_launch_error() {
        let extractor = CommandExtractor::new("/nonexistent/face-encoder", vec![]);
        let err = extractor.extract(&PathBuf::from("ignored.jpg")).unwrap_err();
        assert!(matches!(err, ExtractorError::Launch { .. }));
    }

    #[test]
    fn command_line_split() {
        let e = CommandExtractor::from_command_line("face-encoder --model small");
        assert_eq!(e.program, "face-encoder");
        assert_eq!(e.args, vec!["--model", "small"]);
    }
}
