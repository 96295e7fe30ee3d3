//! Hand the saved document to an external converter (Calibre's `ebook-convert`).

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Default target format, matching what `ebook-convert` is usually asked for.
pub const DEFAULT_CONVERT_EXTENSION: &str = "fb2";

/// Captured converter output. Both streams are shown to the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Converter failures. The already-written document is left in place either way.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Could not run converter {}: {source}. Check the path to ebook-convert.", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Converter exited with {}:\n{}", exit_status(.code), .output.stderr.trim())]
    Failed {
        code: Option<i32>,
        output: ConversionOutput,
    },
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Run `executable input output` (no shell) and capture both streams.
pub fn invoke(executable: &Path, input: &Path, output: &Path) -> Result<ConversionOutput, ConvertError> {
    tracing::info!(
        converter = %executable.display(),
        input = %input.display(),
        output = %output.display(),
        "converting"
    );
    let result = Command::new(executable)
        .arg(input)
        .arg(output)
        .output()
        .map_err(|e| ConvertError::Spawn {
            program: executable.to_path_buf(),
            source: e,
        })?;
    let captured = ConversionOutput {
        stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
    };
    if result.status.success() {
        Ok(captured)
    } else {
        Err(ConvertError::Failed {
            code: result.status.code(),
            output: captured,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn passes_input_then_output_as_arguments() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("A - T.html");
        let output = dir.path().join("A - T.fb2");
        let out = invoke(Path::new("echo"), &input, &output)?;
        assert_eq!(
            out.stdout.trim(),
            format!("{} {}", input.display(), output.display())
        );
        assert!(out.stderr.is_empty());
        Ok(())
    }

    #[test]
    fn converter_writes_output_file() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("A - T.html");
        let output = dir.path().join("A - T.fb2");
        std::fs::write(&input, "<html></html>")?;
        invoke(Path::new("cp"), &input, &output)?;
        assert_eq!(std::fs::read_to_string(&output)?, "<html></html>");
        Ok(())
    }

    #[test]
    fn nonzero_exit_is_failure_with_stderr() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("missing.html");
        match invoke(Path::new("cp"), &input, &dir.path().join("out.fb2")) {
            Err(ConvertError::Failed { code, output }) => {
                assert!(matches!(code, Some(c) if c != 0));
                assert!(!output.stderr.trim().is_empty());
            }
            other => return Err(format!("expected Failed, got {:?}", other).into()),
        }
        Ok(())
    }

    #[test]
    fn missing_executable_is_spawn_error() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let result = invoke(
            &dir.path().join("no-such-converter"),
            &dir.path().join("in.html"),
            &dir.path().join("out.fb2"),
        );
        assert!(matches!(result, Err(ConvertError::Spawn { .. })));
        Ok(())
    }
}
