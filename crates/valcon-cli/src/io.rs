/// Request reading with size enforcement and UTF-8 validation.
///
/// `valcon-core` never touches the filesystem; all reading happens here.
/// Disk files are size-checked via metadata before any read. Stdin is read
/// through `Read::take` so allocation is bounded.
use std::io::Read as _;
use std::path::Path;

use valcon_core::ConsolidationRequest;

use crate::PathOrStdin;
use crate::error::CliError;

/// Reads the entire contents of `source` into a `String`.
///
/// # Errors
///
/// Returns [`CliError`] (exit code 2) for a missing or unreadable file, an
/// input over `max_size`, or invalid UTF-8.
pub fn read_input(source: &PathOrStdin, max_size: u64) -> Result<String, CliError> {
    match source {
        PathOrStdin::Path(path) => read_file(path, max_size),
        PathOrStdin::Stdin => read_stdin(max_size),
    }
}

/// Reads `source` and deserialises it as a [`ConsolidationRequest`].
///
/// # Errors
///
/// Everything [`read_input`] returns, plus [`CliError::InvalidRequest`].
pub fn read_request(
    source: &PathOrStdin,
    max_size: u64,
) -> Result<ConsolidationRequest, CliError> {
    let text = read_input(source, max_size)?;
    serde_json::from_str(&text).map_err(|e| CliError::InvalidRequest {
        source: source.to_string(),
        detail: e.to_string(),
    })
}

fn read_file(path: &Path, max_size: u64) -> Result<String, CliError> {
    let file_size = std::fs::metadata(path)
        .map_err(|e| io_error_to_cli(&e, path))?
        .len();

    if file_size > max_size {
        return Err(CliError::FileTooLarge {
            source: path.display().to_string(),
            limit: max_size,
            actual: Some(file_size),
        });
    }

    let bytes = std::fs::read(path).map_err(|e| io_error_to_cli(&e, path))?;
    bytes_to_string(&bytes, &path.display().to_string())
}

fn io_error_to_cli(e: &std::io::Error, path: &Path) -> CliError {
    match e.kind() {
        std::io::ErrorKind::NotFound => CliError::FileNotFound {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::PermissionDenied => CliError::PermissionDenied {
            path: path.to_path_buf(),
        },
        std::io::ErrorKind::IsADirectory
        | std::io::ErrorKind::InvalidData
        | std::io::ErrorKind::Interrupted
        | std::io::ErrorKind::UnexpectedEof
        | std::io::ErrorKind::Other
        | _ => CliError::IoError {
            source: path.display().to_string(),
            detail: e.to_string(),
        },
    }
}

/// Reads stdin, capped at `max_size` bytes.
///
/// A stream of exactly `max_size` bytes is probed for one more byte to tell
/// "at the limit" from "over the limit".
fn read_stdin(max_size: u64) -> Result<String, CliError> {
    let stdin = std::io::stdin();
    let mut handle = stdin.lock();

    let mut buf: Vec<u8> = Vec::new();
    (&mut handle)
        .take(max_size)
        .read_to_end(&mut buf)
        .map_err(|e| CliError::StdinReadError {
            detail: e.to_string(),
        })?;

    if buf.len() as u64 == max_size {
        let mut probe = [0u8; 1];
        let extra = handle
            .read(&mut probe)
            .map_err(|e| CliError::StdinReadError {
                detail: e.to_string(),
            })?;
        if extra > 0 {
            return Err(CliError::FileTooLarge {
                source: "-".to_owned(),
                limit: max_size,
                actual: None,
            });
        }
    }

    bytes_to_string(&buf, "-")
}

fn bytes_to_string(bytes: &[u8], source_label: &str) -> Result<String, CliError> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Ok(s.to_owned()),
        Err(e) => Err(CliError::InvalidUtf8 {
            source: source_label.to_owned(),
            byte_offset: e.valid_up_to(),
        }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]
    #![allow(clippy::panic)]
    #![allow(clippy::wildcard_enum_match_arm)]

    use std::io::Write as _;
    use std::path::PathBuf;

    use super::*;

    fn temp_file_with(contents: &[u8]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().expect("create temp file");
        f.write_all(contents).expect("write temp file");
        f
    }

    #[test]
    fn read_file_exactly_at_limit_succeeds() {
        let f = temp_file_with(b"hello");
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let result = read_input(&source, 5).expect("should succeed at limit");
        assert_eq!(result, "hello");
    }

    #[test]
    fn read_file_over_limit_reports_actual_size() {
        let f = temp_file_with(b"hello world");
        let source = PathOrStdin::Path(f.path().to_path_buf());
        match read_input(&source, 4).expect_err("should fail") {
            CliError::FileTooLarge {
                actual: Some(n), ..
            } => assert_eq!(n, 11),
            other => panic!("expected FileTooLarge, got {other:?}"),
        }
    }

    #[test]
    fn read_invalid_utf8_returns_error_with_offset() {
        let mut data = b"{\"a\"".to_vec();
        data.push(0xFF);
        let f = temp_file_with(&data);
        let source = PathOrStdin::Path(f.path().to_path_buf());
        match read_input(&source, 1024).expect_err("should fail on bad UTF-8") {
            CliError::InvalidUtf8 { byte_offset, .. } => assert_eq!(byte_offset, 4),
            other => panic!("expected InvalidUtf8, got {other:?}"),
        }
    }

    #[test]
    fn read_nonexistent_file_returns_file_not_found() {
        let source = PathOrStdin::Path(PathBuf::from("/no/such/file/request.json"));
        let err = read_input(&source, 1024).expect_err("should fail");
        assert!(matches!(err, CliError::FileNotFound { .. }));
    }

    #[test]
    fn read_request_parses_minimal_request() {
        let f = temp_file_with(br#"{"item_path": "fullName"}"#);
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let request = read_request(&source, 1024).expect("valid request");
        assert_eq!(request.item_path.as_str(), "fullName");
        assert!(request.triple.is_empty());
    }

    #[test]
    fn read_request_rejects_malformed_json() {
        let f = temp_file_with(b"{not json");
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let err = read_request(&source, 1024).expect_err("should fail");
        assert!(matches!(err, CliError::InvalidRequest { .. }));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn read_request_rejects_empty_item_path() {
        let f = temp_file_with(br#"{"item_path": ""}"#);
        let source = PathOrStdin::Path(f.path().to_path_buf());
        let err = read_request(&source, 1024).expect_err("should fail");
        assert!(matches!(err, CliError::InvalidRequest { .. }));
    }
}
