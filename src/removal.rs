//! Background removal adapter.
//!
//! Removal itself is delegated to an external tool; this module only fixes
//! its contract (image bytes in, RGBA image bytes out) and wraps whatever
//! goes wrong into one opaque [`RemovalError`]. [`CachedRemover`] puts the
//! content-addressed [`RemovalCache`] in front of any remover.
//!
//! The shipped [`CommandRemover`] runs a configured command, writes the
//! image to its stdin, and reads the result from its stdout. Any tool that
//! works as a filter fits.

use crate::cache::RemovalCache;
use std::io::{Read, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;
use thiserror::Error;

/// Background removal failed. The cause is kept as text only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Background removal failed: {message}")]
pub struct RemovalError {
    message: String,
}

impl RemovalError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Image bytes in, image bytes with the background made transparent out.
pub trait BackgroundRemover: Sync {
    fn remove_background(&self, bytes: &[u8]) -> Result<Vec<u8>, RemovalError>;
}

/// Runs an external command as a stdin → stdout filter.
#[derive(Debug, Clone)]
pub struct CommandRemover {
    program: String,
    args: Vec<String>,
}

impl CommandRemover {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a command line split on whitespace. Returns `None` for an
    /// empty command.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl BackgroundRemover for CommandRemover {
    fn remove_background(&self, bytes: &[u8]) -> Result<Vec<u8>, RemovalError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RemovalError::new(format!("could not start {}: {e}", self.program)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| RemovalError::new("child stdin unavailable"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| RemovalError::new("child stdout unavailable"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| RemovalError::new("child stderr unavailable"))?;

        // All three pipes are serviced at once; the child may fill any of
        // them before it closes the others.
        let (write_result, output, diagnostics) = std::thread::scope(|s| {
            let writer = s.spawn(move || stdin.write_all(bytes));
            let errors = s.spawn(move || {
                let mut text = Vec::new();
                stderr.read_to_end(&mut text).map(|_| text)
            });
            let mut output = Vec::new();
            let read = stdout.read_to_end(&mut output).map(|_| output);
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            let diagnostics = errors.join().ok().and_then(Result::ok).unwrap_or_default();
            (written, read, diagnostics)
        });

        let status = child
            .wait()
            .map_err(|e| RemovalError::new(format!("{} did not finish: {e}", self.program)))?;
        if !status.success() {
            let stderr = String::from_utf8_lossy(&diagnostics);
            return Err(RemovalError::new(format!(
                "{} exited with {}: {}",
                self.program,
                status,
                stderr.trim()
            )));
        }
        write_result
            .map_err(|e| RemovalError::new(format!("writing to {} failed: {e}", self.program)))?;
        let output = output.map_err(|e| {
            RemovalError::new(format!("reading from {} failed: {e}", self.program))
        })?;
        if output.is_empty() {
            return Err(RemovalError::new(format!("{} produced no output", self.program)));
        }
        Ok(output)
    }
}

/// Wraps a remover with a shared content-addressed cache.
pub struct CachedRemover<R> {
    inner: R,
    cache: Arc<RemovalCache>,
}

impl<R: BackgroundRemover> CachedRemover<R> {
    pub fn new(inner: R, cache: Arc<RemovalCache>) -> Self {
        Self { inner, cache }
    }

    pub fn cache(&self) -> &RemovalCache {
        &self.cache
    }
}

impl<R: BackgroundRemover> BackgroundRemover for CachedRemover<R> {
    fn remove_background(&self, bytes: &[u8]) -> Result<Vec<u8>, RemovalError> {
        let output = self
            .cache
            .get_or_try_insert_with(bytes, || self.inner.remove_background(bytes))?;
        Ok(output.as_ref().clone())
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Remover that returns a fixed payload and counts its calls.
    pub struct CountingRemover {
        pub output: Vec<u8>,
        pub calls: AtomicUsize,
    }

    impl CountingRemover {
        pub fn returning(output: Vec<u8>) -> Self {
            Self {
                output,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl BackgroundRemover for CountingRemover {
        fn remove_background(&self, _bytes: &[u8]) -> Result<Vec<u8>, RemovalError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    impl BackgroundRemover for &CountingRemover {
        fn remove_background(&self, bytes: &[u8]) -> Result<Vec<u8>, RemovalError> {
            (*self).remove_background(bytes)
        }
    }

    /// Remover that always fails.
    pub struct FailingRemover;

    impl BackgroundRemover for FailingRemover {
        fn remove_background(&self, _bytes: &[u8]) -> Result<Vec<u8>, RemovalError> {
            Err(RemovalError::new("model not loaded"))
        }
    }

    // =========================================================================
    // CachedRemover
    // =========================================================================

    #[test]
    fn cached_remover_calls_inner_once_per_content() {
        let inner = CountingRemover::returning(vec![1, 2, 3]);
        let cache = Arc::new(RemovalCache::new());
        let remover = CachedRemover::new(&inner, Arc::clone(&cache));

        assert_eq!(remover.remove_background(b"img").unwrap(), vec![1, 2, 3]);
        assert_eq!(remover.remove_background(b"img").unwrap(), vec![1, 2, 3]);
        assert_eq!(inner.call_count(), 1);

        remover.remove_background(b"other").unwrap();
        assert_eq!(inner.call_count(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn cached_remover_propagates_errors() {
        let remover = CachedRemover::new(FailingRemover, Arc::new(RemovalCache::new()));
        let err = remover.remove_background(b"img").unwrap_err();
        assert!(err.to_string().contains("model not loaded"));
        assert!(remover.cache().is_empty());
    }

    // =========================================================================
    // CommandRemover
    // =========================================================================

    #[test]
    fn from_command_line_splits_arguments() {
        let remover = CommandRemover::from_command_line("remove-bg --model u2net -").unwrap();
        assert_eq!(remover.program, "remove-bg");
        assert_eq!(remover.args, vec!["--model", "u2net", "-"]);
        assert!(CommandRemover::from_command_line("   ").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn command_remover_pipes_through_filter() {
        let remover = CommandRemover::new("cat", vec![]);
        let out = remover.remove_background(b"pixels").unwrap();
        assert_eq!(out, b"pixels");
    }

    #[test]
    fn command_remover_missing_program_is_error() {
        let remover = CommandRemover::new("definitely-not-a-real-remover-binary", vec![]);
        let err = remover.remove_background(b"pixels").unwrap_err();
        assert!(err.to_string().contains("could not start"));
    }

    #[cfg(unix)]
    #[test]
    fn command_remover_nonzero_exit_is_error() {
        let remover = CommandRemover::new("false", vec![]);
        assert!(remover.remove_background(b"pixels").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn command_remover_survives_chatty_stderr() {
        // More than a pipe buffer of stderr before stdout is produced
        let remover = CommandRemover::new(
            "sh",
            vec![
                "-c".to_string(),
                "head -c 200000 /dev/zero >&2; cat".to_string(),
            ],
        );
        let out = remover.remove_background(b"pixels").unwrap();
        assert_eq!(out, b"pixels");
    }

    #[cfg(unix)]
    #[test]
    fn command_remover_reports_stderr_on_failure() {
        let remover = CommandRemover::new(
            "sh",
            vec!["-c".to_string(), "echo no model >&2; exit 3".to_string()],
        );
        let err = remover.remove_background(b"pixels").unwrap_err();
        assert!(err.to_string().contains("no model"));
    }
}
