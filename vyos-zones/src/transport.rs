//! Device access used by the resource module.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

/// Failure talking to a device.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no device snapshot configured")]
    NoSnapshot,
    #[error("failed to read device snapshot {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write commands to {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Fetch running configuration and push command batches.
pub trait Transport {
    /// Return the device's `zone-policy` configuration as `set` lines.
    fn fetch_config(&mut self) -> Result<String, TransportError>;

    /// Run one command batch, in order.
    fn run_commands(&mut self, commands: &[String]) -> Result<(), TransportError>;
}

/// A device stood in for by a configuration dump on disk.
///
/// Commands handed to [`Transport::run_commands`] are recorded and, when an
/// output path is set, written there one per line.
#[derive(Debug, Default)]
pub struct SnapshotTransport {
    snapshot: Option<PathBuf>,
    output: Option<PathBuf>,
    executed: Vec<String>,
}

impl SnapshotTransport {
    pub fn new(snapshot: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        Self {
            snapshot,
            output,
            executed: Vec::new(),
        }
    }

    /// Every command run so far.
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    pub fn snapshot(&self) -> Option<&Path> {
        self.snapshot.as_deref()
    }
}

impl Transport for SnapshotTransport {
    fn fetch_config(&mut self) -> Result<String, TransportError> {
        let path = self.snapshot.as_ref().ok_or(TransportError::NoSnapshot)?;
        debug!(path = %path.display(), "reading device snapshot");
        fs::read_to_string(path).map_err(|source| TransportError::Read {
            path: path.display().to_string(),
            source,
        })
    }

    fn run_commands(&mut self, commands: &[String]) -> Result<(), TransportError> {
        self.executed.extend_from_slice(commands);

        if let Some(path) = &self.output {
            let mut body = self.executed.join("\n");
            body.push('\n');
            fs::write(path, body).map_err(|source| TransportError::Write {
                path: path.display().to_string(),
                source,
            })?;
            info!(path = %path.display(), count = commands.len(), "wrote commands");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{SnapshotTransport, Transport, TransportError};

    #[test]
    fn fetch_without_snapshot_fails() {
        let mut transport = SnapshotTransport::default();
        assert!(matches!(
            transport.fetch_config(),
            Err(TransportError::NoSnapshot)
        ));
    }

    #[test]
    fn reads_snapshot_and_writes_commands() {
        let dir = tempfile::tempdir().expect("tempdir");
        let snapshot = dir.path().join("running.txt");
        let output = dir.path().join("commands.txt");
        fs::write(&snapshot, "set zone-policy zone LAN local-zone\n").expect("write snapshot");

        let mut transport = SnapshotTransport::new(Some(snapshot), Some(output.clone()));
        let text = transport.fetch_config().expect("fetch");
        assert!(text.contains("local-zone"));

        let commands = vec!["delete zone-policy zone LAN local-zone".to_string()];
        transport.run_commands(&commands).expect("run");
        assert_eq!(transport.executed(), commands.as_slice());
        assert_eq!(
            fs::read_to_string(&output).expect("read output"),
            "delete zone-policy zone LAN local-zone\n"
        );
    }

    #[test]
    fn missing_snapshot_is_a_read_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut transport = SnapshotTransport::new(Some(dir.path().join("absent.txt")), None);
        assert!(matches!(
            transport.fetch_config(),
            Err(TransportError::Read { .. })
        ));
    }
}
