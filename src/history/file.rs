use crate::models::chat::{ ChatMessage, Snapshot };
use crate::history::HistoryError;
use chrono::{ SecondsFormat, Utc };
use log::warn;
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };
use tokio::fs;

pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Append-only JSON array of conversation snapshots on disk.
#[derive(Debug, Clone)]
pub struct SnapshotLog {
    path: PathBuf,
}

impl SnapshotLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unparsable files read as an empty log.
    pub async fn load(&self) -> Result<Vec<Snapshot>, HistoryError> {
        let raw = match fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e.into());
            }
        };

        match serde_json::from_slice::<Vec<Snapshot>>(&raw) {
            Ok(snapshots) => Ok(snapshots),
            Err(e) => {
                warn!("Ignoring unreadable snapshot file {}: {}", self.path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    pub async fn append(&self, conversation: &[ChatMessage]) -> Result<usize, HistoryError> {
        let mut snapshots = self.load().await?;
        snapshots.push(Snapshot {
            timestamp: iso_timestamp(),
            conversation: conversation.to_vec(),
        });
        let json = serde_json::to_string_pretty(&snapshots)?;
        fs::write(&self.path, json).await?;
        Ok(snapshots.len())
    }

    /// Raw file contents for download, `None` when nothing has been saved yet.
    pub async fn read_raw(&self) -> Result<Option<Vec<u8>>, HistoryError> {
        match fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
