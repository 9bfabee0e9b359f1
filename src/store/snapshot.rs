//! Snapshot history
//!
//! A snapshot is an immutable marker of the store's state at ingestion time.
//! The manager keeps an append-only history in `snapshots.json` under the
//! data directory; the latest id feeds the query context so cached results
//! never leak across ingestions.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// One recorded snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot tag chosen by the ingester
    pub id: String,
    /// Creation time, RFC 3339
    pub timestamp: String,
    /// Event-schema contract version at creation time
    pub schema_version: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct SnapshotHistory {
    snapshots: Vec<Snapshot>,
}

/// Append-only snapshot history persisted as JSON.
#[derive(Debug)]
pub struct SnapshotManager {
    meta_path: PathBuf,
    history: SnapshotHistory,
}

impl SnapshotManager {
    /// Loads existing history from `data_dir/snapshots.json`, or starts
    /// empty when the file is absent or unreadable.
    pub fn open(data_dir: &Path) -> Self {
        let meta_path = data_dir.join("snapshots.json");
        let history = File::open(&meta_path)
            .ok()
            .and_then(|f| serde_json::from_reader(f).ok())
            .unwrap_or_default();
        Self { meta_path, history }
    }

    /// Records a new immutable snapshot and persists the history.
    pub fn create_snapshot(
        &mut self,
        tag: &str,
        schema_version: &str,
        description: &str,
    ) -> std::io::Result<Snapshot> {
        let snapshot = Snapshot {
            id: tag.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            schema_version: schema_version.to_string(),
            description: description.to_string(),
        };
        self.history.snapshots.push(snapshot.clone());
        self.save()?;
        Ok(snapshot)
    }

    fn save(&self) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(&self.history)?;
        let mut file = File::create(&self.meta_path)?;
        file.write_all(json.as_bytes())
    }

    /// The most recent snapshot id, or "initial" for an empty history.
    pub fn latest(&self) -> String {
        self.history
            .snapshots
            .last()
            .map(|s| s.id.clone())
            .unwrap_or_else(|| "initial".to_string())
    }

    /// All recorded snapshots, oldest first.
    pub fn snapshots(&self) -> &[Snapshot] {
        &self.history.snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_history_latest_is_initial() {
        let tmp = TempDir::new().unwrap();
        let manager = SnapshotManager::open(tmp.path());
        assert_eq!(manager.latest(), "initial");
    }

    #[test]
    fn test_history_survives_reopen() {
        let tmp = TempDir::new().unwrap();
        {
            let mut manager = SnapshotManager::open(tmp.path());
            manager
                .create_snapshot("ipl-2023", "1.0.0", "season load")
                .unwrap();
            manager.create_snapshot("ipl-2024", "1.0.0", "").unwrap();
        }
        let manager = SnapshotManager::open(tmp.path());
        assert_eq!(manager.latest(), "ipl-2024");
        assert_eq!(manager.snapshots().len(), 2);
        assert_eq!(manager.snapshots()[0].schema_version, "1.0.0");
    }
}
