//! File-backed TTL cache
//!
//! One frame file per key under the cache directory:
//!
//! ```text
//! +------------------+
//! | Expires at       | (u64 LE, unix seconds)
//! +------------------+
//! | Value tag        | (u8: 0 = table, 1 = scalar)
//! +------------------+
//! | Payload          | (length-prefixed bytes)
//! +------------------+
//! | Checksum         | (u32 LE, CRC32 over everything above)
//! +------------------+
//! ```
//!
//! A frame that is missing, truncated, corrupt, or expired reads as a miss.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use super::codec;
use super::errors::{CacheError, CacheResult};
use super::value::CachedValue;
use super::QueryCache;

const TAG_TABLE: u8 = 0;
const TAG_SCALAR: u8 = 1;

/// Cache that survives process restarts.
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    /// Opens a cache under `dir`, creating the directory if needed.
    pub fn open(dir: &Path) -> CacheResult<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn frame_path(&self, key: &str) -> PathBuf {
        // Keys are lowercase hex digests, safe as file names.
        self.dir.join(format!("{}.frame", key))
    }

    fn read_frame(&self, key: &str) -> CacheResult<Option<CachedValue>> {
        let data = match fs::read(self.frame_path(key)) {
            Ok(data) => data,
            Err(_) => return Ok(None),
        };
        // 8 expiry + 1 tag + 4 payload length + 4 checksum
        if data.len() < 17 {
            return Ok(None);
        }

        let body_end = data.len() - 4;
        let stored = u32::from_le_bytes(data[body_end..].try_into().unwrap_or_default());
        if crc32fast::hash(&data[..body_end]) != stored {
            return Ok(None);
        }

        let expires_at = u64::from_le_bytes(data[..8].try_into().unwrap_or_default());
        if expires_at <= unix_now() {
            return Ok(None);
        }

        let tag = data[8];
        let payload_len = u32::from_le_bytes(data[9..13].try_into().unwrap_or_default()) as usize;
        if 13 + payload_len != body_end {
            return Ok(None);
        }
        let payload = &data[13..body_end];
        let value = match tag {
            TAG_TABLE => CachedValue::Table(codec::decode_table(payload)?),
            TAG_SCALAR => CachedValue::Scalar(serde_json::from_slice(payload)?),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn write_frame(&self, key: &str, value: &CachedValue, ttl: Duration) -> CacheResult<()> {
        let (tag, payload) = match value {
            CachedValue::Table(table) => (TAG_TABLE, codec::encode_table(table)),
            CachedValue::Scalar(scalar) => (TAG_SCALAR, serde_json::to_vec(scalar)?),
        };

        let expires_at = unix_now().saturating_add(ttl.as_secs());
        let mut frame = Vec::with_capacity(17 + payload.len());
        frame.extend_from_slice(&expires_at.to_le_bytes());
        frame.push(tag);
        frame.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        frame.extend_from_slice(&payload);
        let checksum = crc32fast::hash(&frame);
        frame.extend_from_slice(&checksum.to_le_bytes());

        // Write-then-rename so readers never see a half-written frame.
        let tmp = self.frame_path(key).with_extension("tmp");
        fs::write(&tmp, &frame)?;
        fs::rename(&tmp, self.frame_path(key)).map_err(CacheError::Io)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl QueryCache for FileCache {
    fn get(&self, key: &str) -> Option<CachedValue> {
        self.read_frame(key).unwrap_or(None)
    }

    fn set(&self, key: &str, value: CachedValue, ttl: Duration) -> CacheResult<()> {
        self.write_frame(key, &value, ttl)
    }

    fn clear(&self) -> CacheResult<()> {
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "frame") {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{Column, Table};
    use tempfile::TempDir;

    fn small_table() -> Table {
        Table::new(vec![
            ("runs".into(), Column::Int64(vec![4, 6])),
            ("balls".into(), Column::Int64(vec![2, 3])),
        ])
        .unwrap()
    }

    #[test]
    fn test_table_round_trip_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let key = "a".repeat(64);
        {
            let cache = FileCache::open(tmp.path()).unwrap();
            cache
                .set(&key, CachedValue::Table(small_table()), Duration::from_secs(60))
                .unwrap();
        }
        let cache = FileCache::open(tmp.path()).unwrap();
        assert_eq!(cache.get(&key), Some(CachedValue::Table(small_table())));
    }

    #[test]
    fn test_expired_frame_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::open(tmp.path()).unwrap();
        cache
            .set("k", CachedValue::Scalar(serde_json::json!(1)), Duration::ZERO)
            .unwrap();
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_corrupt_frame_is_a_miss_not_an_error() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::open(tmp.path()).unwrap();
        cache
            .set("k", CachedValue::Table(small_table()), Duration::from_secs(60))
            .unwrap();

        let path = tmp.path().join("k.frame");
        let mut bytes = fs::read(&path).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xFF;
        fs::write(&path, &bytes).unwrap();

        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn test_clear_removes_frames() {
        let tmp = TempDir::new().unwrap();
        let cache = FileCache::open(tmp.path()).unwrap();
        cache
            .set("k", CachedValue::Scalar(serde_json::json!(1)), Duration::from_secs(60))
            .unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.get("k"), None);
    }
}
