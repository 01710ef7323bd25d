//! On-disk snapshot and cursor files.
//!
//! Each collection is stored as `<tenant>_<cacheName>.gz`, a gzip-compressed
//! JSON envelope `{ saved_at, objects }`. Its delta cursor, if any, lives
//! next to it in `<tenant>_<cacheName>_deltaLink.gz`. Files are replaced
//! whole by writing a sibling temp file and renaming it over the target;
//! there is no locking.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use maz_core::{EntitySnapshot, EntityType, RemoteObject};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::delta::DeltaCursor;
use crate::error::SyncError;

const EXTENSION: &str = "gz";
const CURSOR_SUFFIX: &str = "_deltaLink";

#[derive(Serialize, Deserialize)]
struct Envelope {
    saved_at: DateTime<Utc>,
    objects: Vec<Value>,
}

/// A snapshot as read back from disk.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredSnapshot {
    pub saved_at: DateTime<Utc>,
    pub objects: EntitySnapshot,
}

#[derive(Debug, Clone)]
pub struct SnapshotFiles {
    dir: PathBuf,
    tenant: String,
}

impl SnapshotFiles {
    pub fn new(dir: impl Into<PathBuf>, tenant: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            tenant: tenant.into(),
        }
    }

    #[must_use]
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    #[must_use]
    pub fn snapshot_path(&self, entity: EntityType) -> PathBuf {
        self.dir
            .join(format!("{}_{}.{EXTENSION}", self.tenant, entity.cache_name()))
    }

    #[must_use]
    pub fn cursor_path(&self, entity: EntityType) -> PathBuf {
        self.dir.join(format!(
            "{}_{}{CURSOR_SUFFIX}.{EXTENSION}",
            self.tenant,
            entity.cache_name()
        ))
    }

    /// Read the persisted snapshot. Missing or unreadable files yield `None`.
    #[must_use]
    pub fn load_snapshot(&self, entity: EntityType) -> Option<StoredSnapshot> {
        let envelope: Envelope = read_gz_json(&self.snapshot_path(entity))?;
        let (objects, skipped) = RemoteObject::from_values(envelope.objects, entity.id_attr());
        if skipped > 0 {
            tracing::warn!(%entity, skipped, "ignored malformed cached objects");
        }
        Some(StoredSnapshot {
            saved_at: envelope.saved_at,
            objects,
        })
    }

    /// Replace the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] or [`SyncError::Json`] if the file cannot be written.
    pub fn save_snapshot(
        &self,
        entity: EntityType,
        objects: &[RemoteObject],
        saved_at: DateTime<Utc>,
    ) -> Result<(), SyncError> {
        let envelope = Envelope {
            saved_at,
            objects: objects.iter().cloned().map(RemoteObject::into_value).collect(),
        };
        write_gz_json(&self.snapshot_path(entity), &envelope)?;
        tracing::debug!(%entity, count = objects.len(), "saved snapshot");
        Ok(())
    }

    #[must_use]
    pub fn load_cursor(&self, entity: EntityType) -> Option<DeltaCursor> {
        read_gz_json(&self.cursor_path(entity))
    }

    /// # Errors
    ///
    /// Returns [`SyncError::Io`] or [`SyncError::Json`] if the file cannot be written.
    pub fn save_cursor(&self, entity: EntityType, cursor: &DeltaCursor) -> Result<(), SyncError> {
        write_gz_json(&self.cursor_path(entity), cursor)
    }

    /// Remove one collection's snapshot and cursor. Returns how many files
    /// were deleted.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if an existing file cannot be removed.
    pub fn clear(&self, entity: EntityType) -> Result<usize, SyncError> {
        let mut removed = 0;
        for path in [self.snapshot_path(entity), self.cursor_path(entity)] {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }

    /// Remove every cache file belonging to this tenant.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Io`] if the directory cannot be listed or a file
    /// cannot be removed.
    pub fn clear_all(&self) -> Result<usize, SyncError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };
        let prefix = format!("{}_", self.tenant);
        let mut removed = 0;
        for entry in entries {
            let path = entry?.path();
            let owned = path.is_file()
                && path.extension().is_some_and(|ext| ext == EXTENSION)
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(&prefix));
            if owned {
                fs::remove_file(&path)?;
                removed += 1;
            }
        }
        tracing::info!(removed, dir = %self.dir.display(), "cleared cache");
        Ok(removed)
    }
}

fn read_gz_json<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(error) => {
            tracing::warn!(path = %path.display(), %error, "cache file unreadable");
            return None;
        }
    };
    let mut json = String::new();
    if let Err(error) = GzDecoder::new(file).read_to_string(&mut json) {
        tracing::warn!(path = %path.display(), %error, "cache file corrupt");
        return None;
    }
    serde_json::from_str(&json)
        .map_err(|error| tracing::warn!(path = %path.display(), %error, "cache file corrupt"))
        .ok()
}

fn write_gz_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SyncError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;
    let json = serde_json::to_vec(value)?;

    let staging = tempfile::NamedTempFile::new_in(parent)?;
    let mut encoder = GzEncoder::new(staging, Compression::default());
    encoder.write_all(&json)?;
    let staging = encoder.finish()?;
    staging.as_file().sync_all()?;
    staging.persist(path).map_err(|e| e.error)?;
    Ok(())
}
