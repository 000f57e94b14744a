//! In-process document store for the content graph.
//!
//! All collections live behind one `RwLock`. Reads share the lock; every
//! mutation runs as a closure over a working copy of the collections and is
//! committed only when the closure returns `Ok`, so a write touching several
//! documents either lands completely or not at all. When a snapshot path is
//! configured the committed state is written to disk before it becomes
//! visible to readers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AcademyError, Result};
use crate::model::{Category, Course, Instructor, Lesson, Module, Topic, User};

/// Snapshot format version written alongside the collections.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Every collection of the content graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collections {
    /// Courses by id.
    #[serde(default)]
    pub courses: BTreeMap<Uuid, Course>,
    /// Categories by id.
    #[serde(default)]
    pub categories: BTreeMap<Uuid, Category>,
    /// Topics by id.
    #[serde(default)]
    pub topics: BTreeMap<Uuid, Topic>,
    /// Modules by id.
    #[serde(default)]
    pub modules: BTreeMap<Uuid, Module>,
    /// Lessons by id.
    #[serde(default)]
    pub lessons: BTreeMap<Uuid, Lesson>,
    /// Instructors by id.
    #[serde(default)]
    pub instructors: BTreeMap<Uuid, Instructor>,
    /// Users by id.
    #[serde(default)]
    pub users: BTreeMap<Uuid, User>,
    /// Course created for each client submission id.
    #[serde(default)]
    pub submissions: BTreeMap<Uuid, Uuid>,
}

/// On-disk snapshot layout. Written from borrowed collections, read into owned ones.
#[derive(Debug, Serialize, Deserialize)]
struct Snapshot<C> {
    version: u32,
    #[serde(flatten)]
    collections: C,
}

/// Shared document store.
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<Collections>,
    snapshot_path: Option<PathBuf>,
}

impl Store {
    /// Creates an empty store that is never written to disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a store from existing collections.
    #[must_use]
    pub fn with_collections(collections: Collections, snapshot_path: Option<PathBuf>) -> Self {
        Self {
            data: RwLock::new(collections),
            snapshot_path,
        }
    }

    /// Opens a store backed by a snapshot file.
    ///
    /// A missing file yields an empty store that will create the file on the
    /// first write.
    ///
    /// # Errors
    ///
    /// Returns `AcademyError::SnapshotCorrupted` if the file is not a valid
    /// snapshot, or `AcademyError::Io` if it cannot be read.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let collections = match tokio::fs::read_to_string(path).await {
            Ok(contents) => {
                let snapshot: Snapshot<Collections> = serde_json::from_str(&contents)
                    .map_err(|e| AcademyError::snapshot_corrupted(path, e.to_string()))?;
                if snapshot.version != SNAPSHOT_VERSION {
                    return Err(AcademyError::snapshot_corrupted(
                        path,
                        format!(
                            "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                            snapshot.version
                        ),
                    ));
                }
                info!(
                    path = %path.display(),
                    courses = snapshot.collections.courses.len(),
                    categories = snapshot.collections.categories.len(),
                    "Loaded catalog snapshot"
                );
                snapshot.collections
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No snapshot found, starting with an empty catalog");
                Collections::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self::with_collections(collections, Some(path.to_path_buf())))
    }

    /// Runs a read-only query against the collections.
    pub async fn read<R>(&self, query: impl FnOnce(&Collections) -> R) -> R {
        let data = self.data.read().await;
        query(&data)
    }

    /// Runs a mutation as a single transaction.
    ///
    /// The closure receives a working copy. If it returns `Err`, nothing is
    /// committed. If it returns `Ok`, the copy is persisted (when a snapshot
    /// path is set) and then replaces the live collections. A failed
    /// snapshot write aborts the commit.
    pub async fn write<R>(
        &self,
        mutation: impl FnOnce(&mut Collections) -> Result<R>,
    ) -> Result<R> {
        let mut data = self.data.write().await;
        let mut working = data.clone();

        let result = mutation(&mut working)?;

        if let Some(path) = &self.snapshot_path {
            if let Err(e) = persist(path, &working).await {
                warn!(path = %path.display(), error = %e, "Snapshot write failed, transaction rolled back");
                return Err(e);
            }
        }

        *data = working;
        Ok(result)
    }
}

/// Writes collections to `path` via a synced temp file and rename.
async fn persist(path: &Path, collections: &Collections) -> Result<()> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        collections,
    };
    let json = serde_json::to_vec_pretty(&snapshot)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&json).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(&tmp, path).await?;

    debug!(path = %path.display(), bytes = json.len(), "Snapshot written");
    Ok(())
}
