use super::{Document, DocumentStore, Result, StoreError, assign_id};
use crate::lifecycle::{LifecycleError, OnModuleDestroy, OnModuleInit};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Directory-backed document store
///
/// Each collection lives in `<root>/<collection>.jsonl`, one document per
/// line. Inserts append, `delete_all` truncates. Append handles are opened
/// lazily and kept until the store is destroyed.
pub struct FileStore {
    root: PathBuf,
    writers: Mutex<HashMap<String, File>>,
    closed: AtomicBool,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            writers: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidCollection(collection.to_string()));
        }
        Ok(self.root.join(format!("{collection}.jsonl")))
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable(format!(
                "file store at {} has been closed",
                self.root.display()
            )));
        }
        Ok(())
    }

    async fn read_bytes(&self, collection: &str, path: &Path) -> Result<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                collection: collection.to_string(),
                source,
            }),
        }
    }

    /// Newline-terminated records of `path`; an unterminated tail is not a record
    async fn read_lines(&self, collection: &str, path: &Path) -> Result<Option<String>> {
        let Some(mut bytes) = self.read_bytes(collection, path).await? else {
            return Ok(None);
        };
        bytes.truncate(complete_len(&bytes));
        String::from_utf8(bytes).map(Some).map_err(|e| StoreError::Io {
            collection: collection.to_string(),
            source: std::io::Error::new(ErrorKind::InvalidData, e),
        })
    }

    /// Drop a trailing unterminated line left by an interrupted append
    async fn repair_tail(&self, collection: &str, path: &Path) -> Result<()> {
        let Some(bytes) = self.read_bytes(collection, path).await? else {
            return Ok(());
        };
        let keep = complete_len(&bytes);
        if keep == bytes.len() {
            return Ok(());
        }

        tracing::warn!(
            "File store: discarding {} bytes of incomplete record at the end of {}",
            bytes.len() - keep,
            path.display()
        );
        truncate(path, keep as u64).await.map_err(io_err(collection))
    }
}

/// Length of the prefix of `bytes` up to and including its last newline
fn complete_len(bytes: &[u8]) -> usize {
    bytes
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |end| end + 1)
}

async fn truncate(path: &Path, len: u64) -> std::io::Result<()> {
    let file = OpenOptions::new().write(true).open(path).await?;
    file.set_len(len).await
}

fn io_err(collection: &str) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        collection: collection.to_string(),
        source,
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<Document> {
        self.ensure_open()?;
        let path = self.collection_path(collection)?;
        let document = assign_id(document);

        let mut line = serde_json::to_vec(&document).map_err(StoreError::Encode)?;
        line.push(b'\n');

        let mut writers = self.writers.lock().await;
        if !writers.contains_key(collection) {
            self.repair_tail(collection, &path).await?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await
                .map_err(io_err(collection))?;
            writers.insert(collection.to_string(), file);
        }
        let Some(file) = writers.get_mut(collection) else {
            return Err(StoreError::Unavailable(format!(
                "no writer for collection {collection}"
            )));
        };

        let start = file.metadata().await.map_err(io_err(collection))?.len();
        let outcome = async {
            file.write_all(&line).await?;
            file.flush().await
        }
        .await;

        if let Err(source) = outcome {
            // Roll back to the last complete line and reopen on the next insert.
            writers.remove(collection);
            if let Err(e) = truncate(&path, start).await {
                tracing::error!(
                    "File store: failed to roll back partial write to {}: {}",
                    path.display(),
                    e
                );
            }
            return Err(StoreError::Io {
                collection: collection.to_string(),
                source,
            });
        }

        Ok(document)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.ensure_open()?;
        let path = self.collection_path(collection)?;

        // Held so a concurrent append is never observed half-written.
        let _writers = self.writers.lock().await;
        let Some(content) = self.read_lines(collection, &path).await? else {
            return Ok(Vec::new());
        };

        let mut documents = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).map_err(|e| StoreError::Corrupt {
                collection: collection.to_string(),
                line: index + 1,
                message: e.to_string(),
            })?;
            match value {
                Value::Object(document) => documents.push(document),
                other => {
                    return Err(StoreError::Corrupt {
                        collection: collection.to_string(),
                        line: index + 1,
                        message: format!("expected a JSON object, found {other}"),
                    });
                }
            }
        }
        Ok(documents)
    }

    async fn delete_all(&self, collection: &str) -> Result<u64> {
        self.ensure_open()?;
        let path = self.collection_path(collection)?;

        let mut writers = self.writers.lock().await;
        let Some(content) = self.read_lines(collection, &path).await? else {
            return Ok(0);
        };
        let removed = content.lines().filter(|l| !l.trim().is_empty()).count() as u64;

        // Drop the append handle before truncating; it is reopened on next insert.
        writers.remove(collection);
        fs::write(&path, b"").await.map_err(io_err(collection))?;

        Ok(removed)
    }
}

#[async_trait]
impl OnModuleInit for FileStore {
    async fn on_module_init(&self) -> std::result::Result<(), LifecycleError> {
        tracing::info!("File store: opening {}", self.root.display());
        fs::create_dir_all(&self.root).await.map_err(|e| {
            LifecycleError::init_failed(format!(
                "cannot create store directory {}: {e}",
                self.root.display()
            ))
        })?;
        self.closed.store(false, Ordering::Release);
        Ok(())
    }
}

#[async_trait]
impl OnModuleDestroy for FileStore {
    async fn on_module_destroy(&self) -> std::result::Result<(), LifecycleError> {
        let mut writers = self.writers.lock().await;
        self.closed.store(true, Ordering::Release);

        let mut failures = Vec::new();
        for (collection, mut file) in writers.drain() {
            if let Err(e) = file.flush().await {
                failures.push(format!("{collection}: {e}"));
                continue;
            }
            if let Err(e) = file.sync_all().await {
                failures.push(format!("{collection}: {e}"));
            }
        }
        tracing::info!("File store: closed {}", self.root.display());

        if failures.is_empty() {
            Ok(())
        } else {
            Err(LifecycleError::shutdown_failed(failures.join(", ")))
        }
    }
}
