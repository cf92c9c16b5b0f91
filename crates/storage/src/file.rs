// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON-file tables guarded by advisory file locks
//!
//! Each table is `<root>/<table>.json`. Every operation holds a lock on
//! `<root>/<table>.lock` across its read-evaluate-write cycle, so conditional
//! writes are linearizable across processes. Writes go to a temp file that is
//! renamed over the table.

use async_trait::async_trait;
use ddlock_core::{DeleteRequest, GetRequest, Item, LockStore, PutRequest, StoreError};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors reading or writing table files
#[derive(Debug, Error)]
pub enum FileStoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid table name: {0:?}")]
    TableName(String),
}

impl From<FileStoreError> for StoreError {
    fn from(e: FileStoreError) -> Self {
        match e {
            FileStoreError::Io(e) => StoreError::Io(e),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TableDoc {
    entries: Vec<Entry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    key: Item,
    item: Item,
}

impl TableDoc {
    fn position(&self, key: &Item) -> Option<usize> {
        self.entries.iter().position(|e| &e.key == key)
    }

    fn get(&self, key: &Item) -> Option<&Item> {
        self.position(key).map(|i| &self.entries[i].item)
    }
}

#[derive(Clone, Copy)]
enum Access {
    Read,
    Write,
}

/// Lock store keeping one JSON document per table under a directory
#[derive(Clone, Debug)]
pub struct FileStore {
    root: Arc<PathBuf>,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, FileStoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root: Arc::new(root),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Run `f` against a table under its file lock. `f` returns its result
    /// and whether the table changed.
    async fn transact<R, F>(&self, table: String, access: Access, f: F) -> Result<R, StoreError>
    where
        R: Send + 'static,
        F: FnOnce(&mut TableDoc) -> Result<(R, bool), StoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || transact_blocking(&root, &table, access, f))
            .await
            .map_err(|e| StoreError::Backend(format!("file store task failed: {}", e)))?
    }
}

fn check_table_name(table: &str) -> Result<(), FileStoreError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !table.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(FileStoreError::TableName(table.to_string()))
    }
}

fn transact_blocking<R, F>(root: &Path, table: &str, access: Access, f: F) -> Result<R, StoreError>
where
    F: FnOnce(&mut TableDoc) -> Result<(R, bool), StoreError>,
{
    check_table_name(table)?;
    let data_path = root.join(format!("{}.json", table));

    let lock_file = OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(root.join(format!("{}.lock", table)))?;
    match access {
        Access::Read => lock_file.lock_shared()?,
        Access::Write => lock_file.lock_exclusive()?,
    }

    let mut doc = read_doc(&data_path)?;
    let (result, dirty) = f(&mut doc)?;
    if dirty {
        write_doc(&data_path, &doc)?;
        tracing::trace!(table, entries = doc.entries.len(), "table file written");
    }

    // Closing the lock file releases the lock
    drop(lock_file);
    Ok(result)
}

fn read_doc(path: &Path) -> Result<TableDoc, FileStoreError> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Ok(TableDoc::default()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(TableDoc::default()),
        Err(e) => Err(e.into()),
    }
}

fn write_doc(path: &Path, doc: &TableDoc) -> Result<(), FileStoreError> {
    let tmp = path.with_extension("json.tmp");
    let mut file = File::create(&tmp)?;
    serde_json::to_writer_pretty(&mut file, doc)?;
    file.write_all(b"\n")?;
    file.sync_all()?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[async_trait]
impl LockStore for FileStore {
    async fn get(&self, request: GetRequest) -> Result<Option<Item>, StoreError> {
        // Reads under the table lock are always consistent
        self.transact(request.table, Access::Read, move |doc| {
            Ok((doc.get(&request.key).cloned(), false))
        })
        .await
    }

    async fn put(&self, request: PutRequest) -> Result<(), StoreError> {
        self.transact(request.table, Access::Write, move |doc| {
            let holds = request
                .condition
                .as_ref()
                .is_none_or(|c| c.evaluate(doc.get(&request.key)));
            if !holds {
                return Err(StoreError::ConditionalCheckFailed);
            }
            match doc.position(&request.key) {
                Some(i) => doc.entries[i].item = request.item,
                None => doc.entries.push(Entry {
                    key: request.key,
                    item: request.item,
                }),
            }
            Ok(((), true))
        })
        .await
    }

    async fn delete(&self, request: DeleteRequest) -> Result<(), StoreError> {
        self.transact(request.table, Access::Write, move |doc| {
            let holds = request
                .condition
                .as_ref()
                .is_none_or(|c| c.evaluate(doc.get(&request.key)));
            if !holds {
                return Err(StoreError::ConditionalCheckFailed);
            }
            match doc.position(&request.key) {
                Some(i) => {
                    doc.entries.remove(i);
                    Ok(((), true))
                }
                None => Ok(((), false)),
            }
        })
        .await
    }
}

#[cfg(test)]
#[path = "file_tests.rs"]
mod tests;
