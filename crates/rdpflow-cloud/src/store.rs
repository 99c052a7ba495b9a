//! Credential store for issued VM credentials
//!
//! Keeps a `name -> {username, password}` mapping in memory and mirrors it
//! to a single pretty-printed JSON file. Every mutation rewrites the whole
//! file. Mutations are serialized through one async mutex, so overlapping
//! workflows cannot drop each other's updates.

use crate::error::{CloudError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

/// Credentials issued for one VM
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmRecord {
    pub username: String,
    pub password: String,
}

impl VmRecord {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for VmRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VmRecord")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Entry returned by [`CredentialStore::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedVm {
    pub name: String,
    pub username: String,
}

impl fmt::Display for SavedVm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.name, self.username)
    }
}

type Records = IndexMap<String, VmRecord>;

/// File-backed credential store
///
/// Construct once at startup with [`CredentialStore::load`] and share the
/// handle (usually behind an `Arc`) with every consumer.
pub struct CredentialStore {
    path: PathBuf,
    records: Mutex<Records>,
}

impl CredentialStore {
    /// Load the store from `path`
    ///
    /// A missing, empty or unparseable file degrades to an empty store, and
    /// the empty mapping is written back (creating parent directories).
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let loaded = match fs::read(&path).await {
            Ok(bytes) if bytes.trim_ascii().is_empty() => {
                tracing::debug!("Credential file {} is empty", path.display());
                None
            }
            Ok(bytes) => match serde_json::from_slice::<Records>(&bytes) {
                Ok(records) => Some(records),
                Err(e) => {
                    tracing::warn!(
                        "Error parsing {}, creating new empty store: {}",
                        path.display(),
                        e
                    );
                    None
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("Credential file {} not found", path.display());
                None
            }
            Err(e) => return Err(e.into()),
        };

        let records = match loaded {
            Some(records) => {
                tracing::debug!("Loaded {} credential record(s)", records.len());
                records
            }
            None => {
                let empty = Records::new();
                persist(&path, &empty).await?;
                empty
            }
        };

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or overwrite the record for `name` and persist
    ///
    /// The in-memory mapping only changes once the file write succeeded.
    pub async fn save(&self, name: &str, record: VmRecord) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CloudError::InvalidRecord("VM name is empty".to_string()));
        }

        let mut records = self.records.lock().await;
        let mut next = records.clone();
        next.insert(name.to_string(), record);
        persist(&self.path, &next).await?;
        *records = next;

        tracing::debug!("Saved credentials for {}", name);
        Ok(())
    }

    pub async fn get(&self, name: &str) -> Option<VmRecord> {
        self.records.lock().await.get(name).cloned()
    }

    /// Saved VMs in insertion order
    pub async fn list(&self) -> Vec<SavedVm> {
        self.records
            .lock()
            .await
            .iter()
            .map(|(name, record)| SavedVm {
                name: name.clone(),
                username: record.username.clone(),
            })
            .collect()
    }

    /// Remove the record for `name` and persist. Absent names are a no-op.
    pub async fn remove(&self, name: &str) -> Result<()> {
        let mut records = self.records.lock().await;
        if !records.contains_key(name) {
            return Ok(());
        }

        let mut next = records.clone();
        next.shift_remove(name);
        persist(&self.path, &next).await?;
        *records = next;

        tracing::debug!("Removed credentials for {}", name);
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

/// Replace the file content with the serialized mapping
///
/// Writes a sibling temporary file and renames it over the target.
async fn persist(path: &Path, records: &Records) -> Result<()> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).await?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| CloudError::StoreError(format!("invalid path: {}", path.display())))?;
    let tmp = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    let content = serde_json::to_string_pretty(records)?;
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}
