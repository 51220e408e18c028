// src/ledger.rs
//
// Spending ledger: a JSON array of records in a single file. Every mutation
// rewrites the whole file through a temp file + rename, serialized by an
// async mutex, so readers never observe a half-written array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::currency::round2;

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("ledger io error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("ledger file is not a valid record array: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpendingRecord {
    pub email: String,
    pub amount: f64,
    pub description: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub server_id: String,
    pub date: DateTime<Utc>,
}

impl SpendingRecord {
    pub fn new(
        email: &str,
        amount: f64,
        description: impl Into<String>,
        server_id: impl Into<String>,
    ) -> Self {
        Self {
            email: normalize_email(email),
            amount,
            description: description.into(),
            server_id: server_id.into(),
            date: Utc::now(),
        }
    }

    pub fn belongs_to(&self, email: &str) -> bool {
        self.email == normalize_email(email)
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Older files stored numeric panel ids.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "serverId must be a string or number, got {other}"
        ))),
    }
}

#[derive(Clone)]
pub struct SpendingLedger {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl SpendingLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records. A missing or empty file is an empty ledger.
    pub async fn load(&self) -> Result<Vec<SpendingRecord>, LedgerError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(LedgerError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    pub async fn records_for(&self, email: &str) -> Result<Vec<SpendingRecord>, LedgerError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .filter(|r| r.belongs_to(email))
            .collect())
    }

    pub async fn total_for(&self, email: &str) -> Result<f64, LedgerError> {
        let total: f64 = self
            .records_for(email)
            .await?
            .iter()
            .map(|r| r.amount)
            .sum();
        Ok(round2(total))
    }

    /// Appends a purchase record. Any record already carrying its `server_id`
    /// (a backfill written by a listing that raced the purchase) is replaced,
    /// so a server is charged once. Returns the replaced records.
    pub async fn record(&self, record: SpendingRecord) -> Result<Vec<SpendingRecord>, LedgerError> {
        self.mutate(|records| {
            let mut replaced = Vec::new();
            if !record.server_id.is_empty() {
                let (same, kept): (Vec<_>, Vec<_>) = records
                    .drain(..)
                    .partition(|r| r.server_id == record.server_id);
                *records = kept;
                replaced = same;
            }
            records.push(record);
            (replaced, true)
        })
        .await
    }

    /// Appends `record` only when no record carries its `server_id` yet.
    /// Returns whether it was written.
    pub async fn record_untracked(&self, record: SpendingRecord) -> Result<bool, LedgerError> {
        self.mutate(|records| {
            let tracked = records.iter().any(|r| r.server_id == record.server_id);
            if tracked {
                (false, false)
            } else {
                records.push(record);
                (true, true)
            }
        })
        .await
    }

    /// Removes every record for `server_id` and returns what was removed.
    pub async fn refund_server(&self, server_id: &str) -> Result<Vec<SpendingRecord>, LedgerError> {
        self.mutate(|records| {
            let (removed, kept): (Vec<_>, Vec<_>) = records
                .drain(..)
                .partition(|r| !server_id.is_empty() && r.server_id == server_id);
            *records = kept;
            let changed = !removed.is_empty();
            (removed, changed)
        })
        .await
    }

    async fn mutate<R, F>(&self, apply: F) -> Result<R, LedgerError>
    where
        F: FnOnce(&mut Vec<SpendingRecord>) -> (R, bool),
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load().await?;
        let (result, changed) = apply(&mut records);
        if changed {
            self.persist(&records).await?;
        }
        Ok(result)
    }

    async fn persist(&self, records: &[SpendingRecord]) -> Result<(), LedgerError> {
        let io_err = |source| LedgerError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
        }

        let body = serde_json::to_vec_pretty(records)?;
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("spending.json");
        let tmp = self
            .path
            .with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

        tokio::fs::write(&tmp, body).await.map_err(io_err)?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err(e));
        }
        Ok(())
    }
}
