use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::SubscriberEmail;

/// Well-known key under which the subscriber list is kept
pub const STORAGE_KEY: &str = "newsletterSubscribers";

/// Minimal string key/value storage, in the spirit of a browser's
/// `localStorage`.
pub trait Storage {
    fn get_item(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError>;
    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError>;
    fn remove_item(
        &self,
        key: &str,
    ) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage I/O failed")]
    Io(#[from] std::io::Error),
    #[error("stored subscriber list is corrupt")]
    Corrupt(#[from] serde_json::Error),
    #[error("storage lock poisoned")]
    Poisoned,
}

/// Volatile storage; mostly for tests and for widgets without a profile
/// directory.
#[derive(Default)]
pub struct MemoryStorage(Mutex<HashMap<String, String>>);

impl Storage for MemoryStorage {
    fn get_item(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        let items = self.0.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut items = self.0.lock().map_err(|_| StoreError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(
        &self,
        key: &str,
    ) -> Result<(), StoreError> {
        let mut items = self.0.lock().map_err(|_| StoreError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under `dir`. The directory is created on
/// first write.
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    fn path(
        &self,
        key: &str,
    ) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(
        &self,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(
        &self,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;
        // write-then-rename, so readers never see a half-written list
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, self.path(key))?;
        Ok(())
    }

    fn remove_item(
        &self,
        key: &str,
    ) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// A subscription attempt remembered locally
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriberRecord {
    /// Normalized address; unique within the store
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
    pub last_subscription: DateTime<Utc>,
}

/// Best-effort local record of subscribers, used when the remote handler is
/// unavailable. Not a system of record: there is no locking across
/// processes, so two writers may interleave.
pub struct FallbackStore<S> {
    storage: S,
}

impl<S: Storage> FallbackStore<S> {
    pub fn new(storage: S) -> Self { Self { storage } }

    /// The raw backing storage
    pub fn storage(&self) -> &S { &self.storage }

    pub fn upsert(
        &self,
        email: &SubscriberEmail,
    ) -> Result<SubscriberRecord, StoreError> {
        self.upsert_at(email, Utc::now())
    }

    /// Insert a record for `email`, or bump `last_subscription` of the existing
    /// one. Never creates a second record for the same address.
    ///
    /// Unlike `list`, a corrupt stored value is an error here: overwriting it
    /// would silently drop whatever it held.
    #[tracing::instrument(name = "Saving subscriber locally", skip_all)]
    pub fn upsert_at(
        &self,
        email: &SubscriberEmail,
        now: DateTime<Utc>,
    ) -> Result<SubscriberRecord, StoreError> {
        let mut records: Vec<SubscriberRecord> = match self.storage.get_item(STORAGE_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };

        let record = match records.iter_mut().find(|r| r.email == email.as_ref()) {
            Some(existing) => {
                existing.last_subscription = now;
                existing.clone()
            }
            None => {
                let record = SubscriberRecord {
                    email: email.as_ref().to_string(),
                    subscribed_at: now,
                    last_subscription: now,
                };
                records.push(record.clone());
                record
            }
        };

        self.storage
            .set_item(STORAGE_KEY, &serde_json::to_string(&records)?)?;
        Ok(record)
    }

    /// All records, in insertion order. An absent or unreadable value is an
    /// empty list.
    pub fn list(&self) -> Vec<SubscriberRecord> {
        let raw = match self.storage.get_item(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(error.message = %e, "could not read subscriber list");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error.message = %e, "ignoring corrupt subscriber list");
            Vec::new()
        })
    }

    /// Remove every record. Destructive; callers must have obtained explicit
    /// confirmation.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.storage.remove_item(STORAGE_KEY)?;
        tracing::info!("all subscribers cleared");
        Ok(())
    }

    /// `Email,Subscribed At,Last Subscription` with RFC 3339 timestamps, or
    /// an empty string if there are no records.
    pub fn export_csv(&self) -> String {
        let records = self.list();
        if records.is_empty() {
            return String::new();
        }
        let mut csv = String::from("Email,Subscribed At,Last Subscription\n");
        for r in records {
            csv.push_str(&format!(
                "{},{},{}\n",
                csv_field(&r.email),
                csv_field(&r.subscribed_at.to_rfc3339()),
                csv_field(&r.last_subscription.to_rfc3339()),
            ));
        }
        csv
    }
}

fn csv_field(value: &str) -> String { format!("\"{}\"", value.replace('"', "\"\"")) }
