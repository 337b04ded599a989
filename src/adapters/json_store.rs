use crate::domain::model::{AgeCounts, AgeRange, PersonRecord, StoredPerson};
use crate::domain::ports::{RecordStore, Storage};
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

pub const DEFAULT_FILE_NAME: &str = "people.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct PeopleDocument {
    last_id: u64,
    people: Vec<StoredPerson>,
}

impl PeopleDocument {
    fn append(&mut self, records: Vec<PersonRecord>) -> usize {
        let imported_at = Utc::now();
        let first_id = self.last_id + 1;
        let inserted = records.len();
        self.people.extend(
            records
                .into_iter()
                .zip(first_id..)
                .map(|(record, id)| StoredPerson::from_record(id, record, imported_at)),
        );
        self.last_id += inserted as u64;
        inserted
    }
}

/// Keeps every stored person in one JSON document.
///
/// Each write replaces the whole document, so a failed write leaves the
/// previous contents untouched.
pub struct JsonFileStore<S: Storage> {
    storage: S,
    file_name: String,
    // 序列化所有讀寫操作
    write_lock: Mutex<()>,
}

impl<S: Storage> JsonFileStore<S> {
    pub fn new(storage: S, file_name: impl Into<String>) -> Self {
        Self {
            storage,
            file_name: file_name.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load_document(&self) -> Result<PeopleDocument> {
        match self.storage.read_file(&self.file_name).await {
            Ok(bytes) if bytes.is_empty() => Ok(PeopleDocument::default()),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                EtlError::store(format!(
                    "{} is not a valid people document: {}",
                    self.describe(),
                    e
                ))
            }),
            Err(EtlError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No store document at {}, starting empty", self.describe());
                Ok(PeopleDocument::default())
            }
            Err(e) => Err(e),
        }
    }

    async fn save_document(&self, document: &PeopleDocument) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(document)?;
        self.storage
            .write_file(&self.file_name, &bytes)
            .await
            .map_err(|e| EtlError::store(format!("writing {} failed: {}", self.describe(), e)))
    }
}

#[async_trait]
impl<S: Storage> RecordStore for JsonFileStore<S> {
    async fn bulk_insert(&self, records: Vec<PersonRecord>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load_document().await?;
        let inserted = document.append(records);

        self.save_document(&document).await?;
        tracing::info!("💾 Insert of {} users complete!", inserted);
        Ok(inserted)
    }

    async fn clear(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load_document().await?;
        let removed = document.people.len();
        document.people.clear();
        self.save_document(&document).await?;
        tracing::info!("🧹 Store cleared ({} users removed)", removed);
        Ok(removed)
    }

    async fn replace_all(&self, records: Vec<PersonRecord>) -> Result<(usize, usize)> {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load_document().await?;
        let removed = document.people.len();
        document.people.clear();
        let inserted = document.append(records);

        // 清除與寫入在同一次存檔完成
        self.save_document(&document).await?;
        tracing::info!("💾 Replaced {} users with {} users", removed, inserted);
        Ok((removed, inserted))
    }

    async fn count_in_range(&self, range: AgeRange) -> Result<u64> {
        let _guard = self.write_lock.lock().await;
        let document = self.load_document().await?;
        Ok(document
            .people
            .iter()
            .filter(|p| range.contains(p.age))
            .count() as u64)
    }

    async fn count_all(&self) -> Result<u64> {
        let _guard = self.write_lock.lock().await;
        Ok(self.load_document().await?.people.len() as u64)
    }

    async fn list(&self) -> Result<Vec<StoredPerson>> {
        let _guard = self.write_lock.lock().await;
        Ok(self.load_document().await?.people)
    }

    async fn age_counts(&self) -> Result<AgeCounts> {
        let _guard = self.write_lock.lock().await;
        let document = self.load_document().await?;
        Ok(AgeCounts::from_ages(document.people.iter().map(|p| p.age)))
    }

    fn describe(&self) -> String {
        self.storage.location(&self.file_name)
    }
}
