use crate::domain::model::{AgeCounts, AgeRange, PersonRecord, StoredPerson};
use crate::domain::ports::RecordStore;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct MemoryState {
    rows: Vec<StoredPerson>,
    last_id: u64,
}

/// Process-local store; contents are lost when it is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryState {
    fn append(&mut self, records: Vec<PersonRecord>) -> usize {
        let imported_at = Utc::now();
        let first_id = self.last_id + 1;

        let staged: Vec<StoredPerson> = records
            .into_iter()
            .zip(first_id..)
            .map(|(record, id)| StoredPerson::from_record(id, record, imported_at))
            .collect();

        let inserted = staged.len();
        self.last_id += inserted as u64;
        self.rows.extend(staged);
        inserted
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn bulk_insert(&self, records: Vec<PersonRecord>) -> Result<usize> {
        Ok(self.state.write().await.append(records))
    }

    async fn clear(&self) -> Result<usize> {
        let mut state = self.state.write().await;
        let removed = state.rows.len();
        state.rows.clear();
        Ok(removed)
    }

    async fn replace_all(&self, records: Vec<PersonRecord>) -> Result<(usize, usize)> {
        let mut state = self.state.write().await;
        let removed = state.rows.len();
        state.rows.clear();
        Ok((removed, state.append(records)))
    }

    async fn count_in_range(&self, range: AgeRange) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.rows.iter().filter(|p| range.contains(p.age)).count() as u64)
    }

    async fn count_all(&self) -> Result<u64> {
        Ok(self.state.read().await.rows.len() as u64)
    }

    async fn list(&self) -> Result<Vec<StoredPerson>> {
        Ok(self.state.read().await.rows.clone())
    }

    async fn age_counts(&self) -> Result<AgeCounts> {
        let state = self.state.read().await;
        Ok(AgeCounts::from_ages(state.rows.iter().map(|p| p.age)))
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
