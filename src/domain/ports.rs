use crate::domain::model::{AgeBucket, AgeCounts, AgeRange, LoadSummary, PersonRecord, StoredPerson};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn csv_path(&self) -> &str;
    fn clear_before_import(&self) -> bool;
}

/// Persistence capability the import pipeline and the aggregator depend on.
///
/// `bulk_insert` and `replace_all` must be atomic: either every record is
/// committed or the store is left exactly as it was.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn bulk_insert(&self, records: Vec<PersonRecord>) -> Result<usize>;
    async fn clear(&self) -> Result<usize>;

    /// Clears and inserts in one commit. Returns `(removed, inserted)`.
    async fn replace_all(&self, records: Vec<PersonRecord>) -> Result<(usize, usize)>;

    async fn count_in_range(&self, range: AgeRange) -> Result<u64>;
    async fn count_all(&self) -> Result<u64>;
    async fn list(&self) -> Result<Vec<StoredPerson>>;

    /// Per-bucket counts plus the total. Stores that can read a single
    /// snapshot should override this so the total always matches the buckets.
    async fn age_counts(&self) -> Result<AgeCounts> {
        let mut counts = AgeCounts {
            total: self.count_all().await?,
            ..Default::default()
        };
        for bucket in AgeBucket::ALL {
            counts.set(bucket, self.count_in_range(bucket.range()).await?);
        }
        Ok(counts)
    }

    fn describe(&self) -> String;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for std::sync::Arc<T> {
    async fn bulk_insert(&self, records: Vec<PersonRecord>) -> Result<usize> {
        (**self).bulk_insert(records).await
    }

    async fn clear(&self) -> Result<usize> {
        (**self).clear().await
    }

    async fn replace_all(&self, records: Vec<PersonRecord>) -> Result<(usize, usize)> {
        (**self).replace_all(records).await
    }

    async fn count_in_range(&self, range: AgeRange) -> Result<u64> {
        (**self).count_in_range(range).await
    }

    async fn count_all(&self) -> Result<u64> {
        (**self).count_all().await
    }

    async fn list(&self) -> Result<Vec<StoredPerson>> {
        (**self).list().await
    }

    async fn age_counts(&self) -> Result<AgeCounts> {
        (**self).age_counts().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<String>;
    async fn transform(&self, raw: String) -> Result<Vec<PersonRecord>>;
    async fn load(&self, records: Vec<PersonRecord>) -> Result<LoadSummary>;
}
