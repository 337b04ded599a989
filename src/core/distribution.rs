use crate::domain::model::{AgeBucket, AgeCounts, AgeDistribution};
use crate::domain::ports::RecordStore;
use crate::utils::error::Result;

impl AgeCounts {
    pub fn from_ages<I: IntoIterator<Item = u32>>(ages: I) -> Self {
        let mut counts = AgeCounts::default();
        for age in ages {
            let bucket = AgeBucket::for_age(age);
            counts.set(bucket, counts.get(bucket) + 1);
            counts.total += 1;
        }
        counts
    }
}

/// `round(count / total * 100)`, halves rounded away from zero.
pub fn rounded_percentage(count: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let scaled = (200 * count as u128 + total as u128) / (2 * total as u128);
    scaled as u32
}

impl AgeDistribution {
    /// `None` when there is nothing to report; percentages are rounded
    /// independently and may not add up to 100.
    pub fn from_counts(counts: &AgeCounts) -> Option<Self> {
        if counts.total == 0 {
            return None;
        }
        let pct = |bucket| rounded_percentage(counts.get(bucket), counts.total);
        Some(Self {
            under_20: pct(AgeBucket::Under20),
            age_20_to_40: pct(AgeBucket::From20To40),
            age_40_to_60: pct(AgeBucket::From40To60),
            over_60: pct(AgeBucket::Over60),
            total: counts.total,
        })
    }

    pub fn render_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("{:<12}| {}\n", "Age-Group", "% Distribution"));
        out.push_str(&format!("{:-<12}+{:-<16}\n", "", ""));
        for bucket in AgeBucket::ALL {
            out.push_str(&format!(
                "{:<12}| {}\n",
                bucket.label(),
                self.percentage(bucket)
            ));
        }
        out.push_str(&format!("{:<12}| {} users\n", "Total", self.total));
        out
    }
}

pub struct DistributionAggregator<S: RecordStore> {
    store: S,
}

impl<S: RecordStore> DistributionAggregator<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn counts(&self) -> Result<AgeCounts> {
        let counts = self.store.age_counts().await?;
        tracing::debug!("Age counts from {}: {:?}", self.store.describe(), counts);
        Ok(counts)
    }

    pub async fn compute(&self) -> Result<Option<AgeDistribution>> {
        let counts = self.counts().await?;
        let distribution = AgeDistribution::from_counts(&counts);
        if distribution.is_none() {
            tracing::info!("📭 No stored records, nothing to report");
        }
        Ok(distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_store::MemoryStore;
    use crate::domain::model::{Name, PersonRecord};
    use std::sync::Arc;

    fn person(age: u32) -> PersonRecord {
        PersonRecord {
            name: Name {
                first_name: "Test".to_string(),
                last_name: format!("Age{}", age),
            },
            age,
            address: None,
            additional_info: None,
        }
    }

    #[test]
    fn test_even_split_across_buckets() {
        let counts = AgeCounts::from_ages([10, 25, 45, 70]);
        let dist = AgeDistribution::from_counts(&counts).unwrap();
        assert_eq!(
            dist,
            AgeDistribution {
                under_20: 25,
                age_20_to_40: 25,
                age_40_to_60: 25,
                over_60: 25,
                total: 4,
            }
        );
    }

    #[test]
    fn test_boundary_ages_go_up() {
        let counts = AgeCounts::from_ages([20, 40, 60]);
        assert_eq!(counts.under_20, 0);
        assert_eq!(counts.age_20_to_40, 1);
        assert_eq!(counts.age_40_to_60, 1);
        assert_eq!(counts.over_60, 1);
    }

    #[test]
    fn test_empty_counts_have_no_distribution() {
        assert!(AgeDistribution::from_counts(&AgeCounts::default()).is_none());
    }

    #[test]
    fn test_rounding_is_half_away_from_zero_and_not_normalized() {
        // 1/8 = 12.5% -> 13
        assert_eq!(rounded_percentage(1, 8), 13);
        assert_eq!(rounded_percentage(3, 8), 38);
        assert_eq!(rounded_percentage(2, 3), 67);

        let counts = AgeCounts::from_ages([10, 30, 50]);
        let dist = AgeDistribution::from_counts(&counts).unwrap();
        assert_eq!(dist.under_20, 33);
        assert_eq!(dist.age_20_to_40, 33);
        assert_eq!(dist.age_40_to_60, 33);
        assert_eq!(dist.over_60, 0);
        assert_eq!(dist.under_20 + dist.age_20_to_40 + dist.age_40_to_60, 99);
    }

    #[test]
    fn test_render_table_lists_every_bucket() {
        let dist = AgeDistribution::from_counts(&AgeCounts::from_ages([5, 65])).unwrap();
        let table = dist.render_table();
        assert!(table.starts_with("Age-Group"));
        assert!(table.contains("< 20        | 50"));
        assert!(table.contains("> 60        | 50"));
        assert!(table.contains("20 to 40    | 0"));
        assert!(table.contains("2 users"));
    }

    #[test]
    fn test_aggregator_reads_store_counts() {
        let store = Arc::new(MemoryStore::new());
        tokio_test::block_on(async {
            store
                .bulk_insert(vec![person(10), person(25), person(45), person(70)])
                .await
                .unwrap();
            let aggregator = DistributionAggregator::new(Arc::clone(&store));
            let dist = aggregator.compute().await.unwrap().unwrap();
            assert_eq!(dist.total, 4);
            assert_eq!(dist.over_60, 25);
        });
    }

    // 只實作必要方法，age_counts 走預設的逐區間查詢
    struct RangeOnlyStore(MemoryStore);

    #[async_trait::async_trait]
    impl RecordStore for RangeOnlyStore {
        async fn bulk_insert(&self, records: Vec<PersonRecord>) -> Result<usize> {
            self.0.bulk_insert(records).await
        }
        async fn clear(&self) -> Result<usize> {
            self.0.clear().await
        }
        async fn replace_all(&self, records: Vec<PersonRecord>) -> Result<(usize, usize)> {
            self.0.replace_all(records).await
        }
        async fn count_in_range(&self, range: crate::domain::model::AgeRange) -> Result<u64> {
            self.0.count_in_range(range).await
        }
        async fn count_all(&self) -> Result<u64> {
            self.0.count_all().await
        }
        async fn list(&self) -> Result<Vec<crate::domain::model::StoredPerson>> {
            self.0.list().await
        }
        fn describe(&self) -> String {
            "range-only".to_string()
        }
    }

    #[tokio::test]
    async fn test_default_age_counts_uses_range_queries() {
        let store = RangeOnlyStore(MemoryStore::new());
        store
            .bulk_insert(vec![person(19), person(20), person(59), person(60), person(61)])
            .await
            .unwrap();

        let counts = DistributionAggregator::new(store).counts().await.unwrap();
        assert_eq!(counts, AgeCounts::from_ages([19, 20, 59, 60, 61]));
    }

    #[tokio::test]
    async fn test_aggregator_on_empty_store_returns_none() {
        let aggregator = DistributionAggregator::new(MemoryStore::new());
        assert!(aggregator.compute().await.unwrap().is_none());
    }
}
