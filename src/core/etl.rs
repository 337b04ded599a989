use crate::core::{LoadSummary, Pipeline};
use crate::utils::error::Result;
use crate::utils::monitor::PhaseMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: PhaseMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: PhaseMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<LoadSummary> {
        tracing::info!("🚀 Starting CSV import...");
        self.monitor.record("start");

        // Extract
        tracing::info!("📥 Extracting CSV...");
        let raw = self.pipeline.extract().await?;
        tracing::info!("📥 Read {} bytes", raw.len());
        self.monitor.record("extract");

        // Transform
        tracing::info!("🔄 Building records...");
        let records = self.pipeline.transform(raw).await.inspect_err(|e| {
            tracing::warn!("🔄 Batch rejected, nothing will be stored: {}", e);
        })?;
        tracing::info!("🔄 Built {} records", records.len());
        self.monitor.record("transform");

        // Load
        tracing::info!("💾 Loading records...");
        let summary = self.pipeline.load(records).await?;
        tracing::info!(
            "💾 Stored {} records in {}",
            summary.inserted,
            summary.destination
        );
        self.monitor.record("load");
        self.monitor.log_final_stats();

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PersonRecord;
    use crate::domain::model::Name;
    use crate::utils::error::EtlError;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct MockPipeline {
        raw: String,
        loaded: AtomicBool,
    }

    impl MockPipeline {
        fn new(raw: &str) -> Self {
            Self {
                raw: raw.to_string(),
                loaded: AtomicBool::new(false),
            }
        }
    }

    #[async_trait::async_trait]
    impl Pipeline for MockPipeline {
        async fn extract(&self) -> Result<String> {
            Ok(self.raw.clone())
        }

        async fn transform(&self, raw: String) -> Result<Vec<PersonRecord>> {
            if raw.is_empty() {
                return Err(EtlError::malformed("empty"));
            }
            Ok(vec![PersonRecord {
                name: Name {
                    first_name: raw,
                    last_name: "Doe".to_string(),
                },
                age: 30,
                address: None,
                additional_info: None,
            }])
        }

        async fn load(&self, records: Vec<PersonRecord>) -> Result<LoadSummary> {
            self.loaded.store(true, Ordering::SeqCst);
            Ok(LoadSummary {
                inserted: records.len(),
                cleared: None,
                destination: "mock".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_run_executes_all_phases() {
        let engine = EtlEngine::new(MockPipeline::new("Jane"));
        let summary = engine.run().await.unwrap();
        assert_eq!(summary.inserted, 1);
        assert!(engine.pipeline.loaded.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_transform_failure_skips_load() {
        let engine = EtlEngine::new_with_monitoring(MockPipeline::new(""), false);
        assert!(matches!(
            engine.run().await,
            Err(EtlError::MalformedInput { .. })
        ));
        assert!(!engine.pipeline.loaded.load(Ordering::SeqCst));
    }
}
