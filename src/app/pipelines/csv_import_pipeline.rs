use crate::core::record_builder::parse_csv;
use crate::core::{ConfigProvider, LoadSummary, PersonRecord, Pipeline, RecordStore, Storage};
use crate::utils::error::{EtlError, Result};

/// CSV file → person records → record store.
pub struct CsvImportPipeline<S: Storage, R: RecordStore, C: ConfigProvider> {
    pub(crate) source: S,
    pub(crate) store: R,
    pub(crate) config: C,
}

impl<S: Storage, R: RecordStore, C: ConfigProvider> CsvImportPipeline<S, R, C> {
    pub fn new(source: S, store: R, config: C) -> Self {
        Self {
            source,
            store,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, R: RecordStore, C: ConfigProvider> Pipeline for CsvImportPipeline<S, R, C> {
    async fn extract(&self) -> Result<String> {
        let path = self.config.csv_path();
        tracing::debug!("Reading CSV from: {}", self.source.location(path));

        let bytes = self.source.read_file(path).await.map_err(|e| match e {
            EtlError::IoError(io) if io.kind() == std::io::ErrorKind::NotFound => {
                EtlError::IoError(std::io::Error::new(
                    io.kind(),
                    format!("CSV file not found: {}", self.source.location(path)),
                ))
            }
            other => other,
        })?;

        String::from_utf8(bytes)
            .map_err(|e| EtlError::malformed(format!("CSV is not valid UTF-8: {}", e)))
    }

    async fn transform(&self, raw: String) -> Result<Vec<PersonRecord>> {
        parse_csv(&raw)
    }

    async fn load(&self, records: Vec<PersonRecord>) -> Result<LoadSummary> {
        // 清除與匯入需一起成功或一起失敗
        let (cleared, inserted) = if self.config.clear_before_import() {
            let (removed, inserted) = self.store.replace_all(records).await?;
            tracing::info!("🧹 Cleared {} stored users before import", removed);
            (Some(removed), inserted)
        } else {
            (None, self.store.bulk_insert(records).await?)
        };

        Ok(LoadSummary {
            inserted,
            cleared,
            destination: self.store.describe(),
        })
    }
}
