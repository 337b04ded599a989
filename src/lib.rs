pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::{cli::LocalStorage, Settings};

pub use adapters::{JsonFileStore, MemoryStore};
pub use app::pipelines::CsvImportPipeline;
pub use crate::core::{
    distribution::DistributionAggregator, etl::EtlEngine, record_builder::parse_csv,
};
pub use domain::model::{AgeDistribution, PersonRecord};
pub use utils::error::{EtlError, Result};
