pub mod distribution;
pub mod etl;
pub mod nested;
pub mod record_builder;

pub use crate::domain::model::{AgeDistribution, LoadSummary, PersonRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RecordStore, Storage};
pub use crate::utils::error::Result;
