pub mod csv_import_pipeline;

pub use csv_import_pipeline::CsvImportPipeline;
