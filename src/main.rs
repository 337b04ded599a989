use clap::Parser;
use people_etl::config::toml_config::TomlConfig;
use people_etl::config::Command;
use people_etl::core::{Pipeline, RecordStore};
use people_etl::utils::error::{EtlError, ErrorSeverity};
use people_etl::utils::{logger, validation::Validate};
use people_etl::{
    CliConfig, CsvImportPipeline, DistributionAggregator, EtlEngine, JsonFileStore, LocalStorage,
    Settings,
};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_logger(cli.log_format, cli.verbose);

    tracing::info!("Starting people-etl");
    tracing::debug!("CLI config: {:?}", cli);

    let file_config = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path).and_then(|c| c.validate().map(|_| c)) {
                Ok(config) => Some(config),
                Err(e) => exit_with(&e),
            }
        }
        None => None,
    };

    let settings = Settings::resolve(&cli, file_config.as_ref());
    let validation = settings.validate().and_then(|_| {
        if cli.command.reads_csv() {
            settings.validate_csv_source()
        } else {
            Ok(())
        }
    });
    if let Err(e) = validation {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }
    tracing::debug!("Effective settings: {:?}", settings);

    if let Err(e) = run(cli.command, settings).await {
        tracing::error!(
            "❌ people-etl failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        exit_with(&e);
    }

    Ok(())
}

async fn run(command: Command, settings: Settings) -> people_etl::Result<()> {
    let store = Arc::new(JsonFileStore::new(
        LocalStorage::new(settings.store_path.clone()),
        settings.store_file.clone(),
    ));

    let pipeline = CsvImportPipeline::new(
        LocalStorage::new(String::new()),
        Arc::clone(&store),
        settings.clone(),
    );

    match command {
        Command::Parse => {
            let users = pipeline.transform(pipeline.extract().await?).await?;
            let body = serde_json::json!({
                "message": "CSV parsed successfully",
                "totalUsers": users.len(),
                "users": users,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        Command::Import { .. } => {
            let engine = EtlEngine::new_with_monitoring(pipeline, settings.monitor);
            let summary = engine.run().await?;

            tracing::info!("✅ Import completed successfully!");
            println!("✅ Imported {} users into {}", summary.inserted, summary.destination);
            print_report(store, false).await?;
        }
        Command::Report { json } => print_report(store, json).await?,
        Command::Clear => {
            let removed = store.clear().await?;
            println!("🧹 Removed {} users from {}", removed, store.describe());
        }
    }

    Ok(())
}

async fn print_report<S: RecordStore>(store: S, json: bool) -> people_etl::Result<()> {
    let aggregator = DistributionAggregator::new(store);
    match aggregator.compute().await? {
        Some(distribution) if json => {
            println!("{}", serde_json::to_string_pretty(&distribution)?)
        }
        Some(distribution) => print!("{}", distribution.render_table()),
        None if json => println!("null"),
        None => println!("No users stored yet."),
    }
    Ok(())
}

fn exit_with(e: &EtlError) -> ! {
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
