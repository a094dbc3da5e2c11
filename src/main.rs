use anyhow::Context;
use api_lambda::adapters::store::DEFAULT_VERSION;
use api_lambda::app::version;
use api_lambda::utils::{logger, validation::Validate};
use api_lambda::{ApiHandler, CliConfig, InMemoryVersionStore, InvocationContext, TomlConfig};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    let file_config = match &config.config {
        Some(path) => Some(
            TomlConfig::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?,
        ),
        None => None,
    };

    // 初始化日誌
    let verbose = config.verbose || file_config.as_ref().is_some_and(TomlConfig::verbose);
    logger::init_cli_logger(verbose);

    tracing::info!("Starting api-lambda local invoke");
    if verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }
    if let Some(file_config) = &file_config {
        file_config.validate().context("invalid configuration file")?;
    }

    // 設定檔取代預設值，明確給的 CLI 旗標再覆寫設定檔
    let (api_config, initial_version, monitor) = match &file_config {
        Some(file) => (
            config.apply_to(file.api_config()),
            config.initial_version_or(&file.app.initial_version),
            config.monitor || file.invocation_metrics(),
        ),
        None => (
            config.api_config(),
            config.initial_version_or(DEFAULT_VERSION),
            config.monitor,
        ),
    };
    api_config
        .cors
        .validate()
        .context("invalid CORS configuration")?;

    let store = Arc::new(InMemoryVersionStore::new(initial_version));
    let router = version::router(store)?;
    let handler = ApiHandler::new(router, api_config).with_monitoring(monitor);

    let events = if config.event.is_empty() {
        vec![config.inline_event()?]
    } else {
        config
            .event
            .iter()
            .map(|path| {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                serde_json::from_str::<serde_json::Value>(&raw)
                    .with_context(|| format!("{} is not valid JSON", path.display()))
            })
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    for (i, event) in events.into_iter().enumerate() {
        let context = InvocationContext::new(format!("local-{}", i + 1));
        let response = handler.handle_value(event, &context).await;
        println!("{}", serde_json::to_string_pretty(&response)?);
    }

    Ok(())
}
