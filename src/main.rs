use clap::Parser;
use site_forms::utils::{logger, validation::Validate};
use site_forms::{CliConfig, FormSettings, HeadlessDriver, PageFixture, ReqwestTransport};

async fn run(config: &CliConfig) -> site_forms::Result<String> {
    let settings = match &config.config {
        Some(path) => FormSettings::from_file(path)?,
        None => FormSettings::default(),
    };
    settings.validate()?;

    let page = PageFixture::from_file(&config.page)?.build()?;
    let transport = ReqwestTransport::from_settings(&settings.http)?;

    let mut driver = HeadlessDriver::new(page, transport, settings);
    let outcomes = driver.run(&config.steps).await?;
    for outcome in &outcomes {
        tracing::info!("Submission finished: {:?}", outcome);
    }

    Ok(serde_json::to_string_pretty(&driver.page().snapshot())?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    // 初始化日誌
    if config.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(config.verbose);
    }

    tracing::info!("Starting site-forms driver");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    match run(&config).await {
        Ok(snapshot) => {
            println!("{}", snapshot);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Driver failed: {}", e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            Err(e.into())
        }
    }
}
