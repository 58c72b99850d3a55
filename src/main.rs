use anyhow::Result;
use plugin_translations::config::Config;
use plugin_translations::translator::PluginTranslator;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in CI where inputs come from the environment)
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    let level = if config.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("plugin_translations={}", level).parse()?)
                .add_directive("hyper=warn".parse()?)
                .add_directive("reqwest=warn".parse()?),
        )
        .init();

    info!("Starting plugin translation");

    let cwd = std::env::current_dir()?;
    let mut translator = PluginTranslator::new(&cwd, config)?;
    translator.start().await?;

    info!("Plugin translation done");
    Ok(())
}
