use anyhow::Context;
use vitrine_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load Vitrine settings")?;
    vitrine_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        media = %settings.media.base_url,
        "vitrine-app bootstrap starting"
    );

    vitrine_app::run(settings).await
}
