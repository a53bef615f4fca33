use anyhow::Context;

use putaway_infra::{DecisionOrchestrator, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    putaway_observability::init();

    let config = EngineConfig::from_env().context("invalid configuration")?;
    let engine = DecisionOrchestrator::from_config(&config).context("failed to build decision engine")?;
    if !engine.reasoning_enabled() {
        tracing::warn!("reasoning service disabled; multi-zone decisions will use the fallback policy");
    }

    let app = putaway_api::app::build_app(engine);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
