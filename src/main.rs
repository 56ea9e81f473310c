//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here; identity changes are handled by SessionSupervisor.

use dotenv::dotenv;
use pulseboard::adapters::analytics::{HttpAnalyticsGateway, MockAnalyticsGateway};
use pulseboard::adapters::identity::WatchIdentityBinding;
use pulseboard::adapters::ui::ConsoleInputPort;
use pulseboard::domain::UserId;
use pulseboard::ports::{AnalyticsGateway, IdentityPort, InputPort};
use pulseboard::shared::config::{AppConfig, PLACEHOLDER_TOKEN};
use pulseboard::usecases::{ChatSessionManager, DashboardAggregator, SessionSupervisor};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    let cfg = AppConfig::load().unwrap_or_default();

    // --- Identity binding (seeded from config; console can switch users later) ---
    let identity = Arc::new(WatchIdentityBinding::new(
        cfg.user_id.clone().map(UserId),
        cfg.api_token.clone(),
    ));
    let identity_port: Arc<dyn IdentityPort> = identity.clone();

    // Anonymous calls use the fallback identifier, unless disabled.
    let fallback_user = cfg
        .allow_anonymous_or_default()
        .then(|| cfg.fallback_user_or_default());

    // --- Backend gateway (HTTP, or canned mock when requested) ---
    let gateway: Arc<dyn AnalyticsGateway> = if cfg.use_mock_backend() {
        warn!("PULSEBOARD_USE_MOCK_BACKEND set; using canned mock backend");
        Arc::new(MockAnalyticsGateway::new())
    } else {
        let api_url = cfg.api_url_or_default();
        info!(url = %api_url, "using HTTP analytics backend");
        Arc::new(
            HttpAnalyticsGateway::new(
                api_url,
                Arc::clone(&identity_port),
                PLACEHOLDER_TOKEN.to_string(),
                fallback_user,
                Duration::from_secs(cfg.request_timeout_secs_or_default()),
            )
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        )
    };

    // Startup reachability probe. Failure is logged, never fatal.
    if let Err(e) = gateway.health().await {
        warn!(error = %e, "analytics backend unreachable at startup");
    }

    // --- State owners ---
    let chat = Arc::new(ChatSessionManager::new(Arc::clone(&gateway)));
    let dashboard = Arc::new(DashboardAggregator::new(Arc::clone(&gateway)));

    // --- Supervisor: identity changes reset both owners and re-trigger loads ---
    let supervisor = Arc::new(SessionSupervisor::new(
        identity_port,
        Arc::clone(&chat),
        Arc::clone(&dashboard),
    ));
    tokio::spawn({
        let supervisor = Arc::clone(&supervisor);
        async move { supervisor.run_loop().await }
    });

    // --- Run (main menu -> Chat / Dashboard / Best times / Upload / Switch user) ---
    let input_port: Arc<dyn InputPort> = Arc::new(ConsoleInputPort::new(
        chat,
        dashboard,
        gateway,
        identity,
    ));
    input_port.run().await.map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
