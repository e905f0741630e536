use crate::cli::ServeArgs;
use crate::demo::seed_marketplace;
use crate::infra::{AppState, InMemoryIdentityProvider, InMemoryMarketplaceStore};
use crate::routes::with_marketplace_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use saba_rentals::config::AppConfig;
use saba_rentals::error::AppError;
use saba_rentals::marketplace::MarketplaceService;
use saba_rentals::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(InMemoryMarketplaceStore::default());
    let provider = Arc::new(InMemoryIdentityProvider::default());
    let service = Arc::new(MarketplaceService::new(
        store.clone(),
        provider.clone(),
        config.session.ttl(),
    ));

    if args.seed {
        match seed_marketplace(&service, store.as_ref(), provider.as_ref()) {
            Ok(summary) => info!(
                listings = summary.listings,
                landlords = summary.landlords,
                "demo data seeded"
            ),
            Err(error) => warn!(%error, "demo seed failed"),
        }
    }

    let app = with_marketplace_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "rental marketplace service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
