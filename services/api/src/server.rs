use crate::cli::ServeArgs;
use crate::infra::{cors_layer, shutdown_signal, token_registry, AppState};
use crate::routes::with_portal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_portal::config::{AppConfig, ConfigError, StoreBackend};
use job_portal::error::AppError;
use job_portal::portal::{ApplicationRepository, JobPortalService, JobRepository, TokenRegistry};
use job_portal::store::{InMemoryApplicationRepository, InMemoryJobRepository, MongoStore};
use job_portal::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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
    if let Some(backend) = args.store.take() {
        config.store.backend = backend;
        config.store.validate()?;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let tokens = Arc::new(token_registry(&config.auth));
    if !tokens.is_enabled() {
        warn!("APP_AUTH_TOKENS is empty; every route accepts unauthenticated writes");
    }

    match config.store.backend {
        StoreBackend::Memory => {
            let service = JobPortalService::new(
                Arc::new(InMemoryJobRepository::default()),
                Arc::new(InMemoryApplicationRepository::default()),
            );
            serve(&config, service, tokens).await
        }
        StoreBackend::Mongo => {
            let uri = config
                .store
                .mongodb_uri
                .as_deref()
                .ok_or(ConfigError::MissingMongoUri)?;
            let store = MongoStore::connect(uri, &config.store.database).await?;
            store.ping().await?;
            store.ensure_indexes().await?;
            info!(database = %config.store.database, "connected to document store");

            let service = JobPortalService::new(Arc::new(store.jobs()), Arc::new(store.applications()));
            serve(&config, service, tokens).await
        }
    }
}

async fn serve<J, A>(
    config: &AppConfig,
    service: JobPortalService<J, A>,
    tokens: Arc<TokenRegistry>,
) -> Result<(), AppError>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_portal_routes(Arc::new(service), tokens)
        .layer(Extension(app_state))
        .layer(prometheus_layer)
        .layer(cors_layer());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        store = ?config.store.backend,
        %addr,
        "job portal ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("job portal stopped");
    Ok(())
}
