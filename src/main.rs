use std::sync::Arc;

use http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use coursehub::adapters::http::{app_router, AppState, Repositories, StoreSettings};
use coursehub::adapters::mercadopago::MercadoPagoGateway;
use coursehub::adapters::TracingEventPublisher;
use coursehub::application::handlers::{spawn_maintenance, MaintenanceHandler};
use coursehub::config::{load_dotenv, AppConfig, ServerConfig};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let dotenv = load_dotenv();
    let config = AppConfig::from_env()?;
    init_tracing(&config.server);
    if let Err(e) = dotenv {
        tracing::warn!(error = %e, "Ignoring unreadable .env file");
    }
    config.validate()?;

    if config.payment.is_test_mode() {
        tracing::warn!("Mercado Pago test credentials in use");
    }
    if config.payment.webhook_secret.is_none() {
        tracing::warn!("No webhook secret configured, notification signatures are not checked");
    }

    let repositories = match &config.database {
        Some(database) => {
            let pool = database.connect().await?;
            if database.run_migrations {
                sqlx::migrate!("./migrations").run(&pool).await?;
                tracing::info!("Database migrations applied");
            }
            Repositories::postgres(pool)
        }
        None => {
            tracing::warn!("No database configured, using in-memory storage");
            Repositories::in_memory()
        }
    };

    let event_publisher = Arc::new(TracingEventPublisher::new());
    let gateway = Arc::new(MercadoPagoGateway::new(config.payment.gateway_config()));
    let settings = StoreSettings {
        currency: config.store.currency.clone(),
        refund_policy: config.store.refund_policy(),
        require_live_mode: config.payment.require_live_mode,
    };

    let maintenance = Arc::new(MaintenanceHandler::new(
        repositories.payments.clone(),
        repositories.enrollments.clone(),
        repositories.webhook_events.clone(),
        event_publisher.clone(),
        config.store.maintenance_settings(),
    ));
    let maintenance_task = spawn_maintenance(maintenance, config.store.maintenance_interval());

    let state = AppState::new(
        repositories,
        gateway,
        event_publisher,
        settings,
        config.payment.signature_verifier(),
    );

    let request_id = HeaderName::from_static("x-request-id");
    let app = app_router(state)
        .layer(cors_layer(&config.server)?)
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid));

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "CourseHub listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    maintenance_task.abort();
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.as_str()));

    let registry = tracing_subscriber::registry().with(filter);
    if server.log_json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn cors_layer(server: &ServerConfig) -> Result<CorsLayer, BoxError> {
    let origins = server.cors_origins_list();
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    if origins.is_empty() {
        return Ok(layer.allow_origin(Any));
    }
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}
