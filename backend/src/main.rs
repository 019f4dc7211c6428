use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use leavedesk_backend::{
    config::Config,
    db::connection::{create_pool, run_migrations},
    docs::ApiDoc,
    handlers,
    middleware::{log_error_responses, request_id},
    models::leave_type::LeaveType,
    repositories::{LeaveStore, MemoryLeaveStore, PgLeaveStore},
    state::AppState,
    types::LeaveTypeCode,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leavedesk_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        store = if config.database_url.is_some() {
            "postgres"
        } else {
            "memory"
        },
        time_zone = %config.time_zone,
        "Loaded configuration from environment/.env"
    );

    // Initialize storage
    let store: Arc<dyn LeaveStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            Arc::new(PgLeaveStore::new(pool))
        }
        None => {
            // The memory store starts empty; give it the same leave type
            // catalogue the migrations seed.
            let store = MemoryLeaveStore::new();
            seed_leave_types(&store).await?;
            Arc::new(store)
        }
    };
    let state = AppState::new(store, config);

    let api_routes = Router::new()
        .route(
            "/api/employees",
            post(handlers::employees::register_employee),
        )
        .route("/api/employees/{id}", get(handlers::employees::get_employee))
        .route(
            "/api/employees/{id}/balance",
            get(handlers::employees::get_employee_balance),
        )
        .route(
            "/api/requests",
            post(handlers::requests::create_leave_request)
                .get(handlers::requests::list_leave_requests),
        )
        .route(
            "/api/requests/preview",
            get(handlers::requests::preview_leave_request),
        )
        .route(
            "/api/requests/{id}",
            get(handlers::requests::get_leave_request),
        )
        .route(
            "/api/requests/{id}/decisions",
            get(handlers::requests::get_request_decisions),
        )
        .route(
            "/api/requests/{id}/approve",
            put(handlers::requests::approve_leave_request),
        )
        .route(
            "/api/requests/{id}/reject",
            put(handlers::requests::reject_leave_request),
        )
        .route(
            "/api/requests/{id}/cancel",
            put(handlers::requests::cancel_leave_request),
        )
        .route(
            "/api/admin/leave-types",
            get(handlers::admin::list_leave_types).post(handlers::admin::create_leave_type),
        )
        .route("/api/admin/balances", put(handlers::admin::grant_balance));

    // Compose app with shared layers (CORS/Trace) and shared state
    let app = Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/api/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                )
                .layer(axum_middleware::from_fn(request_id))
                .layer(axum_middleware::from_fn(log_error_responses)),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn seed_leave_types(store: &MemoryLeaveStore) -> anyhow::Result<()> {
    let defaults = [
        ("AL", "Annual leave", None),
        ("CL", "Casual leave", Some(5)),
        ("SL", "Sick leave", Some(10)),
    ];
    for (code, description, cap) in defaults {
        let leave_type = LeaveType::new(
            LeaveTypeCode::from(code),
            description.to_string(),
            cap,
            chrono::Utc::now(),
        );
        store.insert_leave_type(&leave_type).await?;
    }
    Ok(())
}
