use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use crisispulse_server::{api, migrator};
use sea_orm::{Database, DatabaseConnection};
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    crisispulse_server::telemetry::init_telemetry("crisispulse-server");

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    // Database Connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    use sea_orm_migration::MigratorTrait;
    migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    // Initialize Metrics
    crisispulse_server::metrics::init_metrics(&db).await;

    let app = app(db, prometheus_layer, metric_handle);

    let addr = SocketAddr::from(([0, 0, 0, 0], 8000));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn health_check() -> &'static str {
    "OK"
}

fn app(
    db: DatabaseConnection,
    prometheus_layer: axum_prometheus::PrometheusMetricLayer<'static>,
    metric_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Router {
    let auth_routes = Router::new()
        .route("/register", post(api::auth::register))
        .route("/login", post(api::auth::login));

    // Read-only views, no session required.
    let public_routes = Router::new()
        .route(
            "/public/crisis-events/all",
            get(api::crisis_events::list_crisis_events),
        )
        .route(
            "/public/crisis-events/all/previews",
            get(api::crisis_events::list_active_previews),
        )
        .route(
            "/public/crisis-events/inactive/previews",
            get(api::crisis_events::list_inactive_previews),
        )
        .route(
            "/public/crisis-events/search",
            get(api::crisis_events::search_crisis_events),
        )
        .route(
            "/public/crisis-events/:id",
            get(api::crisis_events::get_crisis_event),
        )
        .route(
            "/public/crisis-events/:id/changes",
            get(api::crisis_events::list_crisis_event_changes),
        );

    let protected_routes = Router::new()
        .route(
            "/crisis-events/affecting-me",
            get(api::crisis_events::list_events_affecting_me),
        )
        .route(
            "/crisis-events/affecting-me/previews",
            get(api::crisis_events::list_event_previews_affecting_me),
        )
        .route("/notifications", get(api::notifications::list_notifications))
        .route(
            "/notifications/:id/read",
            post(api::notifications::mark_notification_read),
        )
        .route_layer(axum::middleware::from_fn(api::middleware::auth_middleware));

    let admin_routes = Router::new()
        .route(
            "/admin/crisis-events",
            post(api::crisis_events::create_crisis_event),
        )
        .route(
            "/admin/crisis-events/:id",
            put(api::crisis_events::update_crisis_event),
        )
        .route(
            "/admin/crisis-events/deactivate/:id",
            put(api::crisis_events::deactivate_crisis_event),
        )
        .route_layer(axum::middleware::from_fn(api::middleware::admin_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes)
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(Extension(db))
        .layer(tower_cookies::CookieManagerLayer::new())
        .layer(prometheus_layer)
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    // Dynamic Span Name: "METHOD /path" (e.g., "POST /admin/crisis-events")
                    let span_name = if let Some(path) = matched_path {
                        format!("{} {}", request.method(), path)
                    } else {
                        format!("{} {}", request.method(), request.uri().path())
                    };

                    // Simple IP extraction
                    let user_ip = request
                        .headers()
                        .get("x-forwarded-for")
                        .and_then(|v| v.to_str().ok())
                        .or_else(|| {
                            request
                                .headers()
                                .get("x-real-ip")
                                .and_then(|v| v.to_str().ok())
                        })
                        .unwrap_or("unknown");

                    // Create span with explicit fields for business logic to "fill in" later
                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name, // Override OpenTelemetry Span Name
                        user_ip = user_ip,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        // Fields to be populated by handlers
                        table = tracing::field::Empty,
                        action = tracing::field::Empty,
                        user_id = tracing::field::Empty,
                        event_id = tracing::field::Empty,
                        business_event = tracing::field::Empty,
                        error = tracing::field::Empty,
                        // status and latency recorded later
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(
                    |_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                        // Disable default "started processing request" log to reduce noise
                    },
                )
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));

                        tracing::info!("request completed");
                    },
                ),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(
                    "http://localhost:5173"
                        .parse::<axum::http::HeaderValue>()
                        .unwrap(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::PATCH,
                    axum::http::Method::DELETE,
                ])
                .allow_headers([axum::http::header::CONTENT_TYPE])
                .allow_credentials(true),
        )
        .route("/metrics", get(|| async move { metric_handle.render() }))
}
