use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Request},
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{auth, booking, health, property};
use tower_http::{
    classify::ServerErrorsFailureClass,
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{info_span, Span, error, info, warn};
use uuid::Uuid;

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match HeaderValue::from_str(origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            warn!("CORS_ORIGIN {:?} is not a valid header value; cross-origin requests will be refused", origin);
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

pub fn create_router(state: Arc<AppState>) -> Router {
    let upload_prefix = format!("/{}", state.config.upload_url_prefix.trim_matches('/'));
    let uploads = ServeDir::new(&state.config.upload_dir);
    let body_limit = state.config.max_upload_bytes;
    let cors = cors_layer(&state.config.cors_origin);

    Router::new()
        .route("/health", get(health::health_check))

        // Identity
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/me", get(auth::me))

        // Catalog
        .route("/api/v1/properties", get(property::list_properties).post(property::create_property))
        .route("/api/v1/properties/mine", get(property::my_properties))
        .route("/api/v1/properties/{id}", get(property::get_property).put(property::update_property).delete(property::delete_property))
        .route("/api/v1/properties/{id}/quote", get(property::quote_property))

        // Ledger
        .route("/api/v1/bookings", post(booking::create_booking))
        .route("/api/v1/bookings/mine", get(booking::my_bookings))
        .route("/api/v1/bookings/for-my-properties", get(booking::bookings_for_my_properties))
        .route("/api/v1/bookings/{id}/status", patch(booking::update_booking_status))

        // Legacy owner aliases
        .route("/api/v1/owner/properties", get(property::my_properties))
        .route("/api/v1/owner/bookings", get(booking::bookings_for_my_properties))

        .nest_service(&upload_prefix, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
