pub mod pet;

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, HeaderValue, Method, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ERRORS_HEADER;
use crate::security::{self, Authenticator, RoleGate, OWNER_ADMIN};
use crate::service::SharedClinicService;

async fn health_check() -> &'static str {
    "OK"
}

/// Pet routes, gated on `OWNER_ADMIN` when an authenticator is supplied.
pub fn pet_routes(authenticator: Option<Authenticator>) -> Router {
    let routes = Router::new()
        .route("/api/pets", get(pet::list_pets))
        .route("/api/pets/", post(pet::create_pet))
        .route("/api/pets/pettypes", get(pet::list_pet_types))
        .route(
            "/api/pets/:pet_id",
            get(pet::get_pet)
                .put(pet::update_pet)
                .delete(pet::delete_pet),
        );

    match authenticator {
        Some(authenticator) => routes
            .route_layer(middleware::from_fn_with_state(
                RoleGate::has_role(OWNER_ADMIN),
                security::require_role,
            ))
            .route_layer(middleware::from_fn_with_state(
                authenticator,
                security::authenticate,
            )),
        None => routes,
    }
}

/// Browsers may read the `errors` header only if it is exposed.
pub fn cors_layer(allowed_origin: Option<&HeaderValue>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([ERRORS_HEADER, header::CONTENT_TYPE]);

    match allowed_origin {
        Some(origin) => layer.allow_origin(origin.clone()),
        None => layer.allow_origin(tower_http::cors::Any),
    }
}

/// "METHOD /route", e.g. "PUT /api/pets/:pet_id"; the raw path when no
/// route matched.
fn span_name(request: &Request<Body>) -> String {
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|matched| matched.as_str())
        .unwrap_or_else(|| request.uri().path());
    format!("{} {}", request.method(), path)
}

fn request_span(request: &Request<Body>) -> tracing::Span {
    tracing::info_span!(
        "request",
        "otel.name" = span_name(request),
        method = %request.method(),
        uri = %request.uri(),
        // filled in by middleware and handlers
        table = tracing::field::Empty,
        action = tracing::field::Empty,
        user = tracing::field::Empty,
        pet_id = tracing::field::Empty,
        business_event = tracing::field::Empty,
        error = tracing::field::Empty,
        status = tracing::field::Empty,
    )
}

pub fn app(
    clinic: SharedClinicService,
    authenticator: Option<Authenticator>,
    cors: CorsLayer,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(pet_routes(authenticator))
        .layer(Extension(clinic))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(request_span)
                .on_request(())
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", response.status().as_u16());
                        tracing::info!(latency_ms = latency.as_millis() as u64, "request completed");
                    },
                ),
        )
        .layer(cors)
}
