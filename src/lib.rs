use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Domain, persistence, and transport pieces.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod service;
pub mod store;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::AuthUser; // The resolved authenticated caller identity.
use routes::{authenticated, public};

// --- Public Re-exports ---

// Shortcuts for the entry point and the test suites.
pub use config::AppConfig;
pub use error::FeedError;
pub use service::{LikeToggle, PostService};
pub use store::{MemoryStore, PostgresStore, StoreState};

/// ApiDoc
///
/// Collects every `#[utoipa::path]` handler and `ToSchema` model into one
/// OpenAPI document. The generated JSON sits at `/api-docs/openapi.json` and
/// feeds the Swagger UI mounted in `create_router`.
#[derive(OpenApi)]
#[openapi(
    // Handlers to document. A route missing here still serves, but silently.
    paths(
        handlers::create_post, handlers::get_posts, handlers::get_post,
        handlers::delete_post, handlers::like_post, handlers::unlike_post
    ),
    // Wire schemas referenced by the handler annotations above.
    components(
        schemas(
            models::Post, models::Like, models::CreatePostRequest, models::ApiMessage,
        )
    ),
    tags(
        (name = "chorus", description = "Social feed API: posts, visibility, likes")
    )
)]
struct ApiDoc;

/// AppState
///
/// The one container every request handler clones from: both services plus
/// the loaded configuration. Nothing in it is mutable after startup, so
/// sharing it across requests needs no further synchronization.
#[derive(Clone)]
pub struct AppState {
    /// Post lifecycle: creation, visibility-filtered reads, owner deletion.
    pub posts: PostService,
    /// Like membership: the like/unlike pair with its duplicate guards.
    pub likes: LikeToggle,
    /// The immutable environment configuration.
    pub config: AppConfig,
}

impl AppState {
    /// Builds the unified state over one shared store handle, so both
    /// services observe the same data.
    pub fn new(store: StoreState, config: AppConfig) -> Self {
        Self {
            posts: PostService::new(store.clone()),
            likes: LikeToggle::new(store),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Lets extractors pull just the slice of AppState they need.
// `AuthUser` reads the configuration and nothing else.

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gate for the authenticated route group.
///
/// The work is entirely in the `AuthUser` parameter: the extractor runs
/// before this body, and its 401 rejection short-circuits the request, so a
/// handler behind this layer never executes for an unidentified caller. The
/// body just forwards.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Builds the full route table, wires the middleware stack around it, and
/// attaches the shared state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS
    // Wide open: any origin, method, and header may reach the API.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Correlation header name, shared by the set and propagate layers below.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Route Table
    let base_router = Router::new()
        // Swagger UI plus the OpenAPI JSON it renders.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Anonymous endpoints, no guard.
        .merge(public::public_routes())
        // The feed surface, gated by auth_middleware. route_layer keeps the
        // guard off the public group merged above.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    // 3. Correlation and Tracing (outermost, so every request is covered)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Mint a UUID into x-request-id for each incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Span the whole request/response lifecycle. The custom
                // span maker carries the request id minted above.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Copy x-request-id onto the response for the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS, applied around everything else.
        .layer(cors)
}

/// trace_span_logger
///
/// Span maker for `TraceLayer`. Reads the `x-request-id` header set by the
/// layer before it and records it next to the method and URI, so every log
/// line emitted while handling a request shares one correlation id.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
