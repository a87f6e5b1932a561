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

// Core services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod policy;
pub mod repository;

// Routing, segregated by access level (public, authenticated).
pub mod routes;
use auth::AuthUser;
use routes::{authenticated, public};

// --- Public Re-exports ---

// The types main.rs and the test suites need by name.
pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use repository::{PostgresRepository, RepositoryState};

/// ApiDoc
///
/// The OpenAPI description of the whole API surface, assembled from every
/// handler annotated with `#[utoipa::path]` and every schema deriving
/// `utoipa::ToSchema`. Served as JSON at `/api-docs/openapi.json` and
/// rendered by the Swagger UI mounted in [`create_router`].
#[derive(OpenApi)]
#[openapi(
    // Every documented handler must be registered here by name.
    paths(
        handlers::root, handlers::register, handlers::login, handlers::me,
        handlers::list_jobs, handlers::get_job, handlers::create_job,
        handlers::my_jobs, handlers::update_job, handlers::create_application,
        handlers::my_applications, handlers::job_applications,
        handlers::update_application, handlers::agency_candidates,
        handlers::create_agency_candidate, handlers::candidate_stats,
        handlers::company_stats, handlers::agency_stats
    ),
    // Request and response schemas referenced by the paths above.
    components(
        schemas(
            models::Role, models::Job, models::Application, models::AgencyCandidate,
            models::RegisterRequest, models::LoginRequest, models::CreateJobRequest,
            models::UpdateJobRequest, models::CreateApplicationRequest,
            models::UpdateApplicationRequest, models::CreateAgencyCandidateRequest,
            models::UserResponse, models::AuthResponse, models::MeResponse,
            models::ApiMessage, models::ApplicationWithJob, models::ApplicationWithCandidate,
            models::RosterEntryResponse, models::CandidateStats, models::CompanyStats,
            models::AgencyStats,
        )
    ),
    tags(
        (name = "job-portal", description = "JobPortal Pro API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The one shared, cloneable container every request handler sees: the
/// persistence layer behind its trait object plus the immutable
/// configuration. Nothing request-scoped lives here.
#[derive(Clone)]
pub struct AppState {
    /// Data access, behind `Arc<dyn Repository>`.
    pub repo: RepositoryState,
    /// Environment configuration, loaded once at startup.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// Lets extractors pull just the piece of state they need; the AuthUser
// extractor depends on both of these.

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// auth_middleware
///
/// Gatekeeper for the `authenticated_routes` group. Running the `AuthUser`
/// extractor here means a request with a missing, malformed, or expired
/// bearer token is answered with a 401 JSON body before any handler code
/// runs; on success the request simply continues down the stack.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Builds the complete router: Swagger UI, the public and bearer-protected
/// route groups, and the outer observability/CORS layers, with the shared
/// state registered for all of them.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Correlation header used by the request-id layers and the trace span.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Swagger UI on top of the generated OpenAPI document.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes carry no middleware of their own.
        .merge(public::public_routes())
        // Authenticated routes sit behind `auth_middleware`.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    // 3. Observability and Correlation Layers (Applied outermost/first)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. A fresh UUID request id for every inbound request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. One tracing span per request, carrying that id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Echo the x-request-id header back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: tags the per-request span with the HTTP
/// method, URI, and the `x-request-id` header so every log line emitted
/// while handling one request shares a correlation id.
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
