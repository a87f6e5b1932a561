use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any client
/// (anonymous or logged-in): the identity gateway (register/login) and the
/// read-only public job board.
///
/// Security Mandate:
/// The job listing here must only ever expose `status = 'active'` postings;
/// that filter is enforced at the Repository level, not per call site.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Service banner. Returns immediately, so it doubles as a liveness
        // check for load balancers.
        .route("/", get(handlers::root))
        // POST /api/auth/register
        // Account creation. Validates password length, rejects duplicate
        // emails, and returns a signed 24-hour bearer token alongside the
        // sanitized user.
        .route("/api/auth/register", post(handlers::register))
        // POST /api/auth/login
        // Credential exchange. A single undifferentiated 401 covers both
        // unknown email and wrong password.
        .route("/api/auth/login", post(handlers::login))
        // GET /api/jobs
        // Lists all active postings, newest first. Anonymous browsing is a
        // product requirement; candidates need no account to look around.
        .route("/api/jobs", get(handlers::list_jobs))
        // GET /api/jobs/{id}
        // Single posting detail.
        .route("/api/jobs/{id}", get(handlers::get_job))
}
