use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Defines the routes reachable only with a valid bearer token. The router
/// layer above this module runs the `AuthUser` extractor for every request,
/// so each handler receives a resolved user id and role; the per-endpoint
/// role and ownership rules then live in the policy module.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /api/auth/me
        // The requester's own sanitized account record.
        .route("/api/auth/me", get(handlers::me))
        // --- Job Management (company/agency) ---
        // POST /api/jobs
        // Submits a posting; owner fields are stamped from the session.
        .route("/api/jobs", post(handlers::create_job))
        // GET /api/my-jobs
        // The requester's postings across every status.
        .route("/api/my-jobs", get(handlers::my_jobs))
        // PUT /api/jobs/{id}
        // Partial update, owner-only. Missing job is 404; foreign job is 403.
        .route("/api/jobs/{id}", put(handlers::update_job))
        // --- Applications ---
        // POST /api/applications
        // Candidate-only. One application per (job, candidate); duplicates
        // are rejected with a conflict.
        .route("/api/applications", post(handlers::create_application))
        // GET /api/my-applications
        // Candidate-only; rows enriched with their referenced job.
        .route("/api/my-applications", get(handlers::my_applications))
        // GET /api/job-applications/{job_id}
        // Poster-only view of a job's inbound applications, enriched with
        // each applicant's sanitized user data.
        .route(
            "/api/job-applications/{job_id}",
            get(handlers::job_applications),
        )
        // PUT /api/applications/{id}
        // Status management by the owner of the targeted job.
        .route("/api/applications/{id}", put(handlers::update_application))
        // --- Agency Roster ---
        // GET/POST /api/agency-candidates
        // Agency-only roster listing (enriched) and creation.
        .route(
            "/api/agency-candidates",
            get(handlers::agency_candidates).post(handlers::create_agency_candidate),
        )
        // --- Dashboards ---
        // GET /api/stats/{role}
        // On-demand reductions over the requester's own rows; each endpoint
        // is gated to its matching role.
        .route("/api/stats/candidate", get(handlers::candidate_stats))
        .route("/api/stats/company", get(handlers::company_stats))
        .route("/api/stats/agency", get(handlers::agency_stats))
}
