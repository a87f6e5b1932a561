mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use common::{sample_job_request, seed_user, test_state};
use job_portal::{create_router, models::Role};
use serde_json::{Value, json};
use tower::ServiceExt;

// --- Harness ---

/// Drives one request through the full router stack (request-id, trace,
/// auth middleware, handler) and returns status + parsed JSON body.
async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

async fn register(app: &Router, email: &str, role: &str) -> (Value, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": email,
            "password": "secret99",
            "name": "Pat",
            "role": role,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "register failed: {body}");
    let token = body["token"].as_str().unwrap().to_string();
    (body["user"].clone(), token)
}

// --- Smoke ---

#[tokio::test]
async fn test_root_banner() {
    let (_repo, state) = test_state();
    let app = create_router(state);

    let (status, body) = send(&app, "GET", "/", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "JobPortal Pro API");
}

// --- Authentication over the wire ---

#[tokio::test]
async fn test_register_validation_and_conflict_over_http() {
    let (_repo, state) = test_state();
    let app = create_router(state);

    // Short password.
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "a@b.com", "password": "12345", "name": "Pat", "role": "candidate"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Password must be at least 6 characters long");

    // First registration succeeds, second with the same email conflicts.
    register(&app, "a@b.com", "candidate").await;
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({
            "email": "a@b.com", "password": "longenough", "name": "Other", "role": "company"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "User already exists with this email");
}

#[tokio::test]
async fn test_login_and_me_round_trip() {
    let (_repo, state) = test_state();
    let app = create_router(state);
    let (user, _token) = register(&app, "kim@jobs.io", "candidate").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "kim@jobs.io", "password": "secret99" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], user["id"]);

    // The login token authenticates /api/auth/me.
    let token = body["token"].as_str().unwrap();
    let (status, body) = send(
        &app,
        "GET",
        "/api/auth/me",
        Some(&format!("Bearer {token}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "kim@jobs.io");
    // Sanitized: the digest never appears.
    assert!(body["user"].get("password").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({ "email": "kim@jobs.io", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Invalid email or password");
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let (_repo, state) = test_state();
    let app = create_router(state);

    for uri in [
        "/api/auth/me",
        "/api/my-jobs",
        "/api/my-applications",
        "/api/agency-candidates",
        "/api/stats/candidate",
    ] {
        let (status, body) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "expected 401 for {uri}");
        assert!(body["detail"].is_string(), "missing detail for {uri}");
    }
}

// --- The full hiring scenario ---

#[tokio::test]
async fn test_job_lifecycle_scenario() {
    let (_repo, state) = test_state();
    let app = create_router(state);

    // A company posts a job.
    let (company, company_token) = register(&app, "co@jobs.io", "company").await;
    let job_payload = serde_json::to_value(sample_job_request("Backend Engineer")).unwrap();
    let (status, job) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(&format!("Bearer {company_token}")),
        Some(job_payload),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(job["status"], "active");
    assert_eq!(job["posted_by_id"], company["id"]);
    let job_id = job["id"].as_i64().unwrap();

    // The posting shows up on the anonymous board.
    let (status, listing) = send(&app, "GET", "/api/jobs", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        listing
            .as_array()
            .unwrap()
            .iter()
            .any(|j| j["id"].as_i64() == Some(job_id))
    );

    // A candidate applies.
    let (candidate, candidate_token) = register(&app, "cand@jobs.io", "candidate").await;
    let (status, application) = send(
        &app,
        "POST",
        "/api/applications",
        Some(&format!("Bearer {candidate_token}")),
        Some(json!({ "job_id": job_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(application["status"], "pending");
    assert_eq!(application["candidate_id"], candidate["id"]);

    // Applying again conflicts and creates nothing.
    let (status, body) = send(
        &app,
        "POST",
        "/api/applications",
        Some(&format!("Bearer {candidate_token}")),
        Some(json!({ "job_id": job_id })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "You have already applied to this job");

    // The company reads one enriched application.
    let (status, received) = send(
        &app,
        "GET",
        &format!("/api/job-applications/{job_id}"),
        Some(&format!("Bearer {company_token}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let received = received.as_array().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["candidate"]["email"], "cand@jobs.io");

    // The candidate's own view carries the job.
    let (status, mine) = send(
        &app,
        "GET",
        "/api/my-applications",
        Some(&format!("Bearer {candidate_token}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine[0]["job"]["title"], "Backend Engineer");
}

// --- Authorization boundaries over the wire ---

#[tokio::test]
async fn test_candidate_cannot_post_jobs_over_http() {
    let (repo, state) = test_state();
    let app = create_router(state);
    let (_user, token) = register(&app, "cand@jobs.io", "candidate").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(&format!("Bearer {token}")),
        Some(serde_json::to_value(sample_job_request("Sneaky")).unwrap()),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Insufficient permissions");
    assert_eq!(repo.job_count(), 0);
}

#[tokio::test]
async fn test_cross_company_job_update_is_forbidden() {
    let (_repo, state) = test_state();
    let app = create_router(state);
    let (_c1, token_one) = register(&app, "one@jobs.io", "company").await;
    let (_c2, token_two) = register(&app, "two@jobs.io", "company").await;

    let (_, job) = send(
        &app,
        "POST",
        "/api/jobs",
        Some(&format!("Bearer {token_one}")),
        Some(serde_json::to_value(sample_job_request("Owned by one")).unwrap()),
    )
    .await;
    let job_id = job["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/jobs/{job_id}"),
        Some(&format!("Bearer {token_two}")),
        Some(json!({ "title": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "You can only edit your own jobs");

    // The posting is unchanged.
    let (_, unchanged) = send(&app, "GET", &format!("/api/jobs/{job_id}"), None, None).await;
    assert_eq!(unchanged["title"], "Owned by one");
}

#[tokio::test]
async fn test_missing_job_detail_is_404_over_http() {
    let (_repo, state) = test_state();
    let app = create_router(state);

    let (status, body) = send(&app, "GET", "/api/jobs/424242", None, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Job not found");
}

#[tokio::test]
async fn test_stats_endpoints_are_role_matched() {
    let (_repo, state) = test_state();
    let app = create_router(state);
    let (_user, candidate_token) = register(&app, "cand@jobs.io", "candidate").await;
    let (_user, agency_token) = register(&app, "agency@jobs.io", "agency").await;

    // Matching role works.
    let (status, stats) = send(
        &app,
        "GET",
        "/api/stats/candidate",
        Some(&format!("Bearer {candidate_token}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["views"], 0);

    // Mismatched roles are forbidden in both directions.
    let (status, _) = send(
        &app,
        "GET",
        "/api/stats/company",
        Some(&format!("Bearer {candidate_token}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "GET",
        "/api/stats/candidate",
        Some(&format!("Bearer {agency_token}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_agency_roster_flow_over_http() {
    let (_repo, state) = test_state();

    // Seed the represented candidate directly; the roster references them by id.
    let candidate = seed_user(&state, "cand@jobs.io", "pass123", Role::Candidate).await;

    let app = create_router(state);
    let (_agency, agency_token) = register(&app, "agency@jobs.io", "agency").await;

    let (status, entry) = send(
        &app,
        "POST",
        "/api/agency-candidates",
        Some(&format!("Bearer {agency_token}")),
        Some(json!({ "candidate_id": candidate.id, "specialization": "Backend" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["status"], "available");
    assert_eq!(entry["rating"], 0);

    let (status, roster) = send(
        &app,
        "GET",
        "/api/agency-candidates",
        Some(&format!("Bearer {agency_token}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(roster[0]["candidate"]["email"], "cand@jobs.io");

    // A non-agency is turned away.
    let (_user, candidate_token) = register(&app, "someone@jobs.io", "candidate").await;
    let (status, _) = send(
        &app,
        "GET",
        "/api/agency-candidates",
        Some(&format!("Bearer {candidate_token}")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
