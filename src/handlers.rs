use crate::{
    AppState, auth,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    models::{
        AgencyCandidate, AgencyStats, ApiMessage, Application, ApplicationWithCandidate,
        ApplicationWithJob, AuthResponse, CandidateStats, CompanyStats,
        CreateAgencyCandidateRequest, CreateApplicationRequest, CreateJobRequest, Job,
        LoginRequest, MeResponse, NewUser, RegisterRequest, Role, RosterEntryResponse,
        UpdateApplicationRequest, UpdateJobRequest, UserResponse,
    },
    policy,
};
use axum::{
    Json,
    extract::{Path, State},
};
use std::collections::HashSet;

// --- Root ---

/// root
///
/// [Public Route] Identifies the service. Also doubles as a liveness probe.
#[utoipa::path(get, path = "/", responses((status = 200, description = "Service banner", body = ApiMessage)))]
pub async fn root() -> Json<ApiMessage> {
    Json(ApiMessage {
        message: "JobPortal Pro API".to_string(),
    })
}

// --- Authentication Handlers ---

/// register
///
/// [Public Route] Creates an account and signs the caller in, in one step.
///
/// *Validation*: password must be at least 6 characters.
/// *Conflict*: an already-registered email is rejected before any insert.
/// The response carries the sanitized user plus a fresh bearer token.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Registered", body = AuthResponse),
        (status = 400, description = "Short password or duplicate email")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    if payload.password.chars().count() < 6 {
        return Err(ApiError::validation(
            "Password must be at least 6 characters long",
        ));
    }

    if state.repo.find_user_by_email(&payload.email).await.is_some() {
        return Err(ApiError::conflict("User already exists with this email"));
    }

    let digest = auth::hash_password(&payload.password)?;
    let user = state
        .repo
        .create_user(NewUser {
            email: payload.email,
            password: digest,
            name: payload.name,
            role: payload.role,
            company_name: payload.company_name,
            agency_name: payload.agency_name,
        })
        .await
        .ok_or_else(|| ApiError::internal("user insert failed"))?;

    let token = auth::issue_token(user.id, &state.config.jwt_secret)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// login
///
/// [Public Route] Exchanges email + password for a bearer token.
///
/// Unknown email and wrong password produce the same 401 message, so the
/// response does not reveal which field was wrong.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Bad credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .repo
        .find_user_by_email(&payload.email)
        .await
        .filter(|user| auth::verify_password(&payload.password, &user.password))
        .ok_or_else(|| ApiError::auth("Invalid email or password"))?;

    let token = auth::issue_token(user.id, &state.config.jwt_secret)?;

    Ok(Json(AuthResponse {
        user: user.into(),
        token,
    }))
}

/// me
///
/// [Authenticated Route] Returns the requester's own sanitized account data.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses((status = 200, description = "Current user", body = MeResponse))
)]
pub async fn me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<MeResponse>> {
    // The extractor verified existence moments ago; a miss here means the
    // account vanished mid-request, which reads as a stale token.
    let user = state
        .repo
        .get_user(id)
        .await
        .ok_or_else(|| ApiError::auth("Invalid authentication credentials"))?;

    Ok(Json(MeResponse { user: user.into() }))
}

// --- Job Handlers ---

/// list_jobs
///
/// [Public Route] Lists every posting with status "active", newest first.
#[utoipa::path(
    get,
    path = "/api/jobs",
    responses((status = 200, description = "Active jobs", body = [Job]))
)]
pub async fn list_jobs(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.repo.list_active_jobs().await)
}

/// get_job
///
/// [Public Route] Retrieves a single posting by id, any status.
#[utoipa::path(
    get,
    path = "/api/jobs/{id}",
    params(("id" = i32, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Found", body = Job),
        (status = 404, description = "No such job")
    )
)]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<Json<Job>> {
    match state.repo.get_job(id).await {
        Some(job) => Ok(Json(job)),
        None => Err(ApiError::not_found("Job not found")),
    }
}

/// create_job
///
/// [Authenticated Route] Submits a new posting.
///
/// *Authorization*: company and agency accounts only. The owner fields are
/// stamped from the authenticated requester, so a payload cannot post on
/// someone else's behalf.
#[utoipa::path(
    post,
    path = "/api/jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 200, description = "Created", body = Job),
        (status = 403, description = "Role may not post jobs")
    )
)]
pub async fn create_job(
    AuthUser { id, role }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateJobRequest>,
) -> ApiResult<Json<Job>> {
    policy::require_job_poster(role)?;

    let job = state
        .repo
        .create_job(payload, id, role)
        .await
        .ok_or_else(|| ApiError::internal("job insert failed"))?;

    Ok(Json(job))
}

/// my_jobs
///
/// [Authenticated Route] Lists the requester's own postings across every
/// status, newest first.
#[utoipa::path(
    get,
    path = "/api/my-jobs",
    responses(
        (status = 200, description = "Own jobs", body = [Job]),
        (status = 403, description = "Role may not post jobs")
    )
)]
pub async fn my_jobs(
    AuthUser { id, role }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Job>>> {
    policy::require_job_poster(role)?;
    Ok(Json(state.repo.get_jobs_by_poster(id).await))
}

/// update_job
///
/// [Authenticated Route] Applies a partial update to a posting.
///
/// *Authorization*: owner only. Existence is checked first, so a missing job
/// is a 404 while someone else's job is a 403. Only fields present in the
/// patch change; unknown keys in the body are ignored outright.
#[utoipa::path(
    put,
    path = "/api/jobs/{id}",
    params(("id" = i32, Path, description = "Job ID")),
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Updated", body = Job),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "No such job")
    )
)]
pub async fn update_job(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateJobRequest>,
) -> ApiResult<Json<Job>> {
    let job = state
        .repo
        .get_job(id)
        .await
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    policy::require_job_owner(&job, user_id, "You can only edit your own jobs")?;

    let updated = state
        .repo
        .update_job(id, payload)
        .await
        .ok_or_else(|| ApiError::internal("job update failed"))?;

    Ok(Json(updated))
}

// --- Application Handlers ---

/// create_application
///
/// [Authenticated Route] Submits an application to a job.
///
/// *Authorization*: candidates only.
/// *Conflict*: a second application to the same job by the same candidate is
/// rejected before any insert; the storage UNIQUE constraint backs this up.
#[utoipa::path(
    post,
    path = "/api/applications",
    request_body = CreateApplicationRequest,
    responses(
        (status = 200, description = "Applied", body = Application),
        (status = 400, description = "Already applied"),
        (status = 403, description = "Not a candidate")
    )
)]
pub async fn create_application(
    AuthUser { id, role }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateApplicationRequest>,
) -> ApiResult<Json<Application>> {
    if role != Role::Candidate {
        return Err(ApiError::permission("Only candidates can apply"));
    }

    if state
        .repo
        .find_application(payload.job_id, id)
        .await
        .is_some()
    {
        return Err(ApiError::conflict("You have already applied to this job"));
    }

    let application = state
        .repo
        .create_application(payload, id)
        .await
        .ok_or_else(|| ApiError::internal("application insert failed"))?;

    Ok(Json(application))
}

/// my_applications
///
/// [Authenticated Route] Lists the requester's applications, newest first,
/// each enriched with its referenced job. A job that no longer resolves
/// yields `"job": null` rather than dropping the row.
#[utoipa::path(
    get,
    path = "/api/my-applications",
    responses(
        (status = 200, description = "Own applications with jobs", body = [ApplicationWithJob]),
        (status = 403, description = "Not a candidate")
    )
)]
pub async fn my_applications(
    AuthUser { id, role }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ApplicationWithJob>>> {
    policy::require_candidate(role)?;

    let applications = state.repo.get_applications_by_candidate(id).await;

    let mut result = Vec::with_capacity(applications.len());
    for application in applications {
        let job = state.repo.get_job(application.job_id).await;
        result.push(ApplicationWithJob::compose(application, job));
    }

    Ok(Json(result))
}

/// job_applications
///
/// [Authenticated Route] Lists every application received by one of the
/// requester's own jobs, each enriched with the applicant's sanitized user.
///
/// *Authorization*: company/agency role, then ownership of the target job.
/// A missing job takes the ownership failure path (403), keeping the
/// response identical whether the job is absent or simply not yours.
#[utoipa::path(
    get,
    path = "/api/job-applications/{job_id}",
    params(("job_id" = i32, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Applications with candidates", body = [ApplicationWithCandidate]),
        (status = 403, description = "Not the owner")
    )
)]
pub async fn job_applications(
    AuthUser { id, role }: AuthUser,
    State(state): State<AppState>,
    Path(job_id): Path<i32>,
) -> ApiResult<Json<Vec<ApplicationWithCandidate>>> {
    policy::require_job_poster(role)?;

    let owned = state
        .repo
        .get_job(job_id)
        .await
        .filter(|job| job.posted_by_id == id);
    if owned.is_none() {
        return Err(ApiError::permission(
            "You can only view applications for your own jobs",
        ));
    }

    let applications = state.repo.get_applications_for_job(job_id).await;

    let mut result = Vec::with_capacity(applications.len());
    for application in applications {
        let candidate = state
            .repo
            .get_user(application.candidate_id)
            .await
            .map(UserResponse::from);
        result.push(ApplicationWithCandidate::compose(application, candidate));
    }

    Ok(Json(result))
}

/// update_application
///
/// [Authenticated Route] Applies a partial update to an application
/// (typically its review status or interview date).
///
/// *Authorization*: the requester must own the job the application targets.
#[utoipa::path(
    put,
    path = "/api/applications/{id}",
    params(("id" = i32, Path, description = "Application ID")),
    request_body = UpdateApplicationRequest,
    responses(
        (status = 200, description = "Updated", body = Application),
        (status = 403, description = "Not the job owner"),
        (status = 404, description = "No such application")
    )
)]
pub async fn update_application(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateApplicationRequest>,
) -> ApiResult<Json<Application>> {
    let application = state
        .repo
        .get_application(id)
        .await
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    let owned = state
        .repo
        .get_job(application.job_id)
        .await
        .filter(|job| job.posted_by_id == user_id);
    if owned.is_none() {
        return Err(ApiError::permission(
            "You can only update applications for your own jobs",
        ));
    }

    let updated = state
        .repo
        .update_application(id, payload)
        .await
        .ok_or_else(|| ApiError::internal("application update failed"))?;

    Ok(Json(updated))
}

// --- Agency Roster Handlers ---

/// agency_candidates
///
/// [Authenticated Route] Lists the requesting agency's roster, newest first,
/// each entry enriched with the represented candidate's sanitized user.
#[utoipa::path(
    get,
    path = "/api/agency-candidates",
    responses(
        (status = 200, description = "Roster with candidates", body = [RosterEntryResponse]),
        (status = 403, description = "Not an agency")
    )
)]
pub async fn agency_candidates(
    AuthUser { id, role }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RosterEntryResponse>>> {
    policy::require_agency(role)?;

    let entries = state.repo.get_agency_candidates(id).await;

    let mut result = Vec::with_capacity(entries.len());
    for entry in entries {
        let candidate = state
            .repo
            .get_user(entry.candidate_id)
            .await
            .map(UserResponse::from);
        result.push(RosterEntryResponse::compose(entry, candidate));
    }

    Ok(Json(result))
}

/// create_agency_candidate
///
/// [Authenticated Route] Adds a candidate to the requesting agency's roster.
/// The `agency_id` is stamped from the requester.
#[utoipa::path(
    post,
    path = "/api/agency-candidates",
    request_body = CreateAgencyCandidateRequest,
    responses(
        (status = 200, description = "Added", body = AgencyCandidate),
        (status = 403, description = "Not an agency")
    )
)]
pub async fn create_agency_candidate(
    AuthUser { id, role }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateAgencyCandidateRequest>,
) -> ApiResult<Json<AgencyCandidate>> {
    policy::require_agency(role)?;

    let entry = state
        .repo
        .create_agency_candidate(payload, id)
        .await
        .ok_or_else(|| ApiError::internal("roster insert failed"))?;

    Ok(Json(entry))
}

// --- Statistics Handlers ---

/// candidate_stats
///
/// [Authenticated Route] Dashboard counters for a candidate, reduced from
/// their applications on demand. `views` is applications x 3, a proxy
/// metric; nothing records actual views.
#[utoipa::path(
    get,
    path = "/api/stats/candidate",
    responses(
        (status = 200, description = "Candidate dashboard", body = CandidateStats),
        (status = 403, description = "Not a candidate")
    )
)]
pub async fn candidate_stats(
    AuthUser { id, role }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<CandidateStats>> {
    policy::require_candidate(role)?;

    let applications = state.repo.get_applications_by_candidate(id).await;

    let interviews = applications
        .iter()
        .filter(|a| a.status == "interview")
        .count() as i64;
    let pending = applications
        .iter()
        .filter(|a| a.status == "pending" || a.status == "reviewed")
        .count() as i64;
    let total = applications.len() as i64;

    Ok(Json(CandidateStats {
        applications: total,
        interviews,
        pending,
        views: total * 3,
    }))
}

/// company_stats
///
/// [Authenticated Route] Dashboard counters for a company: posting activity
/// plus the applications received across all of its jobs.
#[utoipa::path(
    get,
    path = "/api/stats/company",
    responses(
        (status = 200, description = "Company dashboard", body = CompanyStats),
        (status = 403, description = "Not a company")
    )
)]
pub async fn company_stats(
    AuthUser { id, role }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<CompanyStats>> {
    policy::require_company(role)?;

    let jobs = state.repo.get_jobs_by_poster(id).await;
    let job_ids: Vec<i32> = jobs.iter().map(|job| job.id).collect();
    let applications = state.repo.get_applications_for_jobs(&job_ids).await;

    Ok(Json(CompanyStats {
        active_jobs: jobs.iter().filter(|j| j.status == "active").count() as i64,
        total_applications: applications.len() as i64,
        pending_reviews: applications.iter().filter(|a| a.status == "pending").count() as i64,
        interviews: applications
            .iter()
            .filter(|a| a.status == "interview")
            .count() as i64,
    }))
}

/// agency_stats
///
/// [Authenticated Route] Dashboard counters for an agency, reduced from its
/// roster and its own postings. `partner_companies` counts distinct
/// `posted_by_id` over the agency's own jobs, which is always the agency
/// itself, so the value never exceeds 1.
#[utoipa::path(
    get,
    path = "/api/stats/agency",
    responses(
        (status = 200, description = "Agency dashboard", body = AgencyStats),
        (status = 403, description = "Not an agency")
    )
)]
pub async fn agency_stats(
    AuthUser { id, role }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<AgencyStats>> {
    policy::require_agency(role)?;

    let roster = state.repo.get_agency_candidates(id).await;
    let jobs = state.repo.get_jobs_by_poster(id).await;

    let partner_companies = jobs
        .iter()
        .map(|job| job.posted_by_id)
        .collect::<HashSet<_>>()
        .len() as i64;

    Ok(Json(AgencyStats {
        candidate_pool: roster.len() as i64,
        active_placements: roster.iter().filter(|c| c.status == "interviewing").count() as i64,
        successful_placements: roster.iter().filter(|c| c.status == "placed").count() as i64,
        partner_companies,
    }))
}
