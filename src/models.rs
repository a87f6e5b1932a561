use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Role Model ---

/// Role
///
/// The RBAC discriminator for every account. Candidates apply to jobs,
/// companies and agencies post them, and agencies additionally manage a
/// roster of represented candidates. The role is fixed at registration;
/// no endpoint mutates it.
///
/// Serialized lowercase in JSON and stored as lowercase TEXT, so the same
/// literal ("candidate" | "company" | "agency") is used end to end.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    Candidate,
    Company,
    Agency,
}

impl Role {
    /// The wire/storage literal for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Company => "company",
            Role::Agency => "agency",
        }
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record from the `users` table. The `password` column
/// holds the argon2 digest and is excluded from every serialized form;
/// API responses go through [`UserResponse`] instead.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: i32,
    // Unique at the storage layer.
    pub email: String,
    // Argon2 digest. Never leaves the process in a response body.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password: String,
    pub name: String,
    pub role: Role,
    // Populated for company accounts.
    pub company_name: Option<String>,
    // Populated for agency accounts.
    pub agency_name: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Job
///
/// A posting from the `jobs` table. Owned by the user referenced by
/// `posted_by_id`; `posted_by_type` is a denormalized copy of the poster's
/// role stamped at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub department: Option<String>,
    pub employment_type: String,
    pub experience_level: String,
    pub location: Option<String>,
    pub remote_work: String,
    pub skills: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub deadline: Option<DateTime<Utc>>,
    // Lifecycle marker; "active" postings appear in the public listing.
    pub status: String,
    // FK to users.id (owner).
    pub posted_by_id: i32,
    pub posted_by_type: Role,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Application
///
/// A candidate's application to a job, from the `applications` table.
/// At most one row exists per (job_id, candidate_id) pair; the storage
/// layer enforces this with a UNIQUE constraint and the create handler
/// checks it up front to return a conflict instead of a constraint error.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Application {
    pub id: i32,
    // FK to jobs.id.
    pub job_id: i32,
    // FK to users.id (the applicant).
    pub candidate_id: i32,
    pub status: String,
    #[ts(type = "string")]
    pub applied_at: DateTime<Utc>,
    pub interview_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// AgencyCandidate
///
/// A roster entry linking an agency to a candidate it represents,
/// from the `agency_candidates` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct AgencyCandidate {
    pub id: i32,
    // FK to users.id (the owning agency).
    pub agency_id: i32,
    // FK to users.id (the represented candidate).
    pub candidate_id: i32,
    pub specialization: Option<String>,
    pub experience: Option<String>,
    pub rating: i32,
    pub status: String,
    #[ts(type = "string")]
    pub added_at: DateTime<Utc>,
}

/// Profile
///
/// Supplementary candidate detail from the `profiles` table. Declared for
/// schema completeness; no endpoint reads or writes it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default)]
pub struct Profile {
    pub id: i32,
    pub user_id: i32,
    pub bio: Option<String>,
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub education: Option<String>,
    pub location: Option<String>,
    pub resume_url: Option<String>,
    pub portfolio_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// NewUser
///
/// Internal insert payload for the `users` table, assembled by the register
/// handler after hashing the password. Not part of the API surface.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub company_name: Option<String>,
    pub agency_name: Option<String>,
}

// --- Request Payloads (Input Schemas) ---

/// RegisterRequest
///
/// Input payload for POST /api/auth/register. The password must be at least
/// six characters; the role literal selects the account type.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub company_name: Option<String>,
    pub agency_name: Option<String>,
}

/// LoginRequest
///
/// Input payload for POST /api/auth/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreateJobRequest
///
/// Input payload for POST /api/jobs. Ownership fields (`posted_by_id`,
/// `posted_by_type`) are stamped from the authenticated requester, never
/// taken from the payload; `status` starts at its "active" default.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateJobRequest {
    pub title: String,
    pub description: String,
    pub department: Option<String>,
    pub employment_type: String,
    pub experience_level: String,
    pub location: Option<String>,
    pub remote_work: String,
    pub skills: Option<String>,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub deadline: Option<DateTime<Utc>>,
}

/// UpdateJobRequest
///
/// Partial update payload for PUT /api/jobs/{id}. Every field is optional
/// and applied only when present; unknown JSON keys are dropped during
/// deserialization rather than rejected. This named-field patch is the
/// entire mutable surface of a job.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateJobRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_work: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_min: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_max: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// CreateApplicationRequest
///
/// Input payload for POST /api/applications. `candidate_id` is stamped from
/// the requester; `status` falls back to "pending" when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateApplicationRequest {
    pub job_id: i32,
    pub status: Option<String>,
    pub interview_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// UpdateApplicationRequest
///
/// Partial update payload for PUT /api/applications/{id}. Same merge policy
/// as [`UpdateJobRequest`].
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateApplicationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// CreateAgencyCandidateRequest
///
/// Input payload for POST /api/agency-candidates. `agency_id` is stamped
/// from the requester; rating and status carry storage defaults.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateAgencyCandidateRequest {
    pub candidate_id: i32,
    pub specialization: Option<String>,
    pub experience: Option<String>,
    pub rating: Option<i32>,
    pub status: Option<String>,
}

// --- Response Schemas (Output) ---

/// UserResponse
///
/// The sanitized public view of a [`User`]: everything except the password
/// digest. Every endpoint that returns account data returns this shape.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserResponse {
    pub id: i32,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub company_name: Option<String>,
    pub agency_name: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            company_name: user.company_name,
            agency_name: user.agency_name,
            created_at: user.created_at,
        }
    }
}

/// AuthResponse
///
/// Output of register and login: the sanitized user plus a fresh 24-hour
/// bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

/// MeResponse
///
/// Output of GET /api/auth/me.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MeResponse {
    pub user: UserResponse,
}

/// ApiMessage
///
/// Minimal `{message}` body used by the root endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ApiMessage {
    pub message: String,
}

/// ApplicationWithJob
///
/// Enriched application row for the candidate's own listing: the base
/// record plus the referenced job, or `null` when the job no longer
/// resolves.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ApplicationWithJob {
    pub id: i32,
    pub job_id: i32,
    pub candidate_id: i32,
    pub status: String,
    #[ts(type = "string")]
    pub applied_at: DateTime<Utc>,
    pub interview_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub job: Option<Job>,
}

impl ApplicationWithJob {
    pub fn compose(application: Application, job: Option<Job>) -> Self {
        ApplicationWithJob {
            id: application.id,
            job_id: application.job_id,
            candidate_id: application.candidate_id,
            status: application.status,
            applied_at: application.applied_at,
            interview_date: application.interview_date,
            notes: application.notes,
            job,
        }
    }
}

/// ApplicationWithCandidate
///
/// Enriched application row for the job poster's view: the base record
/// plus the applicant's sanitized user data, or `null` when the applicant
/// no longer resolves.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ApplicationWithCandidate {
    pub id: i32,
    pub job_id: i32,
    pub candidate_id: i32,
    pub status: String,
    #[ts(type = "string")]
    pub applied_at: DateTime<Utc>,
    pub interview_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub candidate: Option<UserResponse>,
}

impl ApplicationWithCandidate {
    pub fn compose(application: Application, candidate: Option<UserResponse>) -> Self {
        ApplicationWithCandidate {
            id: application.id,
            job_id: application.job_id,
            candidate_id: application.candidate_id,
            status: application.status,
            applied_at: application.applied_at,
            interview_date: application.interview_date,
            notes: application.notes,
            candidate,
        }
    }
}

/// RosterEntryResponse
///
/// Enriched agency roster entry: the base record plus the represented
/// candidate's sanitized user data.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RosterEntryResponse {
    pub id: i32,
    pub agency_id: i32,
    pub candidate_id: i32,
    pub specialization: Option<String>,
    pub experience: Option<String>,
    pub rating: i32,
    pub status: String,
    #[ts(type = "string")]
    pub added_at: DateTime<Utc>,
    pub candidate: Option<UserResponse>,
}

impl RosterEntryResponse {
    pub fn compose(entry: AgencyCandidate, candidate: Option<UserResponse>) -> Self {
        RosterEntryResponse {
            id: entry.id,
            agency_id: entry.agency_id,
            candidate_id: entry.candidate_id,
            specialization: entry.specialization,
            experience: entry.experience,
            rating: entry.rating,
            status: entry.status,
            added_at: entry.added_at,
            candidate,
        }
    }
}

// --- Dashboard Schemas (Output) ---

/// CandidateStats
///
/// Dashboard counters for a candidate, reduced from their applications.
/// `views` is a proxy metric derived from the application count; nothing
/// tracks real views.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CandidateStats {
    pub applications: i64,
    pub interviews: i64,
    pub pending: i64,
    pub views: i64,
}

/// CompanyStats
///
/// Dashboard counters for a company, reduced from its postings and the
/// applications they received.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CompanyStats {
    pub active_jobs: i64,
    pub total_applications: i64,
    pub pending_reviews: i64,
    pub interviews: i64,
}

/// AgencyStats
///
/// Dashboard counters for an agency, reduced from its roster and postings.
/// `partner_companies` counts distinct `posted_by_id` over the agency's own
/// jobs; every such row carries the agency's own id, so the value is always
/// 0 or 1.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct AgencyStats {
    pub candidate_pool: i64,
    pub active_placements: i64,
    pub successful_placements: i64,
    pub partner_companies: i64,
}
