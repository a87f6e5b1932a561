use crate::models::{
    AgencyCandidate, Application, CreateAgencyCandidateRequest, CreateApplicationRequest,
    CreateJobRequest, Job, NewUser, Role, UpdateApplicationRequest, UpdateJobRequest, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

const USER_COLUMNS: &str = "id, email, password, name, role, company_name, agency_name, created_at";
const JOB_COLUMNS: &str = "id, title, description, department, employment_type, experience_level, \
     location, remote_work, skills, salary_min, salary_max, deadline, status, posted_by_id, \
     posted_by_type, created_at";
const APPLICATION_COLUMNS: &str =
    "id, job_id, candidate_id, status, applied_at, interview_date, notes";
const AGENCY_CANDIDATE_COLUMNS: &str =
    "id, agency_id, candidate_id, specialization, experience, rating, status, added_at";

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations, so handlers
/// interact with the data layer without knowing the concrete backend
/// (Postgres in production, an in-memory implementation in tests).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
///
/// Error discipline: reads degrade to `None`/empty on database failure (the
/// failure is logged); writes return `None` on failure so the handler can
/// surface a 500. Uniqueness conflicts are checked by handlers before the
/// insert, with the storage constraints as backstop.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn get_user(&self, id: i32) -> Option<User>;
    async fn find_user_by_email(&self, email: &str) -> Option<User>;
    async fn create_user(&self, new_user: NewUser) -> Option<User>;

    // --- Jobs ---
    // Public listing: active postings only, newest first.
    async fn list_active_jobs(&self) -> Vec<Job>;
    async fn get_job(&self, id: i32) -> Option<Job>;
    async fn create_job(
        &self,
        req: CreateJobRequest,
        posted_by_id: i32,
        posted_by_type: Role,
    ) -> Option<Job>;
    // Owner listing: every status, newest first.
    async fn get_jobs_by_poster(&self, user_id: i32) -> Vec<Job>;
    // Partial merge update; ownership is checked by the caller.
    async fn update_job(&self, id: i32, req: UpdateJobRequest) -> Option<Job>;

    // --- Applications ---
    async fn get_application(&self, id: i32) -> Option<Application>;
    // Duplicate probe for the one-application-per-job-per-candidate rule.
    async fn find_application(&self, job_id: i32, candidate_id: i32) -> Option<Application>;
    async fn create_application(
        &self,
        req: CreateApplicationRequest,
        candidate_id: i32,
    ) -> Option<Application>;
    async fn get_applications_by_candidate(&self, candidate_id: i32) -> Vec<Application>;
    async fn get_applications_for_job(&self, job_id: i32) -> Vec<Application>;
    // Stats support: every application across a set of jobs.
    async fn get_applications_for_jobs(&self, job_ids: &[i32]) -> Vec<Application>;
    async fn update_application(
        &self,
        id: i32,
        req: UpdateApplicationRequest,
    ) -> Option<Application>;

    // --- Agency Roster ---
    async fn get_agency_candidates(&self, agency_id: i32) -> Vec<AgencyCandidate>;
    async fn create_agency_candidate(
        &self,
        req: CreateAgencyCandidateRequest,
        agency_id: i32,
    ) -> Option<AgencyCandidate>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
/// All queries use the runtime-checked query API with `$n` placeholders; no
/// string interpolation of caller data ever reaches the database.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    // --- USERS ---

    async fn get_user(&self, id: i32) -> Option<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_user error: {:?}", e);
            None
        })
    }

    /// Email is unique at the storage layer, so at most one row matches.
    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_user_by_email error: {:?}", e);
            None
        })
    }

    async fn create_user(&self, new_user: NewUser) -> Option<User> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, password, name, role, company_name, agency_name) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.email)
        .bind(new_user.password)
        .bind(new_user.name)
        .bind(new_user.role)
        .bind(new_user.company_name)
        .bind(new_user.agency_name)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_user error: {:?}", e);
            None
        })
    }

    // --- JOBS ---

    async fn list_active_jobs(&self) -> Vec<Job> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE status = 'active' ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("list_active_jobs error: {:?}", e);
            vec![]
        })
    }

    async fn get_job(&self, id: i32) -> Option<Job> {
        sqlx::query_as::<_, Job>(&format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("get_job error: {:?}", e);
                None
            })
    }

    /// Ownership stamping happens here: `posted_by_id`/`posted_by_type` come
    /// from the authenticated requester, never from the payload. `status`
    /// takes the storage default ("active").
    async fn create_job(
        &self,
        req: CreateJobRequest,
        posted_by_id: i32,
        posted_by_type: Role,
    ) -> Option<Job> {
        sqlx::query_as::<_, Job>(&format!(
            "INSERT INTO jobs (title, description, department, employment_type, experience_level, \
             location, remote_work, skills, salary_min, salary_max, deadline, posted_by_id, \
             posted_by_type) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(req.title)
        .bind(req.description)
        .bind(req.department)
        .bind(req.employment_type)
        .bind(req.experience_level)
        .bind(req.location)
        .bind(req.remote_work)
        .bind(req.skills)
        .bind(req.salary_min)
        .bind(req.salary_max)
        .bind(req.deadline)
        .bind(posted_by_id)
        .bind(posted_by_type)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_job error: {:?}", e);
            None
        })
    }

    async fn get_jobs_by_poster(&self, user_id: i32) -> Vec<Job> {
        sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE posted_by_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_jobs_by_poster error: {:?}", e);
            vec![]
        })
    }

    /// Partial merge update via COALESCE: a column changes only when the
    /// corresponding patch field is present. Absent fields bind as NULL and
    /// leave the stored value untouched.
    async fn update_job(&self, id: i32, req: UpdateJobRequest) -> Option<Job> {
        sqlx::query_as::<_, Job>(&format!(
            "UPDATE jobs \
             SET title = COALESCE($2, title), \
                 description = COALESCE($3, description), \
                 department = COALESCE($4, department), \
                 employment_type = COALESCE($5, employment_type), \
                 experience_level = COALESCE($6, experience_level), \
                 location = COALESCE($7, location), \
                 remote_work = COALESCE($8, remote_work), \
                 skills = COALESCE($9, skills), \
                 salary_min = COALESCE($10, salary_min), \
                 salary_max = COALESCE($11, salary_max), \
                 deadline = COALESCE($12, deadline), \
                 status = COALESCE($13, status) \
             WHERE id = $1 \
             RETURNING {JOB_COLUMNS}"
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.department)
        .bind(req.employment_type)
        .bind(req.experience_level)
        .bind(req.location)
        .bind(req.remote_work)
        .bind(req.skills)
        .bind(req.salary_min)
        .bind(req.salary_max)
        .bind(req.deadline)
        .bind(req.status)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_job error: {:?}", e);
            None
        })
    }

    // --- APPLICATIONS ---

    async fn get_application(&self, id: i32) -> Option<Application> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_application error: {:?}", e);
            None
        })
    }

    async fn find_application(&self, job_id: i32, candidate_id: i32) -> Option<Application> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE job_id = $1 AND candidate_id = $2"
        ))
        .bind(job_id)
        .bind(candidate_id)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("find_application error: {:?}", e);
            None
        })
    }

    async fn create_application(
        &self,
        req: CreateApplicationRequest,
        candidate_id: i32,
    ) -> Option<Application> {
        sqlx::query_as::<_, Application>(&format!(
            "INSERT INTO applications (job_id, candidate_id, status, interview_date, notes) \
             VALUES ($1, $2, COALESCE($3, 'pending'), $4, $5) \
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(req.job_id)
        .bind(candidate_id)
        .bind(req.status)
        .bind(req.interview_date)
        .bind(req.notes)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_application error: {:?}", e);
            None
        })
    }

    async fn get_applications_by_candidate(&self, candidate_id: i32) -> Vec<Application> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE candidate_id = $1 ORDER BY applied_at DESC"
        ))
        .bind(candidate_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_applications_by_candidate error: {:?}", e);
            vec![]
        })
    }

    async fn get_applications_for_job(&self, job_id: i32) -> Vec<Application> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE job_id = $1"
        ))
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_applications_for_job error: {:?}", e);
            vec![]
        })
    }

    async fn get_applications_for_jobs(&self, job_ids: &[i32]) -> Vec<Application> {
        sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE job_id = ANY($1)"
        ))
        .bind(job_ids)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_applications_for_jobs error: {:?}", e);
            vec![]
        })
    }

    async fn update_application(
        &self,
        id: i32,
        req: UpdateApplicationRequest,
    ) -> Option<Application> {
        sqlx::query_as::<_, Application>(&format!(
            "UPDATE applications \
             SET status = COALESCE($2, status), \
                 interview_date = COALESCE($3, interview_date), \
                 notes = COALESCE($4, notes) \
             WHERE id = $1 \
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(id)
        .bind(req.status)
        .bind(req.interview_date)
        .bind(req.notes)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("update_application error: {:?}", e);
            None
        })
    }

    // --- AGENCY ROSTER ---

    async fn get_agency_candidates(&self, agency_id: i32) -> Vec<AgencyCandidate> {
        sqlx::query_as::<_, AgencyCandidate>(&format!(
            "SELECT {AGENCY_CANDIDATE_COLUMNS} FROM agency_candidates \
             WHERE agency_id = $1 ORDER BY added_at DESC"
        ))
        .bind(agency_id)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("get_agency_candidates error: {:?}", e);
            vec![]
        })
    }

    async fn create_agency_candidate(
        &self,
        req: CreateAgencyCandidateRequest,
        agency_id: i32,
    ) -> Option<AgencyCandidate> {
        sqlx::query_as::<_, AgencyCandidate>(&format!(
            "INSERT INTO agency_candidates \
             (agency_id, candidate_id, specialization, experience, rating, status) \
             VALUES ($1, $2, $3, $4, COALESCE($5, 0), COALESCE($6, 'available')) \
             RETURNING {AGENCY_CANDIDATE_COLUMNS}"
        ))
        .bind(agency_id)
        .bind(req.candidate_id)
        .bind(req.specialization)
        .bind(req.experience)
        .bind(req.rating)
        .bind(req.status)
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("create_agency_candidate error: {:?}", e);
            None
        })
    }
}
