//! Central authorization policy.
//!
//! Every mutating or scoped-read endpoint funnels its role and ownership
//! checks through this module, so the complete rule table is auditable in
//! one screen. Role violations are `Permission` (403), which is distinct
//! from the extractor's `Auth` (401): the requester is known, but not
//! allowed.

use crate::{
    error::{ApiError, ApiResult},
    models::{Job, Role},
};

/// Whether a role may own job postings. Candidates browse and apply; only
/// companies and agencies post.
pub fn can_post_jobs(role: Role) -> bool {
    matches!(role, Role::Company | Role::Agency)
}

/// require_job_poster
///
/// Gate for endpoints scoped to job owners: create job, list own jobs,
/// list a job's applications.
pub fn require_job_poster(role: Role) -> ApiResult<()> {
    if can_post_jobs(role) {
        Ok(())
    } else {
        Err(ApiError::permission("Insufficient permissions"))
    }
}

/// require_candidate
///
/// Gate for candidate-scoped reads: own applications, candidate stats.
pub fn require_candidate(role: Role) -> ApiResult<()> {
    if role == Role::Candidate {
        Ok(())
    } else {
        Err(ApiError::permission("Insufficient permissions"))
    }
}

/// require_company
///
/// Gate for the company stats endpoint.
pub fn require_company(role: Role) -> ApiResult<()> {
    if role == Role::Company {
        Ok(())
    } else {
        Err(ApiError::permission("Insufficient permissions"))
    }
}

/// require_agency
///
/// Gate for agency-scoped operations: roster list/create, agency stats.
pub fn require_agency(role: Role) -> ApiResult<()> {
    if role == Role::Agency {
        Ok(())
    } else {
        Err(ApiError::permission("Insufficient permissions"))
    }
}

/// require_job_owner
///
/// Ownership gate for mutating a posting: the requester must be the user who
/// posted the job. The application endpoints fold their missing-job case
/// into the same 403 inline, since there the job's absence must not be
/// distinguishable from someone else's job.
pub fn require_job_owner(job: &Job, requester_id: i32, message: &str) -> ApiResult<()> {
    if job.posted_by_id == requester_id {
        Ok(())
    } else {
        Err(ApiError::permission(message))
    }
}
