#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use job_portal::{
    AppState,
    auth,
    config::AppConfig,
    models::{
        AgencyCandidate, Application, CreateAgencyCandidateRequest, CreateApplicationRequest,
        CreateJobRequest, Job, NewUser, Role, UpdateApplicationRequest, UpdateJobRequest, User,
    },
    repository::{Repository, RepositoryState},
};
use std::sync::{Arc, Mutex};

// --- In-Memory Repository ---

/// MemoryRepository
///
/// A semantically faithful, in-process implementation of the `Repository`
/// trait used by every test target. It reproduces the storage-level rules
/// the handlers depend on: unique emails, one application per
/// (job, candidate), referential existence checks on inserts, and the
/// newest-first orderings of the listing queries.
pub struct MemoryRepository {
    inner: Mutex<Store>,
}

#[derive(Default)]
struct Store {
    users: Vec<User>,
    jobs: Vec<Job>,
    applications: Vec<Application>,
    agency_candidates: Vec<AgencyCandidate>,
    next_id: i32,
}

impl Store {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Monotonic per-row timestamp so "newest first" orderings are
    /// deterministic even when rows are created within the same instant.
    fn stamp(&self, id: i32) -> DateTime<Utc> {
        Utc::now() + Duration::milliseconds(id as i64)
    }
}

impl MemoryRepository {
    pub fn new() -> Self {
        MemoryRepository {
            inner: Mutex::new(Store::default()),
        }
    }

    /// Raw row count probe, used to assert that rejected requests persisted nothing.
    pub fn job_count(&self) -> usize {
        self.inner.lock().unwrap().jobs.len()
    }

    pub fn application_count(&self) -> usize {
        self.inner.lock().unwrap().applications.len()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: i32) -> Option<User> {
        let store = self.inner.lock().unwrap();
        store.users.iter().find(|u| u.id == id).cloned()
    }

    async fn find_user_by_email(&self, email: &str) -> Option<User> {
        let store = self.inner.lock().unwrap();
        store.users.iter().find(|u| u.email == email).cloned()
    }

    async fn create_user(&self, new_user: NewUser) -> Option<User> {
        let mut store = self.inner.lock().unwrap();
        // UNIQUE (email) backstop.
        if store.users.iter().any(|u| u.email == new_user.email) {
            return None;
        }
        let id = store.next_id();
        let user = User {
            id,
            email: new_user.email,
            password: new_user.password,
            name: new_user.name,
            role: new_user.role,
            company_name: new_user.company_name,
            agency_name: new_user.agency_name,
            created_at: store.stamp(id),
        };
        store.users.push(user.clone());
        Some(user)
    }

    async fn list_active_jobs(&self) -> Vec<Job> {
        let store = self.inner.lock().unwrap();
        let mut jobs: Vec<Job> = store
            .jobs
            .iter()
            .filter(|j| j.status == "active")
            .cloned()
            .collect();
        jobs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        jobs
    }

    async fn get_job(&self, id: i32) -> Option<Job> {
        let store = self.inner.lock().unwrap();
        store.jobs.iter().find(|j| j.id == id).cloned()
    }

    async fn create_job(
        &self,
        req: CreateJobRequest,
        posted_by_id: i32,
        posted_by_type: Role,
    ) -> Option<Job> {
        let mut store = self.inner.lock().unwrap();
        // FK: the poster must exist.
        if !store.users.iter().any(|u| u.id == posted_by_id) {
            return None;
        }
        let id = store.next_id();
        let job = Job {
            id,
            title: req.title,
            description: req.description,
            department: req.department,
            employment_type: req.employment_type,
            experience_level: req.experience_level,
            location: req.location,
            remote_work: req.remote_work,
            skills: req.skills,
            salary_min: req.salary_min,
            salary_max: req.salary_max,
            deadline: req.deadline,
            status: "active".to_string(),
            posted_by_id,
            posted_by_type,
            created_at: store.stamp(id),
        };
        store.jobs.push(job.clone());
        Some(job)
    }

    async fn get_jobs_by_poster(&self, user_id: i32) -> Vec<Job> {
        let store = self.inner.lock().unwrap();
        let mut jobs: Vec<Job> = store
            .jobs
            .iter()
            .filter(|j| j.posted_by_id == user_id)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        jobs
    }

    async fn update_job(&self, id: i32, req: UpdateJobRequest) -> Option<Job> {
        let mut store = self.inner.lock().unwrap();
        let job = store.jobs.iter_mut().find(|j| j.id == id)?;
        if let Some(title) = req.title {
            job.title = title;
        }
        if let Some(description) = req.description {
            job.description = description;
        }
        if let Some(department) = req.department {
            job.department = Some(department);
        }
        if let Some(employment_type) = req.employment_type {
            job.employment_type = employment_type;
        }
        if let Some(experience_level) = req.experience_level {
            job.experience_level = experience_level;
        }
        if let Some(location) = req.location {
            job.location = Some(location);
        }
        if let Some(remote_work) = req.remote_work {
            job.remote_work = remote_work;
        }
        if let Some(skills) = req.skills {
            job.skills = Some(skills);
        }
        if let Some(salary_min) = req.salary_min {
            job.salary_min = Some(salary_min);
        }
        if let Some(salary_max) = req.salary_max {
            job.salary_max = Some(salary_max);
        }
        if let Some(deadline) = req.deadline {
            job.deadline = Some(deadline);
        }
        if let Some(status) = req.status {
            job.status = status;
        }
        Some(job.clone())
    }

    async fn get_application(&self, id: i32) -> Option<Application> {
        let store = self.inner.lock().unwrap();
        store.applications.iter().find(|a| a.id == id).cloned()
    }

    async fn find_application(&self, job_id: i32, candidate_id: i32) -> Option<Application> {
        let store = self.inner.lock().unwrap();
        store
            .applications
            .iter()
            .find(|a| a.job_id == job_id && a.candidate_id == candidate_id)
            .cloned()
    }

    async fn create_application(
        &self,
        req: CreateApplicationRequest,
        candidate_id: i32,
    ) -> Option<Application> {
        let mut store = self.inner.lock().unwrap();
        // FK: both sides must exist.
        if !store.jobs.iter().any(|j| j.id == req.job_id) {
            return None;
        }
        if !store.users.iter().any(|u| u.id == candidate_id) {
            return None;
        }
        // UNIQUE (job_id, candidate_id) backstop.
        if store
            .applications
            .iter()
            .any(|a| a.job_id == req.job_id && a.candidate_id == candidate_id)
        {
            return None;
        }
        let id = store.next_id();
        let application = Application {
            id,
            job_id: req.job_id,
            candidate_id,
            status: req.status.unwrap_or_else(|| "pending".to_string()),
            applied_at: store.stamp(id),
            interview_date: req.interview_date,
            notes: req.notes,
        };
        store.applications.push(application.clone());
        Some(application)
    }

    async fn get_applications_by_candidate(&self, candidate_id: i32) -> Vec<Application> {
        let store = self.inner.lock().unwrap();
        let mut applications: Vec<Application> = store
            .applications
            .iter()
            .filter(|a| a.candidate_id == candidate_id)
            .cloned()
            .collect();
        applications.sort_by(|a, b| (b.applied_at, b.id).cmp(&(a.applied_at, a.id)));
        applications
    }

    async fn get_applications_for_job(&self, job_id: i32) -> Vec<Application> {
        let store = self.inner.lock().unwrap();
        store
            .applications
            .iter()
            .filter(|a| a.job_id == job_id)
            .cloned()
            .collect()
    }

    async fn get_applications_for_jobs(&self, job_ids: &[i32]) -> Vec<Application> {
        let store = self.inner.lock().unwrap();
        store
            .applications
            .iter()
            .filter(|a| job_ids.contains(&a.job_id))
            .cloned()
            .collect()
    }

    async fn update_application(
        &self,
        id: i32,
        req: UpdateApplicationRequest,
    ) -> Option<Application> {
        let mut store = self.inner.lock().unwrap();
        let application = store.applications.iter_mut().find(|a| a.id == id)?;
        if let Some(status) = req.status {
            application.status = status;
        }
        if let Some(interview_date) = req.interview_date {
            application.interview_date = Some(interview_date);
        }
        if let Some(notes) = req.notes {
            application.notes = Some(notes);
        }
        Some(application.clone())
    }

    async fn get_agency_candidates(&self, agency_id: i32) -> Vec<AgencyCandidate> {
        let store = self.inner.lock().unwrap();
        let mut entries: Vec<AgencyCandidate> = store
            .agency_candidates
            .iter()
            .filter(|c| c.agency_id == agency_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| (b.added_at, b.id).cmp(&(a.added_at, a.id)));
        entries
    }

    async fn create_agency_candidate(
        &self,
        req: CreateAgencyCandidateRequest,
        agency_id: i32,
    ) -> Option<AgencyCandidate> {
        let mut store = self.inner.lock().unwrap();
        // FK: both users must exist.
        if !store.users.iter().any(|u| u.id == agency_id) {
            return None;
        }
        if !store.users.iter().any(|u| u.id == req.candidate_id) {
            return None;
        }
        let id = store.next_id();
        let entry = AgencyCandidate {
            id,
            agency_id,
            candidate_id: req.candidate_id,
            specialization: req.specialization,
            experience: req.experience,
            rating: req.rating.unwrap_or(0),
            status: req.status.unwrap_or_else(|| "available".to_string()),
            added_at: store.stamp(id),
        };
        store.agency_candidates.push(entry.clone());
        Some(entry)
    }
}

// --- Test State Scaffolding ---

/// Builds an AppState backed by a fresh MemoryRepository, returning both so
/// tests can reach past the handlers and inspect raw storage.
pub fn test_state() -> (Arc<MemoryRepository>, AppState) {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState {
        repo: repo.clone() as RepositoryState,
        config: AppConfig::default(),
    };
    (repo, state)
}

/// Seeds a user with a real argon2 digest so both direct handler calls and
/// full login round-trips work against it.
pub async fn seed_user(state: &AppState, email: &str, password: &str, role: Role) -> User {
    let digest = auth::hash_password(password).expect("hashing failed");
    state
        .repo
        .create_user(NewUser {
            email: email.to_string(),
            password: digest,
            name: format!("{} user", role.as_str()),
            role,
            company_name: (role == Role::Company).then(|| "Acme Ltd".to_string()),
            agency_name: (role == Role::Agency).then(|| "TalentBridge".to_string()),
        })
        .await
        .expect("seed user failed")
}

/// Issues a bearer token for a seeded user with the test config's secret.
pub fn bearer_for(state: &AppState, user_id: i32) -> String {
    let token = auth::issue_token(user_id, &state.config.jwt_secret).expect("token issue failed");
    format!("Bearer {token}")
}

/// A minimal valid job payload; tests tweak fields as needed.
pub fn sample_job_request(title: &str) -> CreateJobRequest {
    CreateJobRequest {
        title: title.to_string(),
        description: "Build and operate backend services".to_string(),
        department: Some("Engineering".to_string()),
        employment_type: "full-time".to_string(),
        experience_level: "mid".to_string(),
        location: Some("Remote".to_string()),
        remote_work: "yes".to_string(),
        skills: Some("rust, sql".to_string()),
        salary_min: Some(60_000),
        salary_max: Some(90_000),
        deadline: None,
    }
}
