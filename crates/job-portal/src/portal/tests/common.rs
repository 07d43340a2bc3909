use std::sync::Arc;

use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::portal::auth::{Caller, Identity, TokenRegistry};
use crate::portal::domain::{
    Application, ApplicationStatus, ApplicationSubmission, Currency, Job, JobId, JobPosting,
    JobStatus, SalaryRange,
};
use crate::portal::repository::{
    ApplicationRepository, InsertOutcome, JobRepository, StoreError, UpdateOutcome,
};
use crate::portal::{portal_router, JobPortalService};
use crate::store::{InMemoryApplicationRepository, InMemoryJobRepository};

pub(super) type MemoryService = JobPortalService<InMemoryJobRepository, InMemoryApplicationRepository>;

pub(super) const POSTER: &str = "hr@x.com";
pub(super) const APPLICANT: &str = "a@b.com";
pub(super) const POSTER_TOKEN: &str = "hr-token";
pub(super) const APPLICANT_TOKEN: &str = "cand-token";

pub(super) fn posting(title: &str, hr_email: &str) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        company: "Acme".to_string(),
        location: "Dhaka".to_string(),
        job_type: "Hybrid".to_string(),
        category: "Engineering".to_string(),
        salary_range: SalaryRange {
            min: 40_000.0,
            max: 60_000.0,
            currency: Currency::Bdt,
        },
        application_deadline: NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date"),
        description: "Build and run the hiring platform".to_string(),
        requirements: vec!["Rust".to_string(), "MongoDB".to_string()],
        responsibilities: vec!["Ship features".to_string()],
        status: JobStatus::Active,
        hr_email: hr_email.to_string(),
        hr_name: "Hana".to_string(),
        company_logo: "https://acme.test/logo.png".to_string(),
    }
}

pub(super) fn submission(job_id: &str, email: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        job_id: JobId(job_id.to_string()),
        full_name: "Ada Lovelace".to_string(),
        email: email.to_string(),
        phone: Some("+8801700000000".to_string()),
        portfolio: Some("https://ada.dev".to_string()),
        cover_letter: Some("I would love to join.".to_string()),
        resume: Some(serde_json::json!("https://ada.dev/cv.pdf")),
        status: None,
    }
}

pub(super) fn build_service() -> (
    MemoryService,
    Arc<InMemoryJobRepository>,
    Arc<InMemoryApplicationRepository>,
) {
    let jobs = Arc::new(InMemoryJobRepository::default());
    let applications = Arc::new(InMemoryApplicationRepository::default());
    let service = JobPortalService::new(jobs.clone(), applications.clone());
    (service, jobs, applications)
}

pub(super) fn tokens() -> TokenRegistry {
    TokenRegistry::from_pairs([(POSTER_TOKEN, POSTER), (APPLICANT_TOKEN, APPLICANT)])
}

pub(super) fn verified(email: &str) -> Caller {
    Caller::Verified(Identity {
        email: email.to_string(),
    })
}

pub(super) fn open_router(service: MemoryService) -> axum::Router {
    portal_router(Arc::new(service), Arc::new(TokenRegistry::open()))
}

pub(super) fn secured_router(service: MemoryService) -> axum::Router {
    portal_router(Arc::new(service), Arc::new(tokens()))
}

pub(super) fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<axum::body::Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            axum::body::Body::from(serde_json::to_vec(&body).expect("serialize body"))
        }
        None => axum::body::Body::empty(),
    };
    builder.body(body).expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected, "unexpected response status");
}

pub(super) struct UnavailableJobs;

impl JobRepository for UnavailableJobs {
    async fn list_all(&self) -> Result<Vec<Job>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn list_by_poster(&self, _hr_email: &str) -> Result<Vec<Job>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn get_by_id(&self, _id: &str) -> Result<Option<Job>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn create(&self, _posting: JobPosting) -> Result<InsertOutcome, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    async fn create(&self, _submission: ApplicationSubmission) -> Result<InsertOutcome, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn list_by_applicant(&self, _email: &str) -> Result<Vec<Application>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn list_by_job(&self, _job_id: &str) -> Result<Vec<Application>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn get_by_id(&self, _id: &str) -> Result<Option<Application>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    async fn update_status(
        &self,
        _id: &str,
        _status: ApplicationStatus,
    ) -> Result<UpdateOutcome, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn unavailable_service() -> JobPortalService<UnavailableJobs, UnavailableApplications> {
    JobPortalService::new(Arc::new(UnavailableJobs), Arc::new(UnavailableApplications))
}
