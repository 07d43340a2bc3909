//! Typed HTTP client for the job board API, used by front ends and the end-to-end tests.

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::portal::catalog::ApplicationWithJob;
use crate::portal::domain::{
    Application, ApplicationStatus, ApplicationSubmission, Job, JobPosting, StatusUpdate,
};
use crate::portal::repository::{InsertOutcome, UpdateOutcome};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server answered {status}: {message}")]
    Api { status: StatusCode, message: String },
}

#[derive(Debug, Clone)]
pub struct PortalClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            token: None,
        }
    }

    /// Sends `Authorization: Bearer <token>` on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub async fn jobs(&self) -> Result<Vec<Job>, ClientError> {
        self.send(self.http.get(self.url("/jobs"))).await
    }

    pub async fn jobs_posted_by(&self, hr_email: &str) -> Result<Vec<Job>, ClientError> {
        let request = self.http.get(self.url("/jobs")).query(&[("email", hr_email)]);
        self.send(request).await
    }

    pub async fn job(&self, id: &str) -> Result<Option<Job>, ClientError> {
        let jobs: Vec<Job> = self
            .send(self.http.get(self.url(&format!("/jobs/{id}"))))
            .await?;
        Ok(jobs.into_iter().next())
    }

    pub async fn post_job(&self, posting: &JobPosting) -> Result<InsertOutcome, ClientError> {
        self.send_json(self.http.post(self.url("/jobs")), posting)
            .await
    }

    pub async fn apply(
        &self,
        submission: &ApplicationSubmission,
    ) -> Result<InsertOutcome, ClientError> {
        self.send_json(self.http.post(self.url("/apply")), submission)
            .await
    }

    pub async fn my_applications(&self, email: &str) -> Result<Vec<Application>, ClientError> {
        let request = self
            .http
            .get(self.url("/applications"))
            .query(&[("email", email)]);
        self.send(request).await
    }

    /// Applications joined with their job. A job that cannot be fetched leaves the
    /// application without details instead of failing the whole listing.
    pub async fn my_applications_with_jobs(
        &self,
        email: &str,
    ) -> Result<Vec<ApplicationWithJob>, ClientError> {
        let applications = self.my_applications(email).await?;
        let mut joined = Vec::with_capacity(applications.len());
        for application in applications {
            let job = match self.job(&application.submission.job_id.0).await {
                Ok(job) => job,
                Err(err) => {
                    debug!(job_id = %application.submission.job_id, %err, "job details unavailable");
                    None
                }
            };
            joined.push(ApplicationWithJob { application, job });
        }
        Ok(joined)
    }

    pub async fn job_applications(&self, job_id: &str) -> Result<Vec<Application>, ClientError> {
        let request = self
            .http
            .get(self.url(&format!("/applications/job/{job_id}")));
        self.send(request).await
    }

    pub async fn update_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<UpdateOutcome, ClientError> {
        let request = self
            .http
            .patch(self.url(&format!("/applications/{application_id}")));
        self.send_json(request, &StatusUpdate { status }).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send_json<B, T>(&self, request: RequestBuilder, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(request.json(body)).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|value| value.get("error")?.as_str().map(str::to_string))
            .unwrap_or(body);
        Err(ClientError::Api { status, message })
    }
}
