use std::sync::Arc;

use tracing::debug;

use super::auth::{AuthError, Caller};
use super::domain::{
    Application, ApplicationStatus, ApplicationSubmission, Job, JobPosting, ValidationError,
};
use super::repository::{
    ApplicationRepository, InsertOutcome, JobRepository, StoreError, UpdateOutcome,
};

/// Facade pairing the job and application repositories.
///
/// On an open deployment every operation maps to exactly one repository call. Verified
/// callers additionally pass an ownership check, which may read the job (and application)
/// being acted on first.
pub struct JobPortalService<J, A> {
    jobs: Arc<J>,
    applications: Arc<A>,
}

impl<J, A> JobPortalService<J, A>
where
    J: JobRepository + 'static,
    A: ApplicationRepository + 'static,
{
    pub fn new(jobs: Arc<J>, applications: Arc<A>) -> Self {
        Self { jobs, applications }
    }

    pub async fn list_jobs(&self) -> Result<Vec<Job>, PortalError> {
        Ok(self.jobs.list_all().await?)
    }

    /// Jobs advertised by `hr_email`. A blank email applies no filter and lists every job.
    pub async fn list_by_poster(&self, hr_email: &str) -> Result<Vec<Job>, PortalError> {
        Ok(self.jobs.list_by_poster(hr_email).await?)
    }

    pub async fn get_job(&self, id: &str) -> Result<Option<Job>, PortalError> {
        Ok(self.jobs.get_by_id(id).await?)
    }

    pub async fn create_job(
        &self,
        caller: &Caller,
        posting: JobPosting,
    ) -> Result<InsertOutcome, PortalError> {
        posting.validate()?;
        caller.require_email(&posting.hr_email)?;

        let outcome = self.jobs.create(posting).await?;
        debug!(job_id = %outcome.inserted_id, "job posted");
        Ok(outcome)
    }

    /// Stores an application as submitted. Repeat submissions for the same job are accepted.
    pub async fn apply(
        &self,
        caller: &Caller,
        submission: ApplicationSubmission,
    ) -> Result<InsertOutcome, PortalError> {
        submission.validate()?;
        caller.require_email(&submission.email)?;

        let outcome = self.applications.create(submission).await?;
        debug!(application_id = %outcome.inserted_id, "application received");
        Ok(outcome)
    }

    pub async fn list_by_applicant(
        &self,
        caller: &Caller,
        email: &str,
    ) -> Result<Vec<Application>, PortalError> {
        caller.require_email(email)?;
        Ok(self.applications.list_by_applicant(email).await?)
    }

    pub async fn list_by_job(
        &self,
        caller: &Caller,
        job_id: &str,
    ) -> Result<Vec<Application>, PortalError> {
        self.require_poster(caller, job_id).await?;
        Ok(self.applications.list_by_job(job_id).await?)
    }

    pub async fn update_status(
        &self,
        caller: &Caller,
        application_id: &str,
        status: ApplicationStatus,
    ) -> Result<UpdateOutcome, PortalError> {
        if caller.identity().is_some() {
            let application = self
                .applications
                .get_by_id(application_id)
                .await?
                .ok_or_else(|| PortalError::NotFound(format!("application {application_id}")))?;
            self.require_poster(caller, &application.submission.job_id.0)
                .await?;
        }

        let outcome = self
            .applications
            .update_status(application_id, status)
            .await?;
        debug!(
            %application_id,
            %status,
            modified = outcome.modified_count,
            "application status written"
        );
        Ok(outcome)
    }

    async fn require_poster(&self, caller: &Caller, job_id: &str) -> Result<(), PortalError> {
        if caller.identity().is_none() {
            return Ok(());
        }

        let job = self
            .jobs
            .get_by_id(job_id)
            .await?
            .ok_or_else(|| PortalError::NotFound(format!("job {job_id}")))?;
        caller.require_email(&job.posting.hr_email)?;
        Ok(())
    }
}

/// Error raised by the portal service.
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0} not found")]
    NotFound(String),
}
