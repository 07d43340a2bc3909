use std::future::Future;

use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationStatus, ApplicationSubmission, Job, JobPosting};

/// Acknowledgement returned for every insert, shaped like the document driver's result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: String,
}

impl InsertOutcome {
    pub fn acknowledged(inserted_id: impl Into<String>) -> Self {
        Self {
            acknowledged: true,
            inserted_id: inserted_id.into(),
        }
    }
}

/// Result of a single-document status write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Read/write access to the `jobs` collection.
///
/// Filters are exact, case-sensitive equality matches and results carry no ordering
/// guarantee.
pub trait JobRepository: Send + Sync {
    fn list_all(&self) -> impl Future<Output = Result<Vec<Job>, StoreError>> + Send;

    /// An empty `hr_email` matches every job.
    fn list_by_poster(
        &self,
        hr_email: &str,
    ) -> impl Future<Output = Result<Vec<Job>, StoreError>> + Send;

    /// Malformed identifiers fail with [`StoreError::InvalidIdentifier`]; unknown but
    /// well-formed ones resolve to `None`.
    fn get_by_id(&self, id: &str) -> impl Future<Output = Result<Option<Job>, StoreError>> + Send;

    fn create(
        &self,
        posting: JobPosting,
    ) -> impl Future<Output = Result<InsertOutcome, StoreError>> + Send;
}

/// Read/write access to the `applications` collection.
pub trait ApplicationRepository: Send + Sync {
    fn create(
        &self,
        submission: ApplicationSubmission,
    ) -> impl Future<Output = Result<InsertOutcome, StoreError>> + Send;

    fn list_by_applicant(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Vec<Application>, StoreError>> + Send;

    fn list_by_job(
        &self,
        job_id: &str,
    ) -> impl Future<Output = Result<Vec<Application>, StoreError>> + Send;

    fn get_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Application>, StoreError>> + Send;

    /// Sets the status field only; an unknown application reports zero matches.
    fn update_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> impl Future<Output = Result<UpdateOutcome, StoreError>> + Send;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("stored document could not be decoded: {0}")]
    Decode(String),
}
