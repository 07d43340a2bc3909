//! Job postings and candidate applications: typed documents, repository contracts, the
//! service facade and its HTTP router.

pub mod auth;
pub mod catalog;
pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use auth::{AuthError, Caller, Identity, TokenRegistry};
pub use catalog::{ApplicationFilter, ApplicationView, ApplicationWithJob, JobFilter, SalaryBand};
pub use domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationSubmission, Currency, FieldError,
    Job, JobId, JobPosting, JobStatus, SalaryRange, StatusUpdate, ValidationError,
};
pub use repository::{
    ApplicationRepository, InsertOutcome, JobRepository, StoreError, UpdateOutcome,
};
pub use router::{portal_router, PortalState};
pub use service::{JobPortalService, PortalError};
