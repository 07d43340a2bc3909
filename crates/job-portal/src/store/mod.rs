//! Document store backends for the job and application repositories.

pub mod memory;
pub mod mongo;

use mongodb::bson::oid::ObjectId;

use crate::portal::repository::StoreError;

pub use memory::{InMemoryApplicationRepository, InMemoryJobRepository};
pub use mongo::{MongoApplicationRepository, MongoJobRepository, MongoStore};

pub const JOBS_COLLECTION: &str = "jobs";
pub const APPLICATIONS_COLLECTION: &str = "applications";

/// Identifiers are 24-digit hex ObjectIds in every backend.
pub(crate) fn parse_object_id(raw: &str) -> Result<ObjectId, StoreError> {
    ObjectId::parse_str(raw.trim()).map_err(|_| StoreError::InvalidIdentifier(raw.to_string()))
}
