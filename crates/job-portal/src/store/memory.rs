use std::sync::{Arc, Mutex, MutexGuard};

use mongodb::bson::oid::ObjectId;

use super::parse_object_id;
use crate::portal::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationSubmission, Job, JobId, JobPosting,
};
use crate::portal::repository::{
    ApplicationRepository, InsertOutcome, JobRepository, StoreError, UpdateOutcome,
};

/// Process-local `jobs` collection. Documents keep insertion order.
#[derive(Default, Clone)]
pub struct InMemoryJobRepository {
    records: Arc<Mutex<Vec<Job>>>,
}

impl InMemoryJobRepository {
    fn records(&self) -> Result<MutexGuard<'_, Vec<Job>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("jobs collection lock poisoned".to_string()))
    }
}

impl JobRepository for InMemoryJobRepository {
    async fn list_all(&self) -> Result<Vec<Job>, StoreError> {
        Ok(self.records()?.clone())
    }

    async fn list_by_poster(&self, hr_email: &str) -> Result<Vec<Job>, StoreError> {
        let guard = self.records()?;
        Ok(guard
            .iter()
            .filter(|job| hr_email.is_empty() || job.posting.hr_email == hr_email)
            .cloned()
            .collect())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Job>, StoreError> {
        let id = parse_object_id(id)?.to_hex();
        let guard = self.records()?;
        Ok(guard.iter().find(|job| job.id.0 == id).cloned())
    }

    async fn create(&self, posting: JobPosting) -> Result<InsertOutcome, StoreError> {
        let id = ObjectId::new().to_hex();
        self.records()?.push(Job {
            id: JobId(id.clone()),
            posting,
        });
        Ok(InsertOutcome::acknowledged(id))
    }
}

/// Process-local `applications` collection.
#[derive(Default, Clone)]
pub struct InMemoryApplicationRepository {
    records: Arc<Mutex<Vec<Application>>>,
}

impl InMemoryApplicationRepository {
    fn records(&self) -> Result<MutexGuard<'_, Vec<Application>>, StoreError> {
        self.records.lock().map_err(|_| {
            StoreError::Unavailable("applications collection lock poisoned".to_string())
        })
    }

    fn select<F>(&self, predicate: F) -> Result<Vec<Application>, StoreError>
    where
        F: Fn(&Application) -> bool,
    {
        let guard = self.records()?;
        Ok(guard
            .iter()
            .filter(|application| predicate(application))
            .cloned()
            .collect())
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    async fn create(&self, submission: ApplicationSubmission) -> Result<InsertOutcome, StoreError> {
        let id = ObjectId::new().to_hex();
        self.records()?.push(Application {
            id: ApplicationId(id.clone()),
            submission,
        });
        Ok(InsertOutcome::acknowledged(id))
    }

    async fn list_by_applicant(&self, email: &str) -> Result<Vec<Application>, StoreError> {
        self.select(|application| application.submission.email == email)
    }

    async fn list_by_job(&self, job_id: &str) -> Result<Vec<Application>, StoreError> {
        self.select(|application| application.submission.job_id.0 == job_id)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Application>, StoreError> {
        let id = parse_object_id(id)?.to_hex();
        let guard = self.records()?;
        Ok(guard
            .iter()
            .find(|application| application.id.0 == id)
            .cloned())
    }

    async fn update_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<UpdateOutcome, StoreError> {
        let id = parse_object_id(id)?.to_hex();
        let mut guard = self.records()?;

        let (matched_count, modified_count) =
            match guard.iter_mut().find(|application| application.id.0 == id) {
                Some(application) if application.submission.status == Some(status) => (1, 0),
                Some(application) => {
                    application.submission.status = Some(status);
                    (1, 1)
                }
                None => (0, 0),
            };

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count,
            modified_count,
        })
    }
}
