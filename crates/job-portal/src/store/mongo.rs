use mongodb::bson::{self, doc, Bson, Document};
use mongodb::{Client, Collection, Cursor, Database, IndexModel};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use super::{parse_object_id, APPLICATIONS_COLLECTION, JOBS_COLLECTION};
use crate::portal::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationSubmission, Job, JobId, JobPosting,
};
use crate::portal::repository::{
    ApplicationRepository, InsertOutcome, JobRepository, StoreError, UpdateOutcome,
};

impl From<mongodb::error::Error> for StoreError {
    fn from(value: mongodb::error::Error) -> Self {
        StoreError::Unavailable(value.to_string())
    }
}

/// Handle on the MongoDB database holding both collections.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self {
            database: client.database(database),
        })
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }

    /// Equality filters on poster, applicant and job reference.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        let jobs = self.database.collection::<Document>(JOBS_COLLECTION);
        jobs.create_index(
            IndexModel::builder().keys(doc! { "hr_email": 1 }).build(),
            None,
        )
        .await?;

        let applications = self.database.collection::<Document>(APPLICATIONS_COLLECTION);
        for field in ["email", "jobId"] {
            let mut keys = Document::new();
            keys.insert(field, 1);
            applications
                .create_index(IndexModel::builder().keys(keys).build(), None)
                .await?;
        }

        info!(database = %self.database.name(), "collection indexes ensured");
        Ok(())
    }

    pub fn jobs(&self) -> MongoJobRepository {
        MongoJobRepository {
            collection: self.database.collection(JOBS_COLLECTION),
        }
    }

    pub fn applications(&self) -> MongoApplicationRepository {
        MongoApplicationRepository {
            collection: self.database.collection(APPLICATIONS_COLLECTION),
        }
    }
}

#[derive(Clone)]
pub struct MongoJobRepository {
    collection: Collection<Document>,
}

impl MongoJobRepository {
    async fn find(&self, filter: Document) -> Result<Vec<Job>, StoreError> {
        let cursor = self.collection.find(filter, None).await?;
        collect(cursor, |id, posting| Job {
            id: JobId(id),
            posting,
        })
        .await
    }
}

impl JobRepository for MongoJobRepository {
    async fn list_all(&self) -> Result<Vec<Job>, StoreError> {
        self.find(Document::new()).await
    }

    async fn list_by_poster(&self, hr_email: &str) -> Result<Vec<Job>, StoreError> {
        if hr_email.is_empty() {
            return self.find(Document::new()).await;
        }
        self.find(doc! { "hr_email": hr_email }).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Job>, StoreError> {
        let oid = parse_object_id(id)?;
        let found = self.collection.find_one(doc! { "_id": oid }, None).await?;
        found
            .map(|document| {
                let (id, posting) = split_document(document)?;
                Ok(Job {
                    id: JobId(id),
                    posting,
                })
            })
            .transpose()
    }

    async fn create(&self, posting: JobPosting) -> Result<InsertOutcome, StoreError> {
        insert(&self.collection, &posting).await
    }
}

#[derive(Clone)]
pub struct MongoApplicationRepository {
    collection: Collection<Document>,
}

impl MongoApplicationRepository {
    async fn find(&self, filter: Document) -> Result<Vec<Application>, StoreError> {
        let cursor = self.collection.find(filter, None).await?;
        collect(cursor, |id, submission| Application {
            id: ApplicationId(id),
            submission,
        })
        .await
    }
}

impl ApplicationRepository for MongoApplicationRepository {
    async fn create(&self, submission: ApplicationSubmission) -> Result<InsertOutcome, StoreError> {
        insert(&self.collection, &submission).await
    }

    async fn list_by_applicant(&self, email: &str) -> Result<Vec<Application>, StoreError> {
        self.find(doc! { "email": email }).await
    }

    async fn list_by_job(&self, job_id: &str) -> Result<Vec<Application>, StoreError> {
        self.find(doc! { "jobId": job_id }).await
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Application>, StoreError> {
        let oid = parse_object_id(id)?;
        let found = self.collection.find_one(doc! { "_id": oid }, None).await?;
        found
            .map(|document| {
                let (id, submission) = split_document(document)?;
                Ok(Application {
                    id: ApplicationId(id),
                    submission,
                })
            })
            .transpose()
    }

    async fn update_status(
        &self,
        id: &str,
        status: ApplicationStatus,
    ) -> Result<UpdateOutcome, StoreError> {
        let oid = parse_object_id(id)?;
        let result = self
            .collection
            .update_one(
                doc! { "_id": oid },
                doc! { "$set": { "status": status.label() } },
                None,
            )
            .await?;

        Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }
}

async fn insert<T: Serialize>(
    collection: &Collection<Document>,
    value: &T,
) -> Result<InsertOutcome, StoreError> {
    let result = collection.insert_one(encode(value)?, None).await?;
    Ok(InsertOutcome::acknowledged(bson_id(&result.inserted_id)))
}

async fn collect<T, R, F>(mut cursor: Cursor<Document>, build: F) -> Result<Vec<R>, StoreError>
where
    T: DeserializeOwned,
    F: Fn(String, T) -> R,
{
    let mut records = Vec::new();
    while cursor.advance().await? {
        let document: Document = cursor.deserialize_current()?;
        let (id, body) = split_document(document)?;
        records.push(build(id, body));
    }
    Ok(records)
}

fn encode<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    bson::to_document(value).map_err(|err| StoreError::Decode(err.to_string()))
}

/// Separates the store-assigned `_id` from the typed body of a document.
fn split_document<T: DeserializeOwned>(mut document: Document) -> Result<(String, T), StoreError> {
    let id = document
        .remove("_id")
        .map(|value| bson_id(&value))
        .ok_or_else(|| StoreError::Decode("document has no _id".to_string()))?;
    let body = bson::from_document(document).map_err(|err| StoreError::Decode(err.to_string()))?;
    Ok((id, body))
}

fn bson_id(value: &Bson) -> String {
    match value {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(raw) => raw.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use mongodb::bson::oid::ObjectId;

    use crate::portal::domain::{Currency, JobStatus, SalaryRange};

    fn posting() -> JobPosting {
        JobPosting {
            title: "Backend Engineer".to_string(),
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
            requirements: vec!["Rust".to_string()],
            responsibilities: vec!["Ship features".to_string()],
            status: JobStatus::Active,
            hr_email: "hr@x.com".to_string(),
            hr_name: "Hana".to_string(),
            company_logo: String::new(),
        }
    }

    fn stored_application(oid: ObjectId) -> Document {
        doc! {
            "_id": oid,
            "jobId": "65f0a1b2c3d4e5f601234567",
            "fullName": "Ada",
            "email": "a@b.com",
            "phone": "+880",
            "portfolio": "",
            "coverLetter": "hi",
        }
    }

    #[test]
    fn identifiers_render_as_plain_strings() {
        let oid = ObjectId::new();
        assert_eq!(bson_id(&Bson::ObjectId(oid)), oid.to_hex());
        assert_eq!(bson_id(&Bson::String("legacy-7".to_string())), "legacy-7");
        assert_eq!(bson_id(&Bson::Int32(7)), "7");
    }

    #[test]
    fn encoded_postings_use_the_wire_field_names() {
        let document = encode(&posting()).expect("posting encodes");

        assert!(!document.contains_key("_id"));
        assert_eq!(document.get_str("hr_email").ok(), Some("hr@x.com"));
        assert_eq!(document.get_str("jobType").ok(), Some("Hybrid"));
        assert_eq!(document.get_str("applicationDeadline").ok(), Some("2025-12-31"));
        let salary = document.get_document("salaryRange").expect("salary range");
        assert_eq!(salary.get_str("currency").ok(), Some("bdt"));
    }

    #[test]
    fn encoded_postings_read_back_once_the_store_assigns_an_id() {
        let oid = ObjectId::new();
        let mut document = encode(&posting()).expect("posting encodes");
        document.insert("_id", oid);

        let (id, decoded) = split_document::<JobPosting>(document).expect("document decodes");
        assert_eq!(id, oid.to_hex());
        assert_eq!(decoded, posting());
    }

    #[test]
    fn integer_salary_bounds_decode_as_numbers() {
        let mut document = encode(&posting()).expect("posting encodes");
        document.insert("_id", ObjectId::new());
        document.insert(
            "salaryRange",
            doc! { "min": 40_000_i32, "max": 60_000_i64, "currency": "usd" },
        );

        let (_, decoded) = split_document::<JobPosting>(document).expect("document decodes");
        assert_eq!(decoded.salary_range.min, 40_000.0);
        assert_eq!(decoded.salary_range.max, 60_000.0);
        assert_eq!(decoded.salary_range.currency, Currency::Usd);
    }

    #[test]
    fn applications_without_a_status_read_as_pending() {
        let oid = ObjectId::new();
        let (id, submission) = split_document::<ApplicationSubmission>(stored_application(oid))
            .expect("document decodes");
        let application = Application {
            id: ApplicationId(id),
            submission,
        };

        assert_eq!(application.id.0, oid.to_hex());
        assert_eq!(application.submission.status, None);
        assert_eq!(application.effective_status(), ApplicationStatus::Pending);
    }

    #[test]
    fn lowercase_stored_statuses_are_recognised() {
        let mut document = stored_application(ObjectId::new());
        document.insert("status", "pending");

        let (_, submission) =
            split_document::<ApplicationSubmission>(document).expect("document decodes");
        assert_eq!(submission.status, Some(ApplicationStatus::Pending));
    }

    #[test]
    fn file_placeholder_resumes_decode() {
        let mut document = stored_application(ObjectId::new());
        document.insert("resume", Document::new());

        let (_, submission) =
            split_document::<ApplicationSubmission>(document).expect("document decodes");
        assert_eq!(submission.resume, Some(serde_json::json!({})));
        assert_eq!(submission.portfolio.as_deref(), Some(""));
    }

    #[test]
    fn documents_without_an_id_are_decode_errors() {
        let mut document = stored_application(ObjectId::new());
        document.remove("_id");

        let result = split_document::<ApplicationSubmission>(document);
        assert!(matches!(result, Err(StoreError::Decode(message)) if message.contains("_id")));
    }

    #[test]
    fn documents_missing_required_fields_are_decode_errors() {
        let mut document = stored_application(ObjectId::new());
        document.remove("fullName");

        let result = split_document::<ApplicationSubmission>(document);
        assert!(matches!(result, Err(StoreError::Decode(_))));
    }
}
