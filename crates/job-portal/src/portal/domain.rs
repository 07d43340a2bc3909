use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a job posting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-assigned identifier of a submitted application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Bdt,
    Usd,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: f64,
    pub max: f64,
    pub currency: Currency,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Active,
    Inactive,
}

/// Fields a poster submits when advertising a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "jobType")]
    pub job_type: String,
    pub category: String,
    #[serde(rename = "salaryRange")]
    pub salary_range: SalaryRange,
    #[serde(rename = "applicationDeadline")]
    pub application_deadline: NaiveDate,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
    #[serde(default)]
    pub status: JobStatus,
    pub hr_email: String,
    #[serde(default)]
    pub hr_name: String,
    #[serde(default)]
    pub company_logo: String,
}

impl JobPosting {
    /// Boundary check run before a posting reaches the store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        require_text(&mut issues, "title", &self.title);
        require_text(&mut issues, "company", &self.company);
        require_text(&mut issues, "location", &self.location);

        if !self.salary_range.min.is_finite() || !self.salary_range.max.is_finite() {
            issues.push(FieldError::new("salaryRange", "bounds must be finite numbers"));
        } else if self.salary_range.min < 0.0 {
            issues.push(FieldError::new("salaryRange.min", "must not be negative"));
        } else if self.salary_range.min > self.salary_range.max {
            issues.push(FieldError::new("salaryRange", "min must not exceed max"));
        }

        if !looks_like_email(&self.hr_email) {
            issues.push(FieldError::new("hr_email", "must be an email address"));
        }

        ValidationError::from_issues(issues)
    }
}

/// A posted position as read back from the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    #[serde(rename = "_id")]
    pub id: JobId,
    #[serde(flatten)]
    pub posting: JobPosting,
}

/// Application progress values offered to posters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ApplicationStatus {
    Pending,
    Interview,
    Hired,
    Rejected,
}

impl ApplicationStatus {
    pub fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Hired => "Hired",
            ApplicationStatus::Rejected => "Rejected",
        }
    }

    pub fn ordered() -> [ApplicationStatus; 4] {
        [
            ApplicationStatus::Pending,
            ApplicationStatus::Interview,
            ApplicationStatus::Hired,
            ApplicationStatus::Rejected,
        ]
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ApplicationStatus {
    type Err = FieldError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "interview" => Ok(Self::Interview),
            // "accepted" is what the applicant dashboard filters on
            "hired" | "accepted" => Ok(Self::Hired),
            "rejected" => Ok(Self::Rejected),
            _ => Err(FieldError::new(
                "status",
                "expected one of Pending, Interview, Hired, Rejected",
            )),
        }
    }
}

impl TryFrom<String> for ApplicationStatus {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ApplicationStatus> for &'static str {
    fn from(value: ApplicationStatus) -> Self {
        value.label()
    }
}

/// Fields a candidate submits against a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSubmission {
    /// Plain reference to a job id; the store does not check that the job exists.
    #[serde(rename = "jobId")]
    pub job_id: JobId,
    #[serde(rename = "fullName")]
    pub full_name: String,
    pub email: String,
    #[serde(
        default,
        deserialize_with = "free_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "free_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub portfolio: Option<String>,
    #[serde(
        rename = "coverLetter",
        default,
        deserialize_with = "free_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub cover_letter: Option<String>,
    /// Kept as submitted. Browsers post a file input as `{}`, and links arrive as strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ApplicationStatus>,
}

impl ApplicationSubmission {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();
        require_text(&mut issues, "jobId", &self.job_id.0);
        require_text(&mut issues, "fullName", &self.full_name);
        if !looks_like_email(&self.email) {
            issues.push(FieldError::new("email", "must be an email address"));
        }
        ValidationError::from_issues(issues)
    }
}

/// A submitted application as read back from the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    #[serde(rename = "_id")]
    pub id: ApplicationId,
    #[serde(flatten)]
    pub submission: ApplicationSubmission,
}

impl Application {
    /// Status shown to users; applications nobody has reviewed read as pending.
    pub fn effective_status(&self) -> ApplicationStatus {
        self.submission.status.unwrap_or(ApplicationStatus::Pending)
    }
}

/// Body of a status change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{field} {reason}")]
pub struct FieldError {
    pub field: &'static str,
    pub reason: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

/// Every problem found in a rejected payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub issues: Vec<FieldError>,
}

impl ValidationError {
    fn from_issues(issues: Vec<FieldError>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self { issues })
        }
    }

    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid payload: ")?;
        for (index, issue) in self.issues.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl From<FieldError> for ValidationError {
    fn from(value: FieldError) -> Self {
        Self {
            issues: vec![value],
        }
    }
}

/// Optional form text. Numbers and booleans keep their text form; objects, arrays and
/// null carry no text.
fn free_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(text) => Some(text),
        serde_json::Value::Number(number) => Some(number.to_string()),
        serde_json::Value::Bool(flag) => Some(flag.to_string()),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    })
}

fn require_text(issues: &mut Vec<FieldError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        issues.push(FieldError::new(field, "must not be empty"));
    }
}

fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    match value.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn posting_json() -> serde_json::Value {
        json!({
            "title": "Engineer",
            "company": "Acme",
            "location": "Dhaka",
            "jobType": "Hybrid",
            "category": "Engineering",
            "salaryRange": { "min": 40000, "max": 60000, "currency": "bdt" },
            "applicationDeadline": "2025-12-31",
            "description": "Build things",
            "requirements": ["Rust", "SQL"],
            "responsibilities": ["Ship"],
            "status": "active",
            "hr_email": "hr@x.com",
            "hr_name": "Hana",
            "company_logo": "https://acme.test/logo.png"
        })
    }

    #[test]
    fn posting_reads_frontend_field_names() {
        let posting: JobPosting = serde_json::from_value(posting_json()).expect("posting parses");
        assert_eq!(posting.job_type, "Hybrid");
        assert_eq!(posting.salary_range.currency, Currency::Bdt);
        assert_eq!(posting.salary_range.max, 60000.0);
        assert_eq!(
            posting.application_deadline,
            NaiveDate::from_ymd_opt(2025, 12, 31).expect("valid date")
        );
        assert!(posting.validate().is_ok());
    }

    #[test]
    fn job_serializes_id_alongside_posting_fields() {
        let posting: JobPosting = serde_json::from_value(posting_json()).expect("posting parses");
        let job = Job {
            id: JobId("65f0c0ffee00000000000001".to_string()),
            posting,
        };
        let value = serde_json::to_value(&job).expect("job serializes");
        assert_eq!(value["_id"], json!("65f0c0ffee00000000000001"));
        assert_eq!(value["hr_email"], json!("hr@x.com"));
        assert_eq!(value["salaryRange"]["currency"], json!("bdt"));
    }

    #[test]
    fn posting_validation_collects_every_issue() {
        let mut posting: JobPosting =
            serde_json::from_value(posting_json()).expect("posting parses");
        posting.title = "  ".to_string();
        posting.hr_email = "not-an-email".to_string();
        posting.salary_range.min = 90000.0;

        let error = posting.validate().expect_err("posting rejected");
        assert!(error.mentions("title"));
        assert!(error.mentions("hr_email"));
        assert!(error.mentions("salaryRange"));
        assert_eq!(error.issues.len(), 3);
    }

    #[test]
    fn status_parsing_is_case_insensitive_and_serializes_ui_labels() {
        assert_eq!(
            "hired".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::Hired)
        );
        assert_eq!(
            "Accepted".parse::<ApplicationStatus>(),
            Ok(ApplicationStatus::Hired)
        );
        assert!("archived".parse::<ApplicationStatus>().is_err());

        let update: StatusUpdate =
            serde_json::from_value(json!({ "status": "interview" })).expect("status parses");
        assert_eq!(update.status, ApplicationStatus::Interview);
        assert_eq!(
            serde_json::to_value(update).expect("serializes"),
            json!({ "status": "Interview" })
        );
    }

    #[test]
    fn application_without_status_reads_as_pending() {
        let application: Application = serde_json::from_value(json!({
            "_id": "65f0c0ffee00000000000002",
            "jobId": "J1",
            "fullName": "Ada",
            "email": "a@b.com"
        }))
        .expect("application parses");

        assert_eq!(application.submission.status, None);
        assert_eq!(application.effective_status(), ApplicationStatus::Pending);
        let value = serde_json::to_value(&application).expect("serializes");
        assert!(value.get("status").is_none());
    }

    #[test]
    fn submission_validation_requires_applicant_identity() {
        let submission = ApplicationSubmission {
            job_id: JobId(String::new()),
            full_name: "Ada".to_string(),
            email: "ada at example".to_string(),
            phone: None,
            portfolio: None,
            cover_letter: None,
            resume: None,
            status: None,
        };

        let error = submission.validate().expect_err("submission rejected");
        assert!(error.mentions("jobId"));
        assert!(error.mentions("email"));
        assert!(!error.mentions("fullName"));
    }

    #[test]
    fn browser_apply_form_body_is_accepted() {
        let submission: ApplicationSubmission = serde_json::from_value(json!({
            "jobId": "65f0c0ffee00000000000001",
            "fullName": "Ada",
            "email": "a@b.com",
            "phone": "+880",
            "portfolio": "",
            "coverLetter": "hi",
            "resume": {}
        }))
        .expect("form body parses");

        assert_eq!(submission.resume, Some(json!({})));
        assert_eq!(submission.phone.as_deref(), Some("+880"));
        assert!(submission.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&submission).expect("serializes")["resume"],
            json!({})
        );
    }

    #[test]
    fn free_form_fields_tolerate_non_text_values() {
        let submission: ApplicationSubmission = serde_json::from_value(json!({
            "jobId": "J1",
            "fullName": "Ada",
            "email": "a@b.com",
            "phone": 8801700000000u64,
            "portfolio": null,
            "coverLetter": ["not", "text"],
            "resume": "https://ada.dev/cv.pdf"
        }))
        .expect("submission parses");

        assert_eq!(submission.phone.as_deref(), Some("8801700000000"));
        assert_eq!(submission.portfolio, None);
        assert_eq!(submission.cover_letter, None);
        assert_eq!(submission.resume, Some(json!("https://ada.dev/cv.pdf")));
    }
}
