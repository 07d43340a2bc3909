//! Filters the job board applies to listings it has already fetched.

use serde::{Deserialize, Serialize};

use super::domain::{Application, ApplicationStatus, Job};

/// Salary buckets offered by the job search page, keyed on the top of the advertised range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalaryBand {
    /// Up to 50,000.
    Low,
    /// Above 50,000 and up to 100,000.
    Medium,
    /// Above 100,000.
    High,
}

impl SalaryBand {
    pub fn contains(self, max_salary: f64) -> bool {
        match self {
            SalaryBand::Low => max_salary <= 50_000.0,
            SalaryBand::Medium => max_salary > 50_000.0 && max_salary <= 100_000.0,
            SalaryBand::High => max_salary > 100_000.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobFilter {
    /// Matched case-insensitively against title, company and description.
    pub search: String,
    /// Substring match on location, ignoring case.
    pub location: String,
    /// Exact match on job type.
    pub job_type: Option<String>,
    pub salary_band: Option<SalaryBand>,
}

impl JobFilter {
    pub fn matches(&self, job: &Job) -> bool {
        let posting = &job.posting;
        let search = self.search.trim().to_lowercase();
        let matches_search = search.is_empty()
            || contains_ignoring_case(&posting.title, &search)
            || contains_ignoring_case(&posting.company, &search)
            || contains_ignoring_case(&posting.description, &search);

        let location = self.location.trim().to_lowercase();
        let matches_location =
            location.is_empty() || contains_ignoring_case(&posting.location, &location);

        let matches_job_type = self
            .job_type
            .as_deref()
            .map_or(true, |job_type| posting.job_type == job_type);

        let matches_salary = self
            .salary_band
            .map_or(true, |band| band.contains(posting.salary_range.max));

        matches_search && matches_location && matches_job_type && matches_salary
    }

    pub fn apply<'a>(&self, jobs: &'a [Job]) -> Vec<&'a Job> {
        jobs.iter().filter(|job| self.matches(job)).collect()
    }
}

/// An application joined with the job it references, as the applicant dashboard shows it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    pub application: Application,
    #[serde(
        rename = "jobDetails",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub job: Option<Job>,
}

/// Tab selected on the applicant dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ApplicationView {
    #[default]
    All,
    Status(ApplicationStatus),
    /// Applications whose job sits in this category.
    Category(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationFilter {
    pub view: ApplicationView,
    /// Matched against job title, company, location, category, job type and the applicant.
    pub search: String,
}

impl ApplicationFilter {
    pub fn matches(&self, entry: &ApplicationWithJob) -> bool {
        let in_view = match &self.view {
            ApplicationView::All => true,
            ApplicationView::Status(status) => entry.application.effective_status() == *status,
            ApplicationView::Category(category) => entry
                .job
                .as_ref()
                .is_some_and(|job| &job.posting.category == category),
        };
        if !in_view {
            return false;
        }

        let search = self.search.trim().to_lowercase();
        if search.is_empty() {
            return true;
        }

        let submission = &entry.application.submission;
        let job_fields = entry.job.as_ref().map(|job| {
            [
                job.posting.title.as_str(),
                job.posting.company.as_str(),
                job.posting.location.as_str(),
                job.posting.category.as_str(),
                job.posting.job_type.as_str(),
            ]
        });

        job_fields
            .into_iter()
            .flatten()
            .chain([submission.full_name.as_str(), submission.email.as_str()])
            .any(|field| contains_ignoring_case(field, &search))
    }

    pub fn apply<'a>(&self, entries: &'a [ApplicationWithJob]) -> Vec<&'a ApplicationWithJob> {
        entries.iter().filter(|entry| self.matches(entry)).collect()
    }
}

fn contains_ignoring_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}
