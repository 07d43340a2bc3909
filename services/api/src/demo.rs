use chrono::{Duration, Local};
use clap::Args;
use job_portal::error::AppError;
use job_portal::portal::{
    ApplicationFilter, ApplicationStatus, ApplicationSubmission, ApplicationView,
    ApplicationWithJob, Caller, Currency, JobFilter, JobId, JobPortalService, JobPosting,
    JobStatus, PortalError, SalaryRange,
};
use job_portal::store::{InMemoryApplicationRepository, InMemoryJobRepository};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Recruiter email the demo job is posted under
    #[arg(long, default_value = "hr@x.com")]
    pub(crate) poster: String,
    /// Candidate email used for the demo applications
    #[arg(long, default_value = "a@b.com")]
    pub(crate) applicant: String,
    /// Final status the recruiter assigns (pending, interview, hired, rejected)
    #[arg(long, default_value = "hired")]
    pub(crate) status: ApplicationStatus,
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        poster,
        applicant,
        status,
    } = args;

    let service = JobPortalService::new(
        Arc::new(InMemoryJobRepository::default()),
        Arc::new(InMemoryApplicationRepository::default()),
    );
    let caller = Caller::Anonymous;

    println!("Job portal demo (in-memory store)");

    let mut job_ids = Vec::new();
    for posting in demo_postings(&poster) {
        let title = posting.title.clone();
        let outcome = service
            .create_job(&caller, posting)
            .await
            .map_err(portal_failure)?;
        println!("- Posted '{}' -> {}", title, outcome.inserted_id);
        job_ids.push(outcome.inserted_id);
    }

    let jobs = service.list_jobs().await.map_err(portal_failure)?;
    let remote = JobFilter {
        job_type: Some("Remote".to_string()),
        ..JobFilter::default()
    };
    println!(
        "- {} jobs listed, {} remote",
        jobs.len(),
        remote.apply(&jobs).len()
    );

    let Some(job_id) = job_ids.first().cloned() else {
        return Ok(());
    };

    println!("\nApplications");
    let mut application_ids = Vec::new();
    for attempt in 1..=2 {
        let submission = demo_submission(&job_id, &applicant);
        match service.apply(&caller, submission).await {
            Ok(outcome) => {
                println!(
                    "- Submission {} for {} stored as {}",
                    attempt, job_id, outcome.inserted_id
                );
                application_ids.push(outcome.inserted_id);
            }
            Err(err) => println!("  Submission rejected: {}", err),
        }
    }

    let invalid = ApplicationSubmission {
        full_name: String::new(),
        email: "not-an-email".to_string(),
        ..demo_submission(&job_id, &applicant)
    };
    if let Err(err) = service.apply(&caller, invalid).await {
        println!("- Incomplete submission refused: {}", err);
    }

    println!("\nReview");
    if let Some(application_id) = application_ids.first() {
        for _ in 0..2 {
            match service.update_status(&caller, application_id, status).await {
                Ok(outcome) => println!(
                    "- {} -> {} (matched {}, modified {})",
                    application_id, status, outcome.matched_count, outcome.modified_count
                ),
                Err(err) => println!("  Status update failed: {}", err),
            }
        }
    }

    let applicants = service
        .list_by_job(&caller, &job_id)
        .await
        .map_err(portal_failure)?;
    for application in &applicants {
        println!(
            "- {} <{}>: {}",
            application.submission.full_name,
            application.submission.email,
            application.effective_status()
        );
    }

    println!("\nApplicant dashboard for {}", applicant);
    let job = service.get_job(&job_id).await.map_err(portal_failure)?;
    let entries: Vec<ApplicationWithJob> = service
        .list_by_applicant(&caller, &applicant)
        .await
        .map_err(portal_failure)?
        .into_iter()
        .map(|application| ApplicationWithJob {
            application,
            job: job.clone(),
        })
        .collect();

    for status in ApplicationStatus::ordered() {
        let filter = ApplicationFilter {
            view: ApplicationView::Status(status),
            search: String::new(),
        };
        println!("  {}: {}", status, filter.apply(&entries).len());
    }

    match serde_json::to_string_pretty(&entries) {
        Ok(json) => println!("  Payload:\n{}", json),
        Err(err) => println!("  Payload unavailable: {}", err),
    }

    Ok(())
}

fn portal_failure(err: PortalError) -> AppError {
    match err {
        PortalError::Store(store) => AppError::Store(store),
        other => AppError::Io(std::io::Error::other(other.to_string())),
    }
}

fn demo_postings(poster: &str) -> Vec<JobPosting> {
    let deadline = Local::now().date_naive() + Duration::days(30);
    [
        ("Backend Engineer", "Dhaka", "Onsite", "Engineering", 60_000.0, 90_000.0),
        ("Product Designer", "Remote", "Remote", "Design", 40_000.0, 55_000.0),
    ]
    .into_iter()
    .map(|(title, location, job_type, category, min, max)| JobPosting {
        title: title.to_string(),
        company: "Acme Labs".to_string(),
        location: location.to_string(),
        job_type: job_type.to_string(),
        category: category.to_string(),
        salary_range: SalaryRange {
            min,
            max,
            currency: Currency::Bdt,
        },
        application_deadline: deadline,
        description: format!("{title} for the hiring platform team"),
        requirements: vec!["3+ years of experience".to_string()],
        responsibilities: vec!["Own features end to end".to_string()],
        status: JobStatus::Active,
        hr_email: poster.to_string(),
        hr_name: "Demo Recruiter".to_string(),
        company_logo: String::new(),
    })
    .collect()
}

fn demo_submission(job_id: &str, email: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        job_id: JobId(job_id.to_string()),
        full_name: "Demo Candidate".to_string(),
        email: email.to_string(),
        phone: None,
        portfolio: Some("https://portfolio.example".to_string()),
        cover_letter: Some("Looking forward to talking.".to_string()),
        resume: None,
        status: None,
    }
}
