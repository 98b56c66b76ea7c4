use clap::Args;
use std::path::{Path, PathBuf};
use talent_sift::config::AppConfig;
use talent_sift::error::AppError;
use talent_sift::telemetry;
use talent_sift::workflows::screening::{
    OrganizationId, PostingDraft, ResumeAttachment, SubmissionContext, SubmissionError,
    SubmissionStatusView, YearsOfExperience,
};
use tracing::info;

use crate::infra::build_screening_service;

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// Job title for the posting
    #[arg(long)]
    pub(crate) title: String,
    /// Employment type: fulltime, parttime, contract, freelance, or internship
    #[arg(long)]
    pub(crate) job_type: String,
    /// Years of experience required (clamped to 0..=30)
    #[arg(long)]
    pub(crate) years: Option<String>,
    /// Comma-separated required skills
    #[arg(long, default_value = "")]
    pub(crate) skills: String,
    /// Job description; HTML markup is stripped before ranking
    #[arg(long)]
    pub(crate) description: String,
    /// Resume file to rank (repeat for multiple files)
    #[arg(long = "resume", required = true)]
    pub(crate) resumes: Vec<PathBuf>,
    /// Where ranked candidates go: ticketing or automation
    #[arg(long, default_value = "")]
    pub(crate) destination: String,
    /// Organization identifier forwarded to the ranking service (defaults to 1)
    #[arg(long)]
    pub(crate) org_id: Option<String>,
}

pub(crate) async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let service = build_screening_service(&config.integrations)?;

    let mut draft = PostingDraft {
        title: args.title,
        job_type: args.job_type,
        years_of_experience: args.years.as_deref().and_then(YearsOfExperience::from_input),
        required_skills: args.skills,
        description: args.description,
        ..PostingDraft::default()
    };
    for path in &args.resumes {
        draft.attachments.push(read_attachment(path).await?);
    }
    info!(resumes = draft.attachments.len(), "submitting posting");

    let context = SubmissionContext::new(
        args.destination,
        OrganizationId::from_param(args.org_id.as_deref()),
    );

    match service.submit(draft, context).await {
        Ok(receipt) => {
            print_json(&receipt.status_view());
            Ok(())
        }
        Err(SubmissionError::NotRecorded { ranked, source }) => {
            println!(
                "Ranking succeeded for {ranked} candidates, but the record system rejected the batch."
            );
            Err(SubmissionError::NotRecorded { ranked, source }.into())
        }
        Err(error) => Err(error.into()),
    }
}

async fn read_attachment(path: &Path) -> Result<ResumeAttachment, AppError> {
    let content = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let content_type = mime_guess::from_path(path).first_or_octet_stream();

    Ok(ResumeAttachment::new(file_name, content).with_content_type(content_type.essence_str()))
}

fn print_json(value: &SubmissionStatusView) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("Submission outcome unavailable: {err}"),
    }
}
