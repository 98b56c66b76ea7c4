use serde::Serialize;
use tracing::warn;

use super::domain::{JobPosting, OrganizationId, ResumeAttachment, SubmissionContext};

/// Multipart field carrying the JSON metadata block.
pub const DATA_FIELD: &str = "data";
/// Multipart field shared by every resume part.
pub const RESUMES_FIELD: &str = "resumes";
/// Workflow the ranking service executes for every submission.
pub const RESUME_RANKER_WORKFLOW: &str = "resume_ranker";

const EMPTY_DESCRIPTION: &str = "No description";

/// Metadata block sent alongside the resumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingMetadata {
    pub org_id: i64,
    pub exe_name: String,
    pub workflow_id: &'static str,
    pub job_description: String,
}

/// One file part of the outbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub field: &'static str,
    pub file_name: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

/// Transport-ready representation of a ranking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportPayload {
    pub metadata: RankingMetadata,
    pub parts: Vec<FilePart>,
}

impl TransportPayload {
    pub fn metadata_json(&self) -> Result<String, PayloadError> {
        serde_json::to_string(&self.metadata).map_err(PayloadError::Metadata)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("no attachment could be read as a resume file")]
    NoResolvableAttachment,
    #[error("unable to encode ranking metadata: {0}")]
    Metadata(#[source] serde_json::Error),
    #[error("resume '{file_name}' has an invalid content type '{content_type}'")]
    InvalidContentType {
        file_name: String,
        content_type: String,
    },
}

/// Assembles the ranking request without touching the network.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadBuilder;

impl PayloadBuilder {
    pub fn build(
        &self,
        posting: &JobPosting,
        context: &SubmissionContext,
    ) -> Result<TransportPayload, PayloadError> {
        let parts: Vec<FilePart> = posting
            .attachments
            .iter()
            .filter_map(|attachment| {
                if attachment.is_resolvable() {
                    Some(file_part(attachment))
                } else {
                    warn!(file = %attachment.file_name, "skipping empty resume attachment");
                    None
                }
            })
            .collect();

        if parts.is_empty() {
            return Err(PayloadError::NoResolvableAttachment);
        }

        Ok(TransportPayload {
            metadata: metadata_for(posting, context.organization_id),
            parts,
        })
    }
}

fn metadata_for(posting: &JobPosting, organization_id: OrganizationId) -> RankingMetadata {
    let job_description = if posting.description.is_empty() {
        EMPTY_DESCRIPTION.to_string()
    } else {
        posting.description.clone()
    };

    RankingMetadata {
        org_id: organization_id.0,
        exe_name: posting.skills_label(),
        workflow_id: RESUME_RANKER_WORKFLOW,
        job_description,
    }
}

fn file_part(attachment: &ResumeAttachment) -> FilePart {
    let declared = attachment.content_type.as_deref().filter(|declared| {
        let valid = declared.parse::<mime_guess::Mime>().is_ok();
        if !valid {
            warn!(
                file = %attachment.file_name,
                content_type = %declared,
                "ignoring invalid content type"
            );
        }
        valid
    });
    let content_type = match declared {
        Some(declared) => declared.to_string(),
        None => mime_guess::from_path(&attachment.file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };

    FilePart {
        field: RESUMES_FIELD,
        file_name: attachment.file_name.clone(),
        content_type,
        content: attachment.content.clone(),
    }
}
