use std::collections::BTreeMap;
use std::fmt;

use super::domain::{JobPosting, JobType, PostingDraft};

pub const FIELD_TITLE: &str = "title";
pub const FIELD_JOB_TYPE: &str = "job_type";
pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_RESUMES: &str = "resumes";

/// Every rule a draft broke, keyed by form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationError {
    pub fn fields(&self) -> &BTreeMap<&'static str, String> {
        &self.fields
    }

    pub fn reason(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reasons: Vec<&str> = self.fields.values().map(String::as_str).collect();
        write!(f, "posting is incomplete: {}", reasons.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Checks a draft for the fields required before any network call is made.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostingValidator;

impl PostingValidator {
    pub fn validate(&self, draft: PostingDraft) -> Result<JobPosting, ValidationError> {
        let mut fields = BTreeMap::new();

        let title = draft.title.trim().to_string();
        if title.is_empty() {
            fields.insert(FIELD_TITLE, "Job title is required".to_string());
        }

        let job_type = if draft.job_type.trim().is_empty() {
            fields.insert(FIELD_JOB_TYPE, "Job type is required".to_string());
            None
        } else {
            let parsed = JobType::parse(&draft.job_type);
            if parsed.is_none() {
                let allowed: Vec<&str> = JobType::ALL.iter().map(|t| t.label()).collect();
                fields.insert(
                    FIELD_JOB_TYPE,
                    format!(
                        "Job type '{}' is not one of {}",
                        draft.job_type.trim(),
                        allowed.join(", ")
                    ),
                );
            }
            parsed
        };

        let description = strip_html(&draft.description);
        if description.is_empty() {
            fields.insert(FIELD_DESCRIPTION, "Job description is required".to_string());
        }

        if draft.attachments.is_empty() {
            fields.insert(FIELD_RESUMES, "At least one resume is required".to_string());
        }

        match job_type {
            Some(job_type) if fields.is_empty() => Ok(JobPosting {
                title,
                job_type,
                years_of_experience: draft.years_of_experience,
                required_skills: split_skills(&draft.required_skills),
                description,
                attachments: draft.attachments,
            }),
            _ => Err(ValidationError { fields }),
        }
    }
}

/// Split a comma-separated skills field, dropping blanks.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_string)
        .collect()
}

const BLOCK_TAGS: [&str; 12] = [
    "p", "br", "div", "li", "ul", "ol", "h1", "h2", "h3", "h4", "tr", "blockquote",
];

/// Reduce rich-text editor markup to plain text.
///
/// Block-level tags become word breaks so adjacent paragraphs do not run
/// together, common entities are decoded, and whitespace is collapsed.
pub fn strip_html(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '<' {
            text.push(c);
            continue;
        }

        let mut tag = String::new();
        for inner in chars.by_ref() {
            if inner == '>' {
                break;
            }
            tag.push(inner);
        }

        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        if BLOCK_TAGS.contains(&name.as_str()) {
            text.push(' ');
        }
    }

    let decoded = decode_entities(&text);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn decode_entities(raw: &str) -> String {
    raw.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::screening::domain::{ResumeAttachment, YearsOfExperience};

    fn complete_draft() -> PostingDraft {
        PostingDraft {
            title: "Backend Engineer".to_string(),
            job_type: "fulltime".to_string(),
            years_of_experience: Some(YearsOfExperience::clamped(5)),
            required_skills: "Rust, PostgreSQL, ,Kubernetes".to_string(),
            description: "<p>Build <b>services</b></p><p>Ship&nbsp;often</p>".to_string(),
            attachments: ResumeAttachment::new("ada.pdf", b"%PDF".to_vec()).into(),
        }
    }

    #[test]
    fn valid_draft_becomes_posting() {
        let posting = PostingValidator.validate(complete_draft()).expect("valid");
        assert_eq!(posting.job_type, JobType::Fulltime);
        assert_eq!(posting.description, "Build services Ship often");
        assert_eq!(
            posting.required_skills,
            vec!["Rust", "PostgreSQL", "Kubernetes"]
        );
        assert_eq!(posting.skills_label(), "Rust, PostgreSQL, Kubernetes");
    }

    #[test]
    fn collects_every_violation() {
        let draft = PostingDraft {
            title: "   ".to_string(),
            job_type: String::new(),
            description: "<p><br></p>".to_string(),
            ..PostingDraft::default()
        };

        let error = PostingValidator.validate(draft).expect_err("invalid");
        let keys: Vec<&str> = error.fields().keys().copied().collect();
        assert_eq!(
            keys,
            vec![FIELD_DESCRIPTION, FIELD_JOB_TYPE, FIELD_RESUMES, FIELD_TITLE]
        );
    }

    #[test]
    fn unknown_job_type_is_rejected_with_allowed_values() {
        let draft = PostingDraft {
            job_type: "gig".to_string(),
            ..complete_draft()
        };

        let error = PostingValidator.validate(draft).expect_err("invalid");
        assert_eq!(error.fields().len(), 1);
        let reason = error.reason(FIELD_JOB_TYPE).expect("job type reason");
        assert!(reason.contains("gig"));
        assert!(reason.contains("internship"));
    }

    #[test]
    fn strip_html_decodes_entities_and_collapses_whitespace() {
        assert_eq!(
            strip_html("<h1>Role</h1>\n<ul><li>Tom &amp; Jerry</li><li>a &lt; b</li></ul>"),
            "Role Tom & Jerry a < b"
        );
        assert_eq!(strip_html("plain text"), "plain text");
        assert_eq!(strip_html("<p></p>"), "");
    }
}
