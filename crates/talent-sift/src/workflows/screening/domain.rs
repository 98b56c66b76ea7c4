use std::fmt;

use serde::{Deserialize, Serialize};

/// Upper bound accepted for the years-of-experience field.
pub const MAX_YEARS_OF_EXPERIENCE: u8 = 30;

/// Organization used when the caller does not carry one from a prior session.
pub const DEFAULT_ORGANIZATION_ID: i64 = 1;

/// Employment arrangements offered by the posting form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobType {
    Fulltime,
    Parttime,
    Contract,
    Freelance,
    Internship,
}

impl JobType {
    pub const ALL: [JobType; 5] = [
        JobType::Fulltime,
        JobType::Parttime,
        JobType::Contract,
        JobType::Freelance,
        JobType::Internship,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            JobType::Fulltime => "fulltime",
            JobType::Parttime => "parttime",
            JobType::Contract => "contract",
            JobType::Freelance => "freelance",
            JobType::Internship => "internship",
        }
    }

    /// Parse a form value, tolerating case, whitespace, and hyphenated spellings.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        Self::ALL
            .into_iter()
            .find(|job_type| job_type.label() == normalized)
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Years of experience, clamped into `0..=30` when captured from raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearsOfExperience(u8);

impl YearsOfExperience {
    pub fn clamped(raw: i64) -> Self {
        let bounded = raw.clamp(0, i64::from(MAX_YEARS_OF_EXPERIENCE));
        Self(bounded as u8)
    }

    /// Parse a free-text form value; blank or non-numeric input means "not provided".
    pub fn from_input(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        trimmed.parse::<i64>().ok().map(Self::clamped)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

/// Resume blob attached to a posting.
#[derive(Clone, PartialEq, Eq)]
pub struct ResumeAttachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

impl ResumeAttachment {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            content: content.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// An attachment without bytes cannot be sent as a file part.
    pub fn is_resolvable(&self) -> bool {
        !self.content.is_empty()
    }
}

impl fmt::Debug for ResumeAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResumeAttachment")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("bytes", &self.content.len())
            .finish()
    }
}

/// One or many resumes; callers never special-case cardinality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attachments(Vec<ResumeAttachment>);

impl Attachments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, attachment: ResumeAttachment) {
        self.0.push(attachment);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResumeAttachment> {
        self.0.iter()
    }
}

impl From<ResumeAttachment> for Attachments {
    fn from(value: ResumeAttachment) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<ResumeAttachment>> for Attachments {
    fn from(value: Vec<ResumeAttachment>) -> Self {
        Self(value)
    }
}

impl FromIterator<ResumeAttachment> for Attachments {
    fn from_iter<T: IntoIterator<Item = ResumeAttachment>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Attachments {
    type Item = &'a ResumeAttachment;
    type IntoIter = std::slice::Iter<'a, ResumeAttachment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Raw posting fields as captured by the form or CLI, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostingDraft {
    pub title: String,
    pub job_type: String,
    pub years_of_experience: Option<YearsOfExperience>,
    pub required_skills: String,
    /// Rich-text description; markup is stripped during validation.
    pub description: String,
    pub attachments: Attachments,
}

/// Validated posting handed to the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobPosting {
    pub title: String,
    pub job_type: JobType,
    pub years_of_experience: Option<YearsOfExperience>,
    pub required_skills: Vec<String>,
    pub description: String,
    pub attachments: Attachments,
}

impl JobPosting {
    /// Skills joined back into the comma-separated form the ranking service expects.
    pub fn skills_label(&self) -> String {
        self.required_skills.join(", ")
    }
}

/// A scored candidate as returned by the ranking service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    #[serde(default)]
    pub name: String,
    pub score: f64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub justification: String,
}

/// Identifier of the organization a submission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrganizationId(pub i64);

impl OrganizationId {
    /// Resolve a caller-provided value, falling back to the default organization.
    pub fn from_param(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i64>().ok())
            .map(Self)
            .unwrap_or_default()
    }
}

impl Default for OrganizationId {
    fn default() -> Self {
        Self(DEFAULT_ORGANIZATION_ID)
    }
}

/// Per-submission parameters that used to come from ambient page state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionContext {
    pub destination: String,
    pub organization_id: OrganizationId,
}

impl SubmissionContext {
    pub fn new(destination: impl Into<String>, organization_id: OrganizationId) -> Self {
        Self {
            destination: destination.into(),
            organization_id,
        }
    }
}
