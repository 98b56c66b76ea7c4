//! Resume screening orchestration for the Talent Sift job posting service.
//!
//! A recruiter's posting and attached resumes are validated, ranked by an
//! external AI service, and the ranked candidates are routed to a downstream
//! system picked per submission.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
