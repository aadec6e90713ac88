//! Form-level validation errors.
//!
//! These are detected synchronously, before any store or remote call, and
//! are never retried.

use super::job::JobId;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Job title is blank after trim.
    MissingTitle,
    /// Another job already uses this slug.
    DuplicateSlug(String),
    /// Slug is empty or contains characters outside `[a-z0-9-]`.
    InvalidSlug(String),
    /// Candidate name is blank after trim.
    MissingName,
    /// Candidate email does not look like an address.
    InvalidEmail(String),
    /// Candidate references a job that does not exist.
    UnknownJob(JobId),
    /// Question constraints are inconsistent for its type.
    InvalidQuestion { question_id: String, reason: String },
    /// Conditional display rule points somewhere it must not.
    InvalidCondition { question_id: String, reason: String },
    /// Two questions in one assessment share an id.
    DuplicateQuestionId(String),
    /// Timeline note is blank after trim.
    EmptyNote,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "job title must not be blank"),
            Self::DuplicateSlug(slug) => write!(f, "job slug already in use: `{slug}`"),
            Self::InvalidSlug(slug) => write!(f, "invalid job slug: `{slug}`"),
            Self::MissingName => write!(f, "candidate name must not be blank"),
            Self::InvalidEmail(email) => write!(f, "invalid candidate email: `{email}`"),
            Self::UnknownJob(id) => write!(f, "job not found: {id}"),
            Self::InvalidQuestion {
                question_id,
                reason,
            } => write!(f, "invalid question `{question_id}`: {reason}"),
            Self::InvalidCondition {
                question_id,
                reason,
            } => write!(f, "invalid condition on question `{question_id}`: {reason}"),
            Self::DuplicateQuestionId(id) => write!(f, "duplicate question id `{id}`"),
            Self::EmptyNote => write!(f, "note must not be blank"),
        }
    }
}

impl Error for ValidationError {}
