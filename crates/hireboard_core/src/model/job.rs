//! Job posting record.
//!
//! # Invariants
//! - `slug` is unique across all jobs (enforced by the remote, which sees the collection).
//! - After any successful reorder, `order` values form a permutation of `0..N`.

use super::validation::ValidationError;
use super::now_epoch_ms;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

static SLUG_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug separator regex"));
static SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid slug regex"));

pub type JobId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Active,
    Archived,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Some(Self::Active),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub slug: String,
    pub status: JobStatus,
    pub tags: BTreeSet<String>,
    /// Dense board rank.
    pub order: i64,
    #[serde(default)]
    pub description: String,
    pub created_at: i64,
}

impl Job {
    /// Builds a job from form input; `order` is assigned by the caller.
    pub fn from_draft(draft: JobDraft, order: i64) -> Self {
        let slug = draft
            .slug
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| slugify(&draft.title));
        Self {
            id: Uuid::new_v4(),
            title: draft.title.trim().to_string(),
            slug,
            status: draft.status,
            tags: normalize_tags(draft.tags),
            order,
            description: draft.description,
            created_at: now_epoch_ms(),
        }
    }

    /// Applies a partial edit in place. Validation is left to the caller.
    pub fn apply_patch(&mut self, patch: JobPatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(slug) = patch.slug {
            self.slug = slug.trim().to_string();
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(tags) = patch.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
    }

    /// Checks record-local invariants. Slug uniqueness needs the collection.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingTitle);
        }
        if !SLUG_RE.is_match(&self.slug) {
            return Err(ValidationError::InvalidSlug(self.slug.clone()));
        }
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status == JobStatus::Active
    }
}

/// Create-job form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDraft {
    pub title: String,
    /// Derived from `title` when absent or blank.
    pub slug: Option<String>,
    pub status: JobStatus,
    pub tags: Vec<String>,
    pub description: String,
}

impl JobDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slug: None,
            status: JobStatus::Active,
            tags: Vec::new(),
            description: String::new(),
        }
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = Some(slug.into());
        self
    }
}

/// Edit-job form input; `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobPatch {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub status: Option<JobStatus>,
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
}

/// Lowercases a title and joins alphanumeric runs with `-`.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    SLUG_SEPARATOR_RE
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

fn normalize_tags(tags: Vec<String>) -> BTreeSet<String> {
    tags.into_iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}
