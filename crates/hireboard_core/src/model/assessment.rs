//! Per-job assessment form tree.
//!
//! # Invariants
//! - One assessment per job, keyed by the job id.
//! - Question ids are unique across the whole assessment.
//! - A condition targets another question in the same section; chains are
//!   allowed but never resolved transitively.

use super::job::JobId;
use super::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Single,
    Multi,
    Short,
    Long,
    Number,
    File,
}

impl QuestionKind {
    pub fn is_choice(self) -> bool {
        matches!(self, Self::Single | Self::Multi)
    }

    pub fn is_text(self) -> bool {
        matches!(self, Self::Short | Self::Long)
    }
}

/// Show the owning question only when `question_id` is answered with `equals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionCondition {
    pub question_id: String,
    pub equals: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub text: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<QuestionCondition>,
}

impl Question {
    pub fn new(id: impl Into<String>, kind: QuestionKind, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            text: text.into(),
            required: false,
            options: Vec::new(),
            min: None,
            max: None,
            max_length: None,
            condition: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_options<I, T>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    pub fn shown_when(mut self, question_id: impl Into<String>, equals: impl Into<String>) -> Self {
        self.condition = Some(QuestionCondition {
            question_id: question_id.into(),
            equals: equals.into(),
        });
        self
    }

    fn validate_constraints(&self) -> Result<(), ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidQuestion {
            question_id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(invalid("question id must not be blank"));
        }
        if self.text.trim().is_empty() {
            return Err(invalid("question text must not be blank"));
        }
        if self.kind.is_choice() && !self.options.iter().any(|option| !option.trim().is_empty()) {
            return Err(invalid("choice questions need at least one option"));
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(invalid("min must not exceed max"));
            }
        }
        if self.max_length == Some(0) {
            return Err(invalid("maxLength must be positive"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            questions: Vec::new(),
        }
    }

    pub fn with_question(mut self, question: Question) -> Self {
        self.questions.push(question);
        self
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|question| question.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub job_id: JobId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub updated_at: i64,
}

impl Assessment {
    /// Empty form for a job that has no saved assessment yet.
    pub fn empty(job_id: JobId) -> Self {
        Self {
            job_id,
            title: String::new(),
            sections: Vec::new(),
            updated_at: 0,
        }
    }

    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections
            .iter()
            .flat_map(|section| section.questions.iter())
    }

    pub fn question_count(&self) -> usize {
        self.questions().count()
    }

    /// Validates constraints, id uniqueness and same-section conditions.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for question in self.questions() {
            if !seen.insert(question.id.as_str()) {
                return Err(ValidationError::DuplicateQuestionId(question.id.clone()));
            }
        }

        for section in &self.sections {
            for question in &section.questions {
                question.validate_constraints()?;
                if let Some(condition) = &question.condition {
                    validate_condition(section, question, condition)?;
                }
            }
        }
        Ok(())
    }
}

fn validate_condition(
    section: &Section,
    question: &Question,
    condition: &QuestionCondition,
) -> Result<(), ValidationError> {
    let invalid = |reason: &str| ValidationError::InvalidCondition {
        question_id: question.id.clone(),
        reason: reason.to_string(),
    };

    if condition.question_id == question.id {
        return Err(invalid("question cannot depend on itself"));
    }
    let Some(target) = section.question(&condition.question_id) else {
        return Err(invalid(&format!(
            "target `{}` is not in section `{}`",
            condition.question_id, section.id
        )));
    };
    if target.kind.is_choice()
        && !target
            .options
            .iter()
            .any(|option| option == &condition.equals)
    {
        return Err(invalid(&format!(
            "`{}` is not an option of `{}`",
            condition.equals, target.id
        )));
    }
    Ok(())
}
