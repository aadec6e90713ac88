//! Assessment runtime rules: conditional visibility and answer checks.
//!
//! # Invariants
//! - Visibility depends only on the direct condition target's current answer.
//!   A hidden target does not hide its dependents (no transitive resolution).
//! - Hidden questions are never validated.

use crate::model::assessment::{Assessment, Question, QuestionKind};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

/// One answer as captured by a form renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Answer {
    Text(String),
    Number(f64),
    Choice(String),
    Choices(Vec<String>),
    /// File name only; file contents are not stored.
    File(String),
}

impl Answer {
    fn is_blank(&self) -> bool {
        match self {
            Self::Text(value) | Self::Choice(value) | Self::File(value) => value.trim().is_empty(),
            Self::Choices(values) => values.is_empty(),
            Self::Number(_) => false,
        }
    }

    fn matches(&self, expected: &str) -> bool {
        match self {
            Self::Text(value) | Self::Choice(value) | Self::File(value) => value == expected,
            Self::Choices(values) => values.iter().any(|value| value == expected),
            Self::Number(value) => expected
                .trim()
                .parse::<f64>()
                .map_or(false, |expected| expected == *value),
        }
    }
}

/// Answers keyed by question id.
pub type Answers = BTreeMap<String, Answer>;

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerErrorKind {
    Required,
    WrongType,
    UnknownOption(String),
    OutOfRange { min: Option<f64>, max: Option<f64> },
    TooLong { max_length: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerError {
    pub question_id: String,
    pub kind: AnswerErrorKind,
}

impl Display for AnswerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let id = &self.question_id;
        match &self.kind {
            AnswerErrorKind::Required => write!(f, "`{id}` is required"),
            AnswerErrorKind::WrongType => write!(f, "`{id}` has an answer of the wrong type"),
            AnswerErrorKind::UnknownOption(option) => {
                write!(f, "`{id}` has no option `{option}`")
            }
            AnswerErrorKind::OutOfRange { min, max } => {
                write!(f, "`{id}` must be within [{min:?}, {max:?}]")
            }
            AnswerErrorKind::TooLong { max_length } => {
                write!(f, "`{id}` exceeds {max_length} characters")
            }
        }
    }
}

/// Whether `question` should be rendered given the current answers.
pub fn is_visible(question: &Question, answers: &Answers) -> bool {
    match &question.condition {
        None => true,
        Some(condition) => answers
            .get(&condition.question_id)
            .is_some_and(|answer| answer.matches(&condition.equals)),
    }
}

/// Ids of every question currently visible, in form order.
pub fn visible_question_ids(assessment: &Assessment, answers: &Answers) -> Vec<String> {
    assessment
        .questions()
        .filter(|question| is_visible(question, answers))
        .map(|question| question.id.clone())
        .collect()
}

/// Checks every visible question against its constraints.
pub fn validate_answers(assessment: &Assessment, answers: &Answers) -> Vec<AnswerError> {
    assessment
        .questions()
        .filter(|question| is_visible(question, answers))
        .filter_map(|question| {
            check_answer(question, answers.get(&question.id)).map(|kind| AnswerError {
                question_id: question.id.clone(),
                kind,
            })
        })
        .collect()
}

fn check_answer(question: &Question, answer: Option<&Answer>) -> Option<AnswerErrorKind> {
    let answer = match answer {
        Some(answer) if !answer.is_blank() => answer,
        _ if question.required => return Some(AnswerErrorKind::Required),
        _ => return None,
    };

    match (question.kind, answer) {
        (QuestionKind::Single, Answer::Choice(choice)) => unknown_option(question, [choice]),
        (QuestionKind::Multi, Answer::Choices(choices)) => unknown_option(question, choices),
        (QuestionKind::Short | QuestionKind::Long, Answer::Text(text)) => {
            let max_length = question.max_length?;
            (text.chars().count() > max_length as usize)
                .then_some(AnswerErrorKind::TooLong { max_length })
        }
        (QuestionKind::Number, Answer::Number(value)) => {
            let below = question.min.is_some_and(|min| *value < min);
            let above = question.max.is_some_and(|max| *value > max);
            (!value.is_finite() || below || above).then_some(AnswerErrorKind::OutOfRange {
                min: question.min,
                max: question.max,
            })
        }
        (QuestionKind::File, Answer::File(_)) => None,
        _ => Some(AnswerErrorKind::WrongType),
    }
}

fn unknown_option<'a, I>(question: &Question, picked: I) -> Option<AnswerErrorKind>
where
    I: IntoIterator<Item = &'a String>,
{
    picked
        .into_iter()
        .find(|choice| !question.options.contains(*choice))
        .map(|choice| AnswerErrorKind::UnknownOption(choice.clone()))
}

#[cfg(test)]
mod tests {
    use super::{is_visible, validate_answers, visible_question_ids, Answer, AnswerErrorKind, Answers};
    use crate::model::assessment::{Assessment, Question, QuestionKind, Section};
    use uuid::Uuid;

    fn form() -> Assessment {
        Assessment::empty(Uuid::new_v4()).with_section(
            Section::new("s1", "Screening")
                .with_question(
                    Question::new("relocate", QuestionKind::Single, "Relocate?")
                        .required()
                        .with_options(["Yes", "No"]),
                )
                .with_question(
                    Question::new("city", QuestionKind::Short, "Which city?")
                        .required()
                        .with_max_length(12)
                        .shown_when("relocate", "Yes"),
                )
                .with_question(
                    Question::new("district", QuestionKind::Short, "Which district?")
                        .shown_when("city", "Berlin"),
                )
                .with_question(
                    Question::new("years", QuestionKind::Number, "Years of Rust")
                        .with_range(Some(0.0), Some(40.0)),
                )
                .with_question(
                    Question::new("stack", QuestionKind::Multi, "Stack")
                        .with_options(["tokio", "axum", "serde"]),
                ),
        )
    }

    fn answers(pairs: Vec<(&str, Answer)>) -> Answers {
        pairs
            .into_iter()
            .map(|(id, answer)| (id.to_string(), answer))
            .collect()
    }

    #[test]
    fn condition_tracks_direct_target_answer() {
        let form = form();
        let city = &form.sections[0].questions[1];
        assert!(!is_visible(city, &Answers::new()));
        assert!(is_visible(
            city,
            &answers(vec![("relocate", Answer::Choice("Yes".into()))])
        ));
        assert!(!is_visible(
            city,
            &answers(vec![("relocate", Answer::Choice("No".into()))])
        ));
    }

    #[test]
    fn visibility_is_not_transitive() {
        // city is hidden (relocate = No), yet its stale answer still drives district.
        let current = answers(vec![
            ("relocate", Answer::Choice("No".into())),
            ("city", Answer::Text("Berlin".into())),
        ]);
        let visible = visible_question_ids(&form(), &current);
        assert_eq!(visible, vec!["relocate", "district", "years", "stack"]);
    }

    #[test]
    fn hidden_required_questions_are_not_enforced() {
        let errors = validate_answers(
            &form(),
            &answers(vec![("relocate", Answer::Choice("No".into()))]),
        );
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn visible_questions_enforce_constraints() {
        let errors = validate_answers(
            &form(),
            &answers(vec![
                ("relocate", Answer::Choice("Yes".into())),
                ("city", Answer::Text("Llanfairpwllgwyngyll".into())),
                ("years", Answer::Number(99.0)),
                ("stack", Answer::Choices(vec!["tokio".into(), "rocket".into()])),
            ]),
        );
        let kinds: Vec<_> = errors.iter().map(|e| (e.question_id.as_str(), &e.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("city", &AnswerErrorKind::TooLong { max_length: 12 }),
                (
                    "years",
                    &AnswerErrorKind::OutOfRange {
                        min: Some(0.0),
                        max: Some(40.0)
                    }
                ),
                ("stack", &AnswerErrorKind::UnknownOption("rocket".into())),
            ]
        );
    }

    #[test]
    fn missing_and_mistyped_answers_are_reported() {
        let errors = validate_answers(
            &form(),
            &answers(vec![("years", Answer::Text("five".into()))]),
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].question_id, "relocate");
        assert_eq!(errors[0].kind, AnswerErrorKind::Required);
        assert_eq!(errors[1].kind, AnswerErrorKind::WrongType);
    }
}
