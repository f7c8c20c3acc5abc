//! Per-type answer values and their local validation rules.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{Question, QuestionType};

pub const RATING_MIN: u8 = 1;
pub const RATING_MAX: u8 = 5;

/// Value captured for one question. Serialized as a bare JSON scalar or array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Rating(u8),
    Text(String),
    Selection(Vec<String>),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnswerError {
    #[error("Це поле обов'язкове")]
    Required,
    #[error("Невідомий варіант відповіді: {0}")]
    UnknownOption(String),
    #[error("Оцінка має бути від 1 до 5")]
    RatingOutOfRange(u8),
    #[error("Неправильний формат відповіді")]
    WrongShape,
}

impl QuestionType {
    /// Initial value when a respondent opens the survey.
    pub fn default_answer(&self) -> Option<AnswerValue> {
        match self {
            QuestionType::Checkbox => Some(AnswerValue::Selection(Vec::new())),
            _ => None,
        }
    }
}

/// Empty strings and empty selections count as unanswered.
pub fn is_answered(value: Option<&AnswerValue>) -> bool {
    match value {
        None => false,
        Some(AnswerValue::Text(s)) => !s.is_empty(),
        Some(AnswerValue::Selection(items)) => !items.is_empty(),
        Some(AnswerValue::Rating(_)) => true,
    }
}

fn is_missing(question_type: QuestionType, value: Option<&AnswerValue>) -> bool {
    match (question_type, value) {
        (QuestionType::Text | QuestionType::Textarea, Some(AnswerValue::Text(s))) => {
            s.trim().is_empty()
        }
        (_, value) => !is_answered(value),
    }
}

pub fn validate_answer(question: &Question, value: Option<&AnswerValue>) -> Result<(), AnswerError> {
    if is_missing(question.question_type, value) {
        return if question.required {
            Err(AnswerError::Required)
        } else {
            Ok(())
        };
    }
    let Some(value) = value else {
        return Ok(());
    };

    match (question.question_type, value) {
        (QuestionType::Text | QuestionType::Textarea, AnswerValue::Text(_)) => Ok(()),
        (QuestionType::Radio, AnswerValue::Text(choice)) => {
            if question.options.iter().any(|o| o == choice) {
                Ok(())
            } else {
                Err(AnswerError::UnknownOption(choice.clone()))
            }
        }
        (QuestionType::Checkbox, AnswerValue::Selection(choices)) => {
            match choices.iter().find(|c| !question.options.contains(c)) {
                Some(unknown) => Err(AnswerError::UnknownOption(unknown.clone())),
                None => Ok(()),
            }
        }
        (QuestionType::Rating, AnswerValue::Rating(score)) => {
            if (RATING_MIN..=RATING_MAX).contains(score) {
                Ok(())
            } else {
                Err(AnswerError::RatingOutOfRange(*score))
            }
        }
        _ => Err(AnswerError::WrongShape),
    }
}

#[cfg(test)]
mod tests {
    use super::{is_answered, validate_answer, AnswerError, AnswerValue};
    use crate::survey::types::{Question, QuestionType};

    fn question(question_type: QuestionType, required: bool, options: &[&str]) -> Question {
        Question {
            question_text: "Q".to_string(),
            question_type,
            options: options.iter().map(|o| o.to_string()).collect(),
            required,
            order: 0,
        }
    }

    #[test]
    fn defaults_follow_question_type() {
        assert_eq!(
            QuestionType::Checkbox.default_answer(),
            Some(AnswerValue::Selection(vec![]))
        );
        assert_eq!(QuestionType::Text.default_answer(), None);
        assert_eq!(QuestionType::Rating.default_answer(), None);
    }

    #[test]
    fn empty_values_are_unanswered() {
        assert!(!is_answered(None));
        assert!(!is_answered(Some(&AnswerValue::text(""))));
        assert!(!is_answered(Some(&AnswerValue::Selection(vec![]))));
        assert!(is_answered(Some(&AnswerValue::text(" "))));
        assert!(is_answered(Some(&AnswerValue::Rating(3))));
    }

    #[test]
    fn required_text_rejects_whitespace() {
        let q = question(QuestionType::Text, true, &[]);
        assert_eq!(
            validate_answer(&q, Some(&AnswerValue::text("   "))),
            Err(AnswerError::Required)
        );
        assert_eq!(validate_answer(&q, Some(&AnswerValue::text("так"))), Ok(()));
    }

    #[test]
    fn optional_questions_accept_missing_values() {
        for t in QuestionType::ALL {
            let q = question(t, false, &["A", "B"]);
            assert_eq!(validate_answer(&q, t.default_answer().as_ref()), Ok(()));
        }
    }

    #[test]
    fn choices_must_come_from_options() {
        let radio = question(QuestionType::Radio, true, &["A", "B"]);
        assert_eq!(validate_answer(&radio, Some(&AnswerValue::text("B"))), Ok(()));
        assert_eq!(
            validate_answer(&radio, Some(&AnswerValue::text("C"))),
            Err(AnswerError::UnknownOption("C".to_string()))
        );

        let checkbox = question(QuestionType::Checkbox, true, &["A", "B"]);
        let picked = AnswerValue::Selection(vec!["B".to_string(), "A".to_string()]);
        assert_eq!(validate_answer(&checkbox, Some(&picked)), Ok(()));
        let bad = AnswerValue::Selection(vec!["A".to_string(), "Z".to_string()]);
        assert_eq!(
            validate_answer(&checkbox, Some(&bad)),
            Err(AnswerError::UnknownOption("Z".to_string()))
        );
    }

    #[test]
    fn rating_is_bounded() {
        let q = question(QuestionType::Rating, true, &[]);
        assert_eq!(validate_answer(&q, None), Err(AnswerError::Required));
        assert_eq!(validate_answer(&q, Some(&AnswerValue::Rating(5))), Ok(()));
        assert_eq!(
            validate_answer(&q, Some(&AnswerValue::Rating(0))),
            Err(AnswerError::RatingOutOfRange(0))
        );
        assert_eq!(
            validate_answer(&q, Some(&AnswerValue::text("5"))),
            Err(AnswerError::WrongShape)
        );
    }

    #[test]
    fn answers_serialize_as_bare_json() {
        let values = vec![
            AnswerValue::text("a"),
            AnswerValue::Rating(4),
            AnswerValue::Selection(vec!["X".to_string()]),
        ];
        let json = serde_json::to_string(&values).expect("serialize");
        assert_eq!(json, r#"["a",4,["X"]]"#);
        let back: Vec<AnswerValue> = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, values);
    }
}
