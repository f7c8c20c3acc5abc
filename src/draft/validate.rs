use crate::survey::SurveyDraft;
use crate::util::text::is_blank;

use super::DraftError;

/// First violated rule wins: title, then question count, then each question
/// in order (text before options).
pub fn check(draft: &SurveyDraft) -> Result<(), DraftError> {
    if is_blank(&draft.title) {
        return Err(DraftError::MissingTitle);
    }
    if draft.questions.is_empty() {
        return Err(DraftError::NoQuestions);
    }
    for (i, q) in draft.questions.iter().enumerate() {
        let number = i + 1;
        if is_blank(&q.question_text) {
            return Err(DraftError::MissingQuestionText { number });
        }
        if q.question_type.has_options() && q.non_empty_options().len() < 2 {
            return Err(DraftError::NotEnoughOptions { number });
        }
    }
    Ok(())
}

/// Runs [`check`] and, only when it passes, drops blank options.
pub fn validate(draft: &mut SurveyDraft) -> Result<(), DraftError> {
    check(draft)?;
    for q in draft.questions.iter_mut() {
        if q.question_type.has_options() {
            q.options = q.non_empty_options();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{check, validate};
    use crate::draft::DraftError;
    use crate::survey::{Question, QuestionType, SurveyDraft};

    fn question(text: &str, question_type: QuestionType, options: &[&str]) -> Question {
        Question {
            question_text: text.to_string(),
            question_type,
            options: options.iter().map(|o| o.to_string()).collect(),
            required: false,
            order: 0,
        }
    }

    fn draft(title: &str, questions: Vec<Question>) -> SurveyDraft {
        SurveyDraft {
            title: title.to_string(),
            questions,
            ..Default::default()
        }
    }

    #[test]
    fn missing_title_wins_over_everything_else() {
        let d = draft("  ", vec![question("", QuestionType::Radio, &[])]);
        assert!(matches!(check(&d), Err(DraftError::MissingTitle)));
        assert!(matches!(check(&draft("", vec![])), Err(DraftError::MissingTitle)));
    }

    #[test]
    fn needs_at_least_one_question() {
        assert!(matches!(check(&draft("T", vec![])), Err(DraftError::NoQuestions)));
    }

    #[test]
    fn first_offending_question_is_reported() {
        let d = draft(
            "T",
            vec![
                question("ok", QuestionType::Text, &[]),
                question("pick", QuestionType::Checkbox, &["A"]),
                question("", QuestionType::Text, &[]),
            ],
        );
        let err = check(&d).expect_err("should fail");
        assert!(matches!(err, DraftError::NotEnoughOptions { number: 2 }));
        assert_eq!(err.to_string(), "Питання 2: додайте мінімум 2 варіанти");
    }

    #[test]
    fn text_is_checked_before_options() {
        let d = draft("T", vec![question(" ", QuestionType::Radio, &[])]);
        let err = check(&d).expect_err("should fail");
        assert_eq!(err.to_string(), "Введіть текст для питання 1");
    }

    #[test]
    fn radio_with_one_option_fails_and_two_compact() {
        let mut one = draft("T", vec![question("Q", QuestionType::Radio, &["A", " "])]);
        assert!(matches!(
            validate(&mut one),
            Err(DraftError::NotEnoughOptions { number: 1 })
        ));
        assert_eq!(one.questions[0].options, vec!["A", " "]);

        let mut two = draft("T", vec![question("Q", QuestionType::Radio, &["", "A", "", "B"])]);
        validate(&mut two).expect("valid");
        assert_eq!(two.questions[0].options, vec!["A", "B"]);
    }

    #[test]
    fn failed_validation_leaves_earlier_questions_untouched() {
        let mut d = draft(
            "T",
            vec![
                question("Q1", QuestionType::Checkbox, &["A", "", "B"]),
                question("", QuestionType::Text, &[]),
            ],
        );
        assert!(validate(&mut d).is_err());
        assert_eq!(d.questions[0].options, vec!["A", "", "B"]);
    }
}
