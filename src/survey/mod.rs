pub mod answer;
pub mod types;

pub use answer::{is_answered, validate_answer, AnswerError, AnswerValue};
pub use types::{
    ImageRef, Question, QuestionType, SurveyDefinition, SurveyDraft, SurveyQuestion,
    SurveySettings,
};
