use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tokio::time::Instant;

use crate::gateway::types::AnswerEntry;
use crate::gateway::{GatewayError, PublicGateway, ResponseSubmission};
use crate::survey::{is_answered, validate_answer, AnswerError, AnswerValue, QuestionType, SurveyDefinition};

use super::timer::{Stopwatch, Ticker, TICK_PERIOD};

pub const INVALID_LINK_MESSAGE: &str = "Невалідне посилання на опитування";

/// `Loading -> Failed | Ready`, `Ready -> Submitting -> Submitted | Ready`.
/// `Failed` and `Submitted` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectorState {
    Loading,
    Failed(String),
    Ready,
    Submitting,
    Submitted,
}

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("Будь ласка, заповніть всі обов'язкові поля")]
    Invalid { first: String, count: usize },
    #[error("Опитування ще не завантажене")]
    NotReady,
    #[error("Відповіді вже відправлено")]
    AlreadySubmitted,
    #[error("Питання {0} не знайдено")]
    UnknownQuestion(String),
    #[error("Питання {0} не має варіантів для вибору")]
    NotCheckbox(String),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub answered: usize,
    pub total: usize,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionIssue {
    pub question_id: String,
    pub error: AnswerError,
}

/// Working answers for one respondent against one published survey.
pub struct ResponseCollector {
    unique_link: String,
    state: CollectorState,
    survey: Option<SurveyDefinition>,
    answers: HashMap<String, Option<AnswerValue>>,
    issues: Vec<QuestionIssue>,
    stopwatch: Arc<Mutex<Stopwatch>>,
}

impl ResponseCollector {
    pub fn new(unique_link: &str) -> Self {
        let unique_link = unique_link.trim().to_string();
        let state = if unique_link.is_empty() {
            CollectorState::Failed(INVALID_LINK_MESSAGE.to_string())
        } else {
            CollectorState::Loading
        };
        Self {
            unique_link,
            state,
            survey: None,
            answers: HashMap::new(),
            issues: Vec::new(),
            stopwatch: Arc::new(Mutex::new(Stopwatch::default())),
        }
    }

    pub fn unique_link(&self) -> &str {
        &self.unique_link
    }

    pub fn state(&self) -> &CollectorState {
        &self.state
    }

    pub fn survey(&self) -> Option<&SurveyDefinition> {
        self.survey.as_ref()
    }

    pub fn answer(&self, question_id: &str) -> Option<&AnswerValue> {
        self.answers.get(question_id).and_then(|v| v.as_ref())
    }

    pub fn issues(&self) -> &[QuestionIssue] {
        &self.issues
    }

    pub fn issue_for(&self, question_id: &str) -> Option<&AnswerError> {
        self.issues
            .iter()
            .find(|i| i.question_id == question_id)
            .map(|i| &i.error)
    }

    /// Question to bring into view after a failed validation.
    pub fn first_issue(&self) -> Option<&str> {
        self.issues.first().map(|i| i.question_id.as_str())
    }

    fn watch(&self) -> MutexGuard<'_, Stopwatch> {
        match self.stopwatch.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Fetches the survey by link. A failure is terminal for this collector.
    pub async fn load<G>(&mut self, gateway: &G) -> Result<(), CollectorError>
    where
        G: PublicGateway + ?Sized,
    {
        match self.state {
            CollectorState::Loading => {}
            CollectorState::Submitted => return Err(CollectorError::AlreadySubmitted),
            _ => return Err(CollectorError::NotReady),
        }
        match gateway.get_public_survey(&self.unique_link).await {
            Ok(survey) => self.open(survey, Instant::now()),
            Err(err) => {
                tracing::warn!(unique_link = %self.unique_link, error = %err, "survey unavailable");
                self.state = CollectorState::Failed(err.to_string());
                Err(CollectorError::Gateway(err))
            }
        }
    }

    /// Seeds default answers and starts the clock. Only a collector that is
    /// still loading can be opened.
    pub(crate) fn open(&mut self, survey: SurveyDefinition, now: Instant) -> Result<(), CollectorError> {
        match self.state {
            CollectorState::Loading => {}
            CollectorState::Submitted => return Err(CollectorError::AlreadySubmitted),
            _ => return Err(CollectorError::NotReady),
        }
        self.answers = survey
            .questions
            .iter()
            .map(|q| (q.id.clone(), q.question.question_type.default_answer()))
            .collect();
        self.issues.clear();
        self.watch().start(now);
        tracing::info!(survey_id = %survey.id, questions = survey.questions.len(), "survey ready");
        self.survey = Some(survey);
        self.state = CollectorState::Ready;
        Ok(())
    }

    fn ensure_ready(&self) -> Result<&SurveyDefinition, CollectorError> {
        match (&self.state, &self.survey) {
            (CollectorState::Ready, Some(survey)) => Ok(survey),
            (CollectorState::Submitted, _) => Err(CollectorError::AlreadySubmitted),
            _ => Err(CollectorError::NotReady),
        }
    }

    fn question_type(&self, question_id: &str) -> Result<QuestionType, CollectorError> {
        let survey = self.ensure_ready()?;
        survey
            .question(question_id)
            .map(|q| q.question.question_type)
            .ok_or_else(|| CollectorError::UnknownQuestion(question_id.to_string()))
    }

    /// Replaces one answer and forgets any recorded issue for that question.
    pub fn set_answer(
        &mut self,
        question_id: &str,
        value: Option<AnswerValue>,
    ) -> Result<(), CollectorError> {
        self.question_type(question_id)?;
        self.answers.insert(question_id.to_string(), value);
        self.issues.retain(|i| i.question_id != question_id);
        Ok(())
    }

    pub fn toggle_checkbox_option(
        &mut self,
        question_id: &str,
        option: &str,
        selected: bool,
    ) -> Result<(), CollectorError> {
        if self.question_type(question_id)? != QuestionType::Checkbox {
            return Err(CollectorError::NotCheckbox(question_id.to_string()));
        }
        let mut current = match self.answers.get(question_id) {
            Some(Some(AnswerValue::Selection(items))) => items.clone(),
            _ => Vec::new(),
        };
        if selected {
            if !current.iter().any(|o| o == option) {
                current.push(option.to_string());
            }
        } else {
            current.retain(|o| o != option);
        }
        self.answers
            .insert(question_id.to_string(), Some(AnswerValue::Selection(current)));
        Ok(())
    }

    pub fn progress(&self) -> Progress {
        let Some(survey) = &self.survey else {
            return Progress {
                answered: 0,
                total: 0,
                percent: 0,
            };
        };
        let total = survey.questions.len();
        let answered = survey
            .questions
            .iter()
            .filter(|q| is_answered(self.answer(&q.id)))
            .count();
        let percent = if total == 0 {
            0
        } else {
            ((answered as f64 / total as f64) * 100.0).round() as u32
        };
        Progress {
            answered,
            total,
            percent,
        }
    }

    pub fn tick(&self, now: Instant) -> u64 {
        self.watch().tick(now)
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.watch().elapsed_secs()
    }

    /// Drives [`tick`](Self::tick) once a second until the response is
    /// submitted or the returned handle is dropped.
    pub fn start_ticker(&self) -> Ticker {
        Ticker::spawn(Arc::clone(&self.stopwatch), TICK_PERIOD)
    }

    /// Checks every question and records all issues, in survey order.
    pub fn validate_all(&mut self) -> &[QuestionIssue] {
        let issues = match &self.survey {
            Some(survey) => survey
                .questions
                .iter()
                .filter_map(|q| {
                    validate_answer(&q.question, self.answer(&q.id))
                        .err()
                        .map(|error| QuestionIssue {
                            question_id: q.id.clone(),
                            error,
                        })
                })
                .collect(),
            None => Vec::new(),
        };
        self.issues = issues;
        &self.issues
    }

    /// Answers in survey question order, independent of map iteration.
    pub fn payload(&self) -> Option<ResponseSubmission> {
        let survey = self.survey.as_ref()?;
        let answers = survey
            .questions
            .iter()
            .map(|q| AnswerEntry {
                question_id: q.id.clone(),
                answer_value: self.answers.get(&q.id).cloned().flatten(),
            })
            .collect();
        Some(ResponseSubmission {
            answers,
            completion_time: self.elapsed_secs(),
        })
    }

    /// Validates locally, then sends. On a remote failure the collector goes
    /// back to `Ready` so the respondent can retry.
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<(), CollectorError>
    where
        G: PublicGateway + ?Sized,
    {
        self.ensure_ready()?;
        let count = self.validate_all().len();
        if let Some(first) = self.first_issue() {
            return Err(CollectorError::Invalid {
                first: first.to_string(),
                count,
            });
        }

        self.state = CollectorState::Submitting;
        self.tick(Instant::now());
        let Some(payload) = self.payload() else {
            self.state = CollectorState::Ready;
            return Err(CollectorError::NotReady);
        };

        match gateway.submit_response(&self.unique_link, &payload).await {
            Ok(()) => {
                self.watch().stop();
                self.state = CollectorState::Submitted;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(unique_link = %self.unique_link, error = %err, "response submission failed");
                self.state = CollectorState::Ready;
                Err(CollectorError::Gateway(err))
            }
        }
    }
}
