use std::sync::Arc;

use crate::gateway::{FileUpload, SurveyGateway};
use crate::storage::{KeyValueStore, DRAFT_KEY};
use crate::survey::types::{DESCRIPTION_MAX_CHARS, TITLE_MAX_CHARS};
use crate::survey::{Question, QuestionType, SurveyDefinition, SurveyDraft, SurveySettings};
use crate::util::text::truncate_chars;

use super::validate;
use super::DraftError;

pub const MAX_COVER_BYTES: usize = 10 * 1024 * 1024;
pub const SEEDED_OPTIONS: [&str; 2] = ["Варіант 1", "Варіант 2"];
pub const REMOVE_QUESTION_PROMPT: &str = "Видалити це питання?";

/// Gate for destructive edits.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Single-field edits for [`DraftEditor::update_question`]. Type changes go
/// through [`DraftEditor::change_question_type`] because they touch options.
#[derive(Debug, Clone, PartialEq)]
pub enum QuestionField {
    Text(String),
    Required(bool),
}

/// Mutable survey draft plus the cover picked for it.
///
/// Persists to one fixed storage slot; saving overwrites whatever draft was
/// there before.
pub struct DraftEditor {
    draft: SurveyDraft,
    cover: Option<FileUpload>,
    store: Arc<dyn KeyValueStore>,
}

impl DraftEditor {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            draft: SurveyDraft::default(),
            cover: None,
            store,
        }
    }

    /// Starts from the saved draft when there is a readable one.
    pub fn restore(store: Arc<dyn KeyValueStore>) -> Self {
        let mut editor = Self::new(store);
        editor.load_draft();
        editor
    }

    pub fn draft(&self) -> &SurveyDraft {
        &self.draft
    }

    pub fn cover(&self) -> Option<&FileUpload> {
        self.cover.as_ref()
    }

    pub fn set_title(&mut self, title: &str) {
        self.draft.title = truncate_chars(title, TITLE_MAX_CHARS);
    }

    pub fn set_description(&mut self, description: &str) {
        self.draft.description = truncate_chars(description, DESCRIPTION_MAX_CHARS);
    }

    pub fn settings_mut(&mut self) -> &mut SurveySettings {
        &mut self.draft.settings
    }

    fn question_mut(&mut self, index: usize) -> Result<&mut Question, DraftError> {
        self.draft
            .questions
            .get_mut(index)
            .ok_or(DraftError::NoSuchQuestion { number: index + 1 })
    }

    fn renumber(&mut self) {
        for (i, q) in self.draft.questions.iter_mut().enumerate() {
            q.order = i;
        }
    }

    /// Appends a blank text question and returns its index.
    pub fn add_question(&mut self) -> usize {
        let index = self.draft.questions.len();
        self.draft.questions.push(Question::blank(index));
        index
    }

    /// Returns `Ok(false)` when the author declines.
    pub fn remove_question(&mut self, index: usize, confirm: &dyn Confirm) -> Result<bool, DraftError> {
        if index >= self.draft.questions.len() {
            return Err(DraftError::NoSuchQuestion { number: index + 1 });
        }
        if !confirm.confirm(REMOVE_QUESTION_PROMPT) {
            return Ok(false);
        }
        self.draft.questions.remove(index);
        self.renumber();
        Ok(true)
    }

    pub fn update_question(&mut self, index: usize, field: QuestionField) -> Result<(), DraftError> {
        let question = self.question_mut(index)?;
        match field {
            QuestionField::Text(text) => question.question_text = text,
            QuestionField::Required(required) => question.required = required,
        }
        Ok(())
    }

    /// Lossy: leaving radio/checkbox discards the options for good.
    pub fn change_question_type(
        &mut self,
        index: usize,
        question_type: QuestionType,
    ) -> Result<(), DraftError> {
        let question = self.question_mut(index)?;
        question.question_type = question_type;
        if question_type.has_options() {
            if question.non_empty_options().is_empty() {
                question.options = SEEDED_OPTIONS.iter().map(|o| o.to_string()).collect();
            }
        } else {
            question.options.clear();
        }
        Ok(())
    }

    pub fn add_option(&mut self, index: usize) -> Result<usize, DraftError> {
        let question = self.question_mut(index)?;
        question.options.push(String::new());
        Ok(question.options.len() - 1)
    }

    pub fn remove_option(&mut self, index: usize, option: usize) -> Result<(), DraftError> {
        let question = self.question_mut(index)?;
        if option >= question.options.len() {
            return Err(DraftError::NoSuchOption {
                number: index + 1,
                option: option + 1,
            });
        }
        question.options.remove(option);
        Ok(())
    }

    pub fn update_option(&mut self, index: usize, option: usize, value: &str) -> Result<(), DraftError> {
        let question = self.question_mut(index)?;
        let slot = question
            .options
            .get_mut(option)
            .ok_or(DraftError::NoSuchOption {
                number: index + 1,
                option: option + 1,
            })?;
        *slot = value.to_string();
        Ok(())
    }

    /// Takes the question at `from` out and reinserts it at `to` (clamped to
    /// the last position). Returns where it landed.
    pub fn move_question(&mut self, from: usize, to: usize) -> Result<usize, DraftError> {
        if from >= self.draft.questions.len() {
            return Err(DraftError::NoSuchQuestion { number: from + 1 });
        }
        let moved = self.draft.questions.remove(from);
        let to = to.min(self.draft.questions.len());
        self.draft.questions.insert(to, moved);
        self.renumber();
        Ok(to)
    }

    pub fn select_cover(&mut self, file: FileUpload) -> Result<(), DraftError> {
        if file.len() > MAX_COVER_BYTES {
            return Err(DraftError::CoverTooLarge { size: file.len() });
        }
        self.cover = Some(file);
        Ok(())
    }

    pub fn remove_cover(&mut self) {
        self.cover = None;
    }

    /// The cover is not part of the saved draft.
    pub fn save_draft(&self) -> Result<(), DraftError> {
        let payload = serde_json::to_string(&self.draft).map_err(crate::storage::StorageError::from)?;
        self.store.set(DRAFT_KEY, &payload)?;
        tracing::info!(questions = self.draft.questions.len(), "draft saved");
        Ok(())
    }

    /// Replaces the working draft with the saved one. Unreadable or malformed
    /// content is logged and ignored.
    pub fn load_draft(&mut self) -> bool {
        let raw = match self.store.get(DRAFT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(err) => {
                tracing::warn!(error = %err, "unable to read saved draft");
                return false;
            }
        };
        match serde_json::from_str::<SurveyDraft>(&raw) {
            Ok(draft) => {
                self.draft = draft;
                tracing::debug!(questions = self.draft.questions.len(), "draft restored");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load draft");
                false
            }
        }
    }

    pub fn clear_draft(&self) -> Result<(), DraftError> {
        self.store.remove(DRAFT_KEY)?;
        Ok(())
    }

    pub fn validate(&mut self) -> Result<(), DraftError> {
        validate::validate(&mut self.draft)
    }

    /// Creates the survey, then attaches the cover on a best-effort basis.
    ///
    /// A failed cover upload is logged and the created survey is kept. On a
    /// failed creation the draft stays as it was so the author can retry.
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<SurveyDefinition, DraftError>
    where
        G: SurveyGateway + ?Sized,
    {
        self.validate()?;
        let created = gateway.create_survey(&self.draft).await.map_err(|err| {
            tracing::warn!(error = %err, "survey creation failed");
            DraftError::Gateway(err)
        })?;

        if let Some(cover) = &self.cover {
            if let Err(err) = gateway.upload_survey_cover(&created.id, cover).await {
                tracing::warn!(survey_id = %created.id, error = %err, "cover upload failed");
            }
        }

        if let Err(err) = self.clear_draft() {
            tracing::warn!(error = %err, "unable to clear saved draft");
        }
        self.draft = SurveyDraft::default();
        self.cover = None;
        Ok(created)
    }
}
