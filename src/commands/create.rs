use std::path::Path;
use std::sync::Arc;

use crate::auth::Session;
use crate::draft::{Confirm, DraftEditor, QuestionField};
use crate::gateway::{FileUpload, SurveyGateway};
use crate::routes::Route;
use crate::storage::KeyValueStore;
use crate::survey::{QuestionType, SurveyDefinition, SurveyDraft};

use super::{require_session, CommandError};

/// One question as described on the command line.
#[derive(Debug, Clone, Default)]
pub struct NewQuestion {
    pub text: String,
    pub question_type: QuestionType,
    pub required: bool,
    pub options: Vec<String>,
}

pub fn new_draft(
    store: Arc<dyn KeyValueStore>,
    title: &str,
    description: Option<&str>,
    allow_anonymous: bool,
) -> Result<SurveyDraft, CommandError> {
    let mut editor = DraftEditor::new(store);
    editor.set_title(title);
    if let Some(description) = description {
        editor.set_description(description);
    }
    editor.settings_mut().allow_anonymous = allow_anonymous;
    editor.save_draft()?;
    Ok(editor.draft().clone())
}

/// Appends a question to the saved draft. Explicit options replace the
/// seeded ones.
pub fn add_question(store: Arc<dyn KeyValueStore>, question: &NewQuestion) -> Result<usize, CommandError> {
    let mut editor = DraftEditor::restore(store);
    let index = editor.add_question();
    editor.update_question(index, QuestionField::Text(question.text.clone()))?;
    editor.update_question(index, QuestionField::Required(question.required))?;
    editor.change_question_type(index, question.question_type)?;

    if question.question_type.has_options() && !question.options.is_empty() {
        let existing = editor.draft().questions[index].options.len();
        for (slot, option) in question.options.iter().enumerate() {
            if slot >= existing {
                editor.add_option(index)?;
            }
            editor.update_option(index, slot, option)?;
        }
        for slot in (question.options.len()..existing).rev() {
            editor.remove_option(index, slot)?;
        }
    }
    editor.save_draft()?;
    Ok(index)
}

pub fn move_question(store: Arc<dyn KeyValueStore>, from: usize, to: usize) -> Result<usize, CommandError> {
    let mut editor = DraftEditor::restore(store);
    let landed = editor.move_question(from, to)?;
    editor.save_draft()?;
    Ok(landed)
}

pub fn remove_question(
    store: Arc<dyn KeyValueStore>,
    index: usize,
    confirm: &dyn Confirm,
) -> Result<bool, CommandError> {
    let mut editor = DraftEditor::restore(store);
    let removed = editor.remove_question(index, confirm)?;
    if removed {
        editor.save_draft()?;
    }
    Ok(removed)
}

pub fn clear(store: Arc<dyn KeyValueStore>) -> Result<(), CommandError> {
    DraftEditor::new(store).clear_draft()?;
    Ok(())
}

/// Plain listing of the saved draft.
pub fn show(store: Arc<dyn KeyValueStore>) -> String {
    let editor = DraftEditor::restore(store);
    let draft = editor.draft();
    let mut out = String::new();
    out.push_str(&format!("Назва: {}\n", draft.title));
    if !draft.description.is_empty() {
        out.push_str(&format!("Опис: {}\n", draft.description));
    }
    if draft.questions.is_empty() {
        out.push_str("Питань ще немає\n");
    }
    for (i, q) in draft.questions.iter().enumerate() {
        let marker = if q.required { " *" } else { "" };
        out.push_str(&format!(
            "{}. {}{} [{}]\n",
            i + 1,
            q.question_text,
            marker,
            q.question_type.label()
        ));
        for option in &q.options {
            out.push_str(&format!("   - {option}\n"));
        }
    }
    out
}

/// Validates and publishes the saved draft, attaching `cover` when given.
pub async fn submit<G>(
    gateway: &G,
    session: &Session,
    store: Arc<dyn KeyValueStore>,
    cover: Option<&Path>,
) -> Result<SurveyDefinition, CommandError>
where
    G: SurveyGateway + ?Sized,
{
    require_session(Route::CreateSurvey, session)?;
    let mut editor = DraftEditor::restore(store);
    if let Some(path) = cover {
        editor.select_cover(FileUpload::from_path(path)?)?;
    }
    Ok(editor.submit(gateway).await?)
}

#[cfg(test)]
mod tests {
    use super::{add_question, move_question, new_draft, show, submit, NewQuestion};
    use crate::commands::testing::gateway;
    use crate::commands::CommandError;
    use crate::draft::DraftError;
    use crate::storage::{KeyValueStore, MemoryStore};
    use crate::survey::QuestionType;
    use std::sync::Arc;

    fn store() -> Arc<dyn KeyValueStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn questions_accumulate_in_the_saved_draft() {
        let store = store();
        new_draft(Arc::clone(&store), "Опитування", None, true).expect("new");
        add_question(
            Arc::clone(&store),
            &NewQuestion {
                text: "Ім'я".to_string(),
                required: true,
                ..NewQuestion::default()
            },
        )
        .expect("text");
        add_question(
            Arc::clone(&store),
            &NewQuestion {
                text: "Колір".to_string(),
                question_type: QuestionType::Radio,
                options: vec!["Синій".to_string(), "Жовтий".to_string(), "Зелений".to_string()],
                ..NewQuestion::default()
            },
        )
        .expect("radio");
        add_question(
            Arc::clone(&store),
            &NewQuestion {
                text: "Що ще?".to_string(),
                question_type: QuestionType::Checkbox,
                ..NewQuestion::default()
            },
        )
        .expect("checkbox");

        let listing = show(Arc::clone(&store));
        assert!(listing.contains("1. Ім'я * [Коротка відповідь]"));
        assert!(listing.contains("   - Зелений"));
        assert!(listing.contains("   - Варіант 2"));

        assert_eq!(move_question(Arc::clone(&store), 2, 0).expect("move"), 0);
        assert!(show(store).contains("1. Що ще? [Кілька варіантів]"));
    }

    #[test]
    fn explicit_options_replace_seeds() {
        let store = store();
        new_draft(Arc::clone(&store), "T", None, true).expect("new");
        add_question(
            Arc::clone(&store),
            &NewQuestion {
                text: "Так чи ні".to_string(),
                question_type: QuestionType::Radio,
                options: vec!["Так".to_string()],
                ..NewQuestion::default()
            },
        )
        .expect("radio");
        let listing = show(store);
        assert!(listing.contains("   - Так\n"));
        assert!(!listing.contains("Варіант"));
    }

    #[tokio::test]
    async fn invalid_draft_is_not_sent() {
        let store = store();
        new_draft(Arc::clone(&store), "", None, true).expect("new");
        let api = gateway("http://127.0.0.1:9", true);
        let err = submit(&api, api.session(), store, None).await.expect_err("invalid");
        assert!(matches!(err, CommandError::Draft(DraftError::MissingTitle)));
    }

    #[tokio::test]
    async fn publishing_requires_a_session() {
        let api = gateway("http://127.0.0.1:9", false);
        let err = submit(&api, api.session(), store(), None).await.expect_err("guest");
        assert!(matches!(err, CommandError::Unauthenticated(_)));
    }
}
