use super::editor::DraftEditor;
use super::DraftError;

/// Live drag-reorder. Every time the dragged question passes over another
/// position the move is committed to the draft right away.
#[derive(Debug, Default)]
pub struct DragSession {
    dragging: Option<usize>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, index: usize) {
        self.dragging = Some(index);
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    /// Returns whether a move was applied.
    pub fn over(&mut self, editor: &mut DraftEditor, index: usize) -> Result<bool, DraftError> {
        match self.dragging {
            Some(from) if from != index => {
                let landed = editor.move_question(from, index)?;
                self.dragging = Some(landed);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    pub fn end(&mut self) {
        self.dragging = None;
    }
}

#[cfg(test)]
mod tests {
    use super::DragSession;
    use crate::draft::{DraftEditor, QuestionField};
    use crate::storage::MemoryStore;
    use std::sync::Arc;

    fn editor(n: usize) -> DraftEditor {
        let mut e = DraftEditor::new(Arc::new(MemoryStore::new()));
        for i in 0..n {
            let idx = e.add_question();
            e.update_question(idx, QuestionField::Text(format!("q{i}"))).expect("text");
        }
        e
    }

    fn texts(e: &DraftEditor) -> Vec<&str> {
        e.draft()
            .questions
            .iter()
            .map(|q| q.question_text.as_str())
            .collect()
    }

    #[test]
    fn dragging_across_siblings_reorders_step_by_step() {
        let mut e = editor(4);
        let mut drag = DragSession::new();
        drag.start(0);

        assert!(drag.over(&mut e, 1).expect("over 1"));
        assert_eq!(texts(&e), vec!["q1", "q0", "q2", "q3"]);
        assert!(drag.over(&mut e, 2).expect("over 2"));
        assert_eq!(texts(&e), vec!["q1", "q2", "q0", "q3"]);
        assert_eq!(drag.dragging(), Some(2));

        // Hovering the dragged item itself changes nothing.
        assert!(!drag.over(&mut e, 2).expect("over self"));
        drag.end();
        assert!(!drag.over(&mut e, 0).expect("not dragging"));
        assert_eq!(texts(&e), vec!["q1", "q2", "q0", "q3"]);
        let orders: Vec<usize> = e.draft().questions.iter().map(|q| q.order).collect();
        assert_eq!(orders, vec![0, 1, 2, 3]);
    }
}
