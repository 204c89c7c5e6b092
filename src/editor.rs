use crate::api::TodoClient;
use crate::error::{ClientError, ValidationError};
use crate::models::{Draft, Todo, TodoId, TodoPayload};
use crate::parser::parse_entry;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorField {
    Title,
    Priority,
    DueDate,
}

impl EditorField {
    fn next(self) -> EditorField {
        match self {
            EditorField::Title => EditorField::Priority,
            EditorField::Priority => EditorField::DueDate,
            EditorField::DueDate => EditorField::Title,
        }
    }

    fn previous(self) -> EditorField {
        match self {
            EditorField::Title => EditorField::DueDate,
            EditorField::Priority => EditorField::Title,
            EditorField::DueDate => EditorField::Priority,
        }
    }
}

/// Outcome of a successful submit, reported to the coordinator.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    Created(Todo),
    Updated(Todo),
}

/// A validated submit, ready to send.
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitRequest {
    Create(TodoPayload),
    Update(TodoId, TodoPayload),
}

impl SubmitRequest {
    pub async fn send(self, client: &TodoClient) -> Result<EditorEvent, ClientError> {
        match self {
            SubmitRequest::Create(payload) => client.create(&payload).await.map(EditorEvent::Created),
            SubmitRequest::Update(id, payload) => client
                .update(id, &payload)
                .await
                .map(EditorEvent::Updated),
        }
    }
}

/// Form state for creating a todo or editing the selected one.
///
/// Without a selection the editor creates; with one it updates that todo.
/// While a submit is in flight the editor is busy and ignores all input.
#[derive(Debug)]
pub struct Editor {
    editing: Option<Todo>,
    draft: Draft,
    field: EditorField,
    error: Option<String>,
    busy: bool,
}

impl Default for Editor {
    fn default() -> Self {
        Editor::new()
    }
}

impl Editor {
    pub fn new() -> Editor {
        Editor {
            editing: None,
            draft: Draft::default(),
            field: EditorField::Title,
            error: None,
            busy: false,
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn field(&self) -> EditorField {
        self.field
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Follows the coordinator's selection. A changed selection reseeds the
    /// draft from the selected todo, or resets it when the selection clears.
    pub fn sync(&mut self, selected: Option<&Todo>) {
        if self.editing.as_ref() == selected {
            return;
        }
        self.editing = selected.cloned();
        self.draft = match &self.editing {
            Some(todo) => Draft::from_todo(todo),
            None => Draft::default(),
        };
        self.field = EditorField::Title;
        self.error = None;
    }

    fn reset(&mut self) {
        self.draft = Draft::default();
        self.field = EditorField::Title;
        self.error = None;
    }

    /// Clears the draft. The caller also clears the coordinator's selection.
    pub fn cancel(&mut self) {
        if self.busy {
            return;
        }
        self.reset();
    }

    pub fn next_field(&mut self) {
        if !self.busy {
            self.field = self.field.next();
        }
    }

    pub fn previous_field(&mut self) {
        if !self.busy {
            self.field = self.field.previous();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if self.busy {
            return;
        }
        match self.field {
            EditorField::Title => self.draft.title.push(c),
            EditorField::DueDate => self.draft.due_date.push(c),
            EditorField::Priority => return,
        }
        self.error = None;
    }

    pub fn pop_char(&mut self) {
        if self.busy {
            return;
        }
        match self.field {
            EditorField::Title => {
                self.draft.title.pop();
            }
            EditorField::DueDate => {
                self.draft.due_date.pop();
            }
            EditorField::Priority => return,
        }
        self.error = None;
    }

    pub fn cycle_priority(&mut self, forward: bool) {
        if self.busy || self.field != EditorField::Priority {
            return;
        }
        self.draft.priority = if forward {
            self.draft.priority.next()
        } else {
            self.draft.priority.previous()
        };
    }

    /// Quick-entry markers are only read when creating. An existing todo's
    /// title is sent as typed, and a title made only of markers is kept
    /// literally.
    fn payload(&self) -> Result<TodoPayload, ValidationError> {
        let raw = self.draft.title.trim();
        if raw.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let typed_due = self.draft.due_date.trim();
        let mut payload = TodoPayload {
            title: raw.to_string(),
            priority: self.draft.priority.clone(),
            due_date: (!typed_due.is_empty()).then(|| typed_due.to_string()),
            completed: self.editing.as_ref().map(|todo| todo.completed),
        };

        if self.editing.is_none() {
            let entry = parse_entry(raw);
            if !entry.title.is_empty() {
                payload.title = entry.title;
                if let Some(priority) = entry.priority {
                    payload.priority = priority;
                }
                if entry.due_date.is_some() {
                    payload.due_date = entry.due_date;
                }
            }
        }

        Ok(payload)
    }

    /// Validates the draft and marks the editor busy.
    ///
    /// Returns `None` when already busy or when validation fails; in the
    /// latter case the validation message becomes the form error.
    pub fn begin_submit(&mut self) -> Option<SubmitRequest> {
        if self.busy {
            return None;
        }
        match self.payload() {
            Ok(payload) => {
                self.busy = true;
                self.error = None;
                Some(match &self.editing {
                    Some(todo) => SubmitRequest::Update(todo.id, payload),
                    None => SubmitRequest::Create(payload),
                })
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }

    /// Applies the submit result. Success resets the draft and yields the
    /// event for the coordinator; failure keeps the draft for a retry.
    pub fn finish_submit(&mut self, result: Result<EditorEvent, ClientError>) -> Option<EditorEvent> {
        self.busy = false;
        match result {
            Ok(event) => {
                self.reset();
                Some(event)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }
}
