use crate::models::Todo;

/// State shared by the editor and the browser.
///
/// `refresh_counter` only ever grows; the browser reloads whenever it sees a
/// value it has not seen before.
#[derive(Debug, Default)]
pub struct AppContext {
    selected_for_edit: Option<Todo>,
    refresh_counter: u64,
}

impl AppContext {
    pub fn new() -> AppContext {
        AppContext::default()
    }

    pub fn selected_for_edit(&self) -> Option<&Todo> {
        self.selected_for_edit.as_ref()
    }

    pub fn refresh_counter(&self) -> u64 {
        self.refresh_counter
    }

    pub fn on_created(&mut self, todo: &Todo) {
        tracing::info!(id = %todo.id, "todo created");
        self.refresh_counter += 1;
    }

    pub fn on_updated(&mut self, todo: &Todo) {
        tracing::info!(id = %todo.id, "todo updated");
        self.selected_for_edit = None;
        self.refresh_counter += 1;
    }

    pub fn on_edit_requested(&mut self, todo: Todo) {
        tracing::debug!(id = %todo.id, "edit requested");
        self.selected_for_edit = Some(todo);
    }

    pub fn on_cancel_edit(&mut self) {
        self.selected_for_edit = None;
    }
}
