use crate::error::ClientError;
use crate::models::{Todo, TodoId, TodoPayload};
use crate::view::{self, ViewParams};
use ratatui::widgets::ListState;

/// Identifies one load so results of superseded loads can be dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// The authoritative local list plus everything needed to show it.
///
/// `visible` is recomputed by `refresh_view` after every mutation of `todos`
/// or `params`, never lazily.
#[derive(Debug)]
pub struct Browser {
    todos: Vec<Todo>,
    params: ViewParams,
    visible: Vec<Todo>,
    pub state: ListState,
    loading: bool,
    load_error: Option<String>,
    action_error: Option<String>,
    pending_delete: Option<TodoId>,
    seen_refresh: Option<u64>,
    latest_load: u64,
}

impl Default for Browser {
    fn default() -> Self {
        Browser::new()
    }
}

impl Browser {
    pub fn new() -> Browser {
        Browser {
            todos: Vec::new(),
            params: ViewParams::default(),
            visible: Vec::new(),
            state: ListState::default(),
            loading: false,
            load_error: None,
            action_error: None,
            pending_delete: None,
            seen_refresh: None,
            latest_load: 0,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn visible(&self) -> &[Todo] {
        &self.visible
    }

    pub fn params(&self) -> &ViewParams {
        &self.params
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn pending_delete(&self) -> Option<TodoId> {
        self.pending_delete
    }

    pub fn empty_message(&self) -> &'static str {
        if self.params.is_filtered() {
            "Try adjusting your search or filters"
        } else {
            "Nothing to do?!"
        }
    }

    fn refresh_view(&mut self) {
        self.visible = view::derive(&self.todos, &self.params);
        let selected = match self.state.selected() {
            _ if self.visible.is_empty() => None,
            Some(i) => Some(i.min(self.visible.len() - 1)),
            None => Some(0),
        };
        self.state.select(selected);
    }

    // Loading

    /// Starts a load if the coordinator's refresh counter moved since the
    /// last one seen. The first observation always loads.
    pub fn observe_refresh(&mut self, counter: u64) -> Option<LoadTicket> {
        if self.seen_refresh == Some(counter) {
            return None;
        }
        self.seen_refresh = Some(counter);
        Some(self.begin_load())
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.latest_load += 1;
        self.loading = true;
        self.load_error = None;
        self.action_error = None;
        LoadTicket(self.latest_load)
    }

    pub fn apply_load(&mut self, ticket: LoadTicket, result: Result<Vec<Todo>, ClientError>) {
        if ticket.0 != self.latest_load {
            tracing::debug!(ticket = ticket.0, latest = self.latest_load, "dropping stale load");
            return;
        }
        self.loading = false;
        match result {
            Ok(todos) => self.todos = todos,
            Err(err) => {
                self.todos.clear();
                self.load_error = Some(err.to_string());
            }
        }
        self.refresh_view();
    }

    // Row actions

    pub fn selected(&self) -> Option<&Todo> {
        self.state.selected().and_then(|i| self.visible.get(i))
    }

    /// Update request that flips completion of the selected todo.
    pub fn toggle_request(&self) -> Option<(TodoId, TodoPayload)> {
        self.selected()
            .map(|todo| (todo.id, TodoPayload::toggled(todo)))
    }

    pub fn apply_toggle(&mut self, id: TodoId, result: Result<Todo, ClientError>) {
        match result {
            Ok(updated) => {
                if let Some(slot) = self.todos.iter_mut().find(|t| t.id == id) {
                    *slot = updated;
                }
            }
            Err(err) => self.action_error = Some(err.to_string()),
        }
        self.refresh_view();
    }

    /// Asks for confirmation before deleting the selected todo.
    pub fn request_delete(&mut self) {
        self.pending_delete = self.selected().map(|todo| todo.id);
    }

    pub fn confirm_delete(&mut self) -> Option<TodoId> {
        self.pending_delete.take()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn apply_delete(&mut self, id: TodoId, result: Result<(), ClientError>) {
        match result {
            Ok(()) => self.todos.retain(|t| t.id != id),
            Err(err) => self.action_error = Some(err.to_string()),
        }
        self.refresh_view();
    }

    pub fn dismiss_errors(&mut self) {
        self.load_error = None;
        self.action_error = None;
    }

    // View parameters

    pub fn push_search(&mut self, c: char) {
        self.params.search_query.push(c);
        self.refresh_view();
    }

    pub fn pop_search(&mut self) {
        self.params.search_query.pop();
        self.refresh_view();
    }

    pub fn clear_search(&mut self) {
        self.params.search_query.clear();
        self.refresh_view();
    }

    pub fn cycle_priority_filter(&mut self) {
        self.params.priority = self.params.priority.next();
        self.refresh_view();
    }

    pub fn cycle_status_filter(&mut self) {
        self.params.status = self.params.status.next();
        self.refresh_view();
    }

    pub fn cycle_sort(&mut self) {
        self.params.next_sort();
        self.refresh_view();
    }

    // Navigation

    pub fn next(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i >= self.visible.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.visible.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => {
                if i == 0 {
                    self.visible.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.state.select(Some(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TodoClient, DEFAULT_TIMEOUT};
    use crate::models::Priority;
    use crate::view::StatusFilter;

    const TWO_TODOS: &str = r#"[
        {"id":1,"title":"Buy milk","priority":"LOW","completed":false},
        {"id":2,"title":"File taxes","priority":"URGENT","completed":true}
    ]"#;

    fn todo(id: u64, title: &str, priority: Priority, completed: bool) -> Todo {
        Todo {
            id: TodoId(id),
            title: title.to_string(),
            priority,
            due_date: None,
            completed,
            created_at: None,
        }
    }

    fn loaded() -> Browser {
        let mut browser = Browser::new();
        let ticket = browser.observe_refresh(0).unwrap();
        browser.apply_load(
            ticket,
            Ok(vec![
                todo(1, "Buy milk", Priority::Low, false),
                todo(2, "File taxes", Priority::Urgent, true),
            ]),
        );
        browser
    }

    fn select(browser: &mut Browser, id: u64) {
        let index = browser
            .visible()
            .iter()
            .position(|t| t.id == TodoId(id))
            .unwrap();
        browser.state.select(Some(index));
    }

    fn client_for(server: &mockito::Server) -> TodoClient {
        TodoClient::new(&format!("{}/api", server.url()), DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_observe_refresh_loads_once_per_counter_value() {
        let mut browser = Browser::new();
        assert!(browser.observe_refresh(0).is_some());
        assert!(browser.observe_refresh(0).is_none());
        assert!(browser.observe_refresh(1).is_some());
        assert!(browser.is_loading());
    }

    #[test]
    fn test_stale_load_is_ignored() {
        let mut browser = Browser::new();
        let first = browser.begin_load();
        let second = browser.begin_load();
        browser.apply_load(second, Ok(vec![todo(1, "fresh", Priority::Low, false)]));
        browser.apply_load(first, Ok(vec![]));
        assert_eq!(browser.todos().len(), 1);
    }

    #[test]
    fn test_failed_load_empties_list_and_shows_error() {
        let mut browser = loaded();
        let ticket = browser.begin_load();
        let err = ClientError::FetchFailed(reqwest_error());
        browser.apply_load(ticket, Err(err));
        assert!(browser.todos().is_empty());
        assert_eq!(
            browser.load_error(),
            Some("Failed to fetch todos. Please check if the backend server is running.")
        );
        assert_eq!(browser.empty_message(), "Nothing to do?!");

        let ticket = browser.begin_load();
        assert_eq!(browser.load_error(), None);
        browser.apply_load(ticket, Ok(vec![]));
    }

    #[test]
    fn test_empty_message_depends_on_filters() {
        let mut browser = loaded();
        browser.cycle_status_filter();
        browser.cycle_priority_filter();
        assert!(browser.visible().is_empty());
        assert_eq!(browser.empty_message(), "Try adjusting your search or filters");
    }

    #[test]
    fn test_view_follows_parameter_changes() {
        let mut browser = loaded();
        assert_eq!(browser.visible().len(), 2);

        for c in "tax".chars() {
            browser.push_search(c);
        }
        assert_eq!(browser.visible().len(), 1);
        assert_eq!(browser.visible()[0].id, TodoId(2));

        browser.clear_search();
        browser.cycle_status_filter();
        assert_eq!(browser.params().status, StatusFilter::Pending);
        assert_eq!(browser.visible()[0].id, TodoId(1));
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut browser = loaded();
        select(&mut browser, 2);
        browser.request_delete();
        assert_eq!(browser.pending_delete(), Some(TodoId(2)));

        browser.cancel_delete();
        assert_eq!(browser.confirm_delete(), None);
        assert_eq!(browser.todos().len(), 2);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut browser = loaded();
        assert_eq!(browser.state.selected(), Some(0));
        browser.next();
        browser.next();
        assert_eq!(browser.state.selected(), Some(0));
        browser.previous();
        assert_eq!(browser.state.selected(), Some(1));
    }

    #[test]
    fn test_apply_toggle_for_removed_todo_is_ignored() {
        let mut browser = loaded();
        browser.apply_delete(TodoId(1), Ok(()));
        browser.apply_toggle(TodoId(1), Ok(todo(1, "Buy milk", Priority::Low, true)));
        assert_eq!(browser.todos().len(), 1);
    }

    fn reqwest_error() -> reqwest::Error {
        // A relative URL never builds, which yields a real reqwest::Error
        reqwest::Client::new()
            .get("not a url")
            .build()
            .unwrap_err()
    }

    #[tokio::test]
    async fn test_load_from_remote() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/api/todos")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(TWO_TODOS)
            .create_async()
            .await;
        let client = client_for(&server);

        let mut browser = Browser::new();
        let ticket = browser.observe_refresh(0).unwrap();
        browser.apply_load(ticket, client.list().await);
        assert_eq!(browser.todos().len(), 2);
        assert!(!browser.is_loading());
    }

    #[tokio::test]
    async fn test_toggle_twice_restores_completion() {
        let mut server = mockito::Server::new_async().await;
        let _done = server
            .mock("PUT", "/api/todos/1")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({"completed": true})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":1,"title":"Buy milk","priority":"LOW","completed":true}"#)
            .create_async()
            .await;
        let _undone = server
            .mock("PUT", "/api/todos/1")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({"completed": false})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":1,"title":"Buy milk","priority":"LOW","completed":false}"#)
            .create_async()
            .await;
        let client = client_for(&server);

        let mut browser = loaded();
        for expected in [true, false] {
            select(&mut browser, 1);
            let (id, payload) = browser.toggle_request().unwrap();
            let result = client.update(id, &payload).await;
            browser.apply_toggle(id, result);
            assert_eq!(browser.todos()[0].completed, expected);
        }
    }

    #[tokio::test]
    async fn test_failed_toggle_leaves_list_unchanged() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("PUT", "/api/todos/1")
            .with_status(500)
            .create_async()
            .await;
        let client = client_for(&server);

        let mut browser = loaded();
        let before = browser.todos().to_vec();
        select(&mut browser, 1);
        let (id, payload) = browser.toggle_request().unwrap();
        let result = client.update(id, &payload).await;
        browser.apply_toggle(id, result);

        assert_eq!(browser.todos(), before.as_slice());
        assert!(!browser.todos()[0].completed);
        assert_eq!(
            browser.action_error(),
            Some("Failed to update todo. Please try again.")
        );
    }

    #[tokio::test]
    async fn test_confirmed_delete_removes_locally_without_reload() {
        let mut server = mockito::Server::new_async().await;
        let delete = server
            .mock("DELETE", "/api/todos/2")
            .with_status(204)
            .expect(1)
            .create_async()
            .await;
        let list = server
            .mock("GET", "/api/todos")
            .expect(0)
            .create_async()
            .await;
        let client = client_for(&server);

        let mut browser = loaded();
        select(&mut browser, 2);
        browser.request_delete();
        let id = browser.confirm_delete().unwrap();
        let result = client.delete(id).await;
        browser.apply_delete(id, result);

        assert_eq!(browser.todos().len(), 1);
        assert_eq!(browser.todos()[0].id, TodoId(1));
        delete.assert_async().await;
        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_delete_leaves_list_unchanged() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("DELETE", "/api/todos/2")
            .with_status(500)
            .create_async()
            .await;
        let client = client_for(&server);

        let mut browser = loaded();
        let result = client.delete(TodoId(2)).await;
        browser.apply_delete(TodoId(2), result);
        assert_eq!(browser.todos().len(), 2);
        assert_eq!(
            browser.action_error(),
            Some("Failed to delete todo. Please try again.")
        );
    }
}
