use crate::api::TodoClient;
use crate::browser::{Browser, LoadTicket};
use crate::context::AppContext;
use crate::editor::{Editor, EditorEvent};
use crate::error::ClientError;
use crate::models::{Todo, TodoId};
use crossterm::event::{KeyCode, KeyEvent};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
    Search,
}

/// Completion of a spawned request, delivered back to the event loop.
#[derive(Debug)]
pub enum AppMessage {
    Loaded {
        ticket: LoadTicket,
        result: Result<Vec<Todo>, ClientError>,
    },
    Submitted(Result<EditorEvent, ClientError>),
    Toggled {
        id: TodoId,
        result: Result<Todo, ClientError>,
    },
    Deleted {
        id: TodoId,
        result: Result<(), ClientError>,
    },
}

pub struct App {
    pub client: TodoClient,
    pub context: AppContext,
    pub editor: Editor,
    pub browser: Browser,
    pub input_mode: InputMode,
    tx: UnboundedSender<AppMessage>,
    rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(client: TodoClient) -> App {
        let (tx, rx) = mpsc::unbounded_channel();
        App {
            client,
            context: AppContext::new(),
            editor: Editor::new(),
            browser: Browser::new(),
            input_mode: InputMode::Normal,
            tx,
            rx,
        }
    }

    /// Performs the initial load. Must run inside a tokio runtime.
    pub fn start(&mut self) {
        self.sync();
    }

    /// Propagates coordinator state to the editor and the browser.
    fn sync(&mut self) {
        self.editor.sync(self.context.selected_for_edit());
        if let Some(ticket) = self.browser.observe_refresh(self.context.refresh_counter()) {
            self.spawn_load(ticket);
        }
    }

    fn spawn_load(&self, ticket: LoadTicket) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.list().await;
            let _ = tx.send(AppMessage::Loaded { ticket, result });
        });
    }

    fn spawn_toggle(&mut self) {
        let Some((id, payload)) = self.browser.toggle_request() else {
            return;
        };
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.update(id, &payload).await;
            let _ = tx.send(AppMessage::Toggled { id, result });
        });
    }

    fn spawn_delete(&mut self) {
        let Some(id) = self.browser.confirm_delete() else {
            return;
        };
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.delete(id).await;
            let _ = tx.send(AppMessage::Deleted { id, result });
        });
    }

    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::Loaded { ticket, result } => self.browser.apply_load(ticket, result),
            AppMessage::Submitted(result) => {
                if let Some(event) = self.editor.finish_submit(result) {
                    match &event {
                        EditorEvent::Created(todo) => self.context.on_created(todo),
                        EditorEvent::Updated(todo) => self.context.on_updated(todo),
                    }
                    if self.input_mode == InputMode::Editing {
                        self.input_mode = InputMode::Normal;
                    }
                    self.sync();
                }
            }
            AppMessage::Toggled { id, result } => self.browser.apply_toggle(id, result),
            AppMessage::Deleted { id, result } => self.browser.apply_delete(id, result),
        }
    }

    /// Applies every message that has already arrived without waiting.
    pub fn drain_messages(&mut self) {
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
        }
    }

    /// Waits for the next message.
    pub async fn recv(&mut self) -> Option<AppMessage> {
        self.rx.recv().await
    }

    /// Handles one key press. Returns `true` when the user asked to quit.
    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        if self.browser.pending_delete().is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.spawn_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.browser.cancel_delete()
                }
                _ => {}
            }
            return false;
        }

        match self.input_mode {
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => return true,
                KeyCode::Char('j') | KeyCode::Down => self.browser.next(),
                KeyCode::Char('k') | KeyCode::Up => self.browser.previous(),
                KeyCode::Char(' ') | KeyCode::Char('c') => self.spawn_toggle(),
                KeyCode::Char('d') => self.browser.request_delete(),
                KeyCode::Char('e') => {
                    if let Some(todo) = self.browser.selected().cloned() {
                        self.context.on_edit_requested(todo);
                        self.sync();
                        self.input_mode = InputMode::Editing;
                    }
                }
                KeyCode::Char('a') => self.input_mode = InputMode::Editing,
                KeyCode::Char('/') => self.input_mode = InputMode::Search,
                KeyCode::Char('p') => self.browser.cycle_priority_filter(),
                KeyCode::Char('s') => self.browser.cycle_status_filter(),
                KeyCode::Char('o') => self.browser.cycle_sort(),
                KeyCode::Char('r') => {
                    let ticket = self.browser.begin_load();
                    self.spawn_load(ticket);
                }
                KeyCode::Char('x') => self.browser.dismiss_errors(),
                _ => {}
            },

            InputMode::Editing => {
                if self.editor.is_busy() {
                    return false;
                }
                match key.code {
                    KeyCode::Esc => {
                        self.editor.cancel();
                        self.context.on_cancel_edit();
                        self.sync();
                        self.input_mode = InputMode::Normal;
                    }
                    KeyCode::Tab => self.editor.next_field(),
                    KeyCode::BackTab => self.editor.previous_field(),
                    KeyCode::Left => self.editor.cycle_priority(false),
                    KeyCode::Right => self.editor.cycle_priority(true),
                    KeyCode::Enter => self.submit(),
                    KeyCode::Char(c) => self.editor.push_char(c),
                    KeyCode::Backspace => self.editor.pop_char(),
                    _ => {}
                }
            }

            InputMode::Search => match key.code {
                KeyCode::Esc => {
                    self.browser.clear_search();
                    self.input_mode = InputMode::Normal;
                }
                KeyCode::Enter => self.input_mode = InputMode::Normal,
                KeyCode::Char(c) => self.browser.push_search(c),
                KeyCode::Backspace => self.browser.pop_search(),
                _ => {}
            },
        }
        false
    }

    fn submit(&mut self) {
        let Some(request) = self.editor.begin_submit() else {
            return;
        };
        let client = self.client.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = request.send(&client).await;
            let _ = tx.send(AppMessage::Submitted(result));
        });
    }
}
