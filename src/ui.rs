use crate::app::{App, InputMode};
use crate::browser::Browser;
use crate::editor::{Editor, EditorField};
use crate::models::{Priority, Todo};
use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event as CEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

fn centered_rect_absolute(width: u16, height: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length((r.height.saturating_sub(height)) / 2),
                Constraint::Length(height),
                Constraint::Length((r.height.saturating_sub(height) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Length((r.width.saturating_sub(width)) / 2),
                Constraint::Length(width),
                Constraint::Length((r.width.saturating_sub(width) + 1) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

pub fn format_due_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => "No due date".to_string(),
    }
}

/// Strictly before `today`; a todo due today is not overdue.
pub fn is_overdue(date: NaiveDate, today: NaiveDate) -> bool {
    date < today
}

fn priority_style(priority: &Priority) -> Style {
    let bg = match priority {
        Priority::Urgent => Color::Red,
        Priority::High => Color::Yellow,
        Priority::Medium => Color::Cyan,
        Priority::Low => Color::Blue,
        Priority::Other(_) => Color::Gray,
    };
    Style::default().bg(bg).fg(Color::Black)
}

fn todo_line(todo: &Todo, today: NaiveDate) -> Line<'static> {
    let mut spans = vec![
        Span::raw(if todo.completed { "[x] " } else { "[ ] " }),
        Span::styled(
            todo.title.clone(),
            if todo.completed {
                Style::default().add_modifier(Modifier::CROSSED_OUT | Modifier::DIM)
            } else {
                Style::default()
            },
        ),
        Span::raw(" "),
        Span::styled(format!(" {} ", todo.priority.as_wire()), priority_style(&todo.priority)),
    ];

    if todo.due_date.is_some() {
        let due = todo.due_on();
        let overdue = !todo.completed && due.map(|d| is_overdue(d, today)).unwrap_or(false);
        let mut text = format!(" {}", format_due_date(due));
        if overdue {
            text.push_str(" (Overdue)");
        }
        let style = if overdue {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(text, style));
    }

    Line::from(spans)
}

fn get_legend(app: &App) -> Text<'static> {
    let key = |k: &'static str| Span::styled(k, Style::default().fg(Color::Red));

    if app.browser.pending_delete().is_some() {
        return Text::from(Line::from(vec![
            key(" y "),
            Span::raw(": Delete "),
            key(" n "),
            Span::raw(": Keep "),
        ]));
    }

    match app.input_mode {
        InputMode::Normal => Text::from(Line::from(vec![
            key(" q "),
            Span::raw(": Quit "),
            key(" j/k "),
            Span::raw(": Move "),
            key(" a "),
            Span::raw(": Add "),
            key(" e "),
            Span::raw(": Edit "),
            key(" space "),
            Span::raw(": Toggle Done "),
            key(" d "),
            Span::raw(": Delete "),
            key(" / "),
            Span::raw(": Search "),
            key(" p "),
            Span::raw(": Priority "),
            key(" s "),
            Span::raw(": Status "),
            key(" o "),
            Span::raw(": Sort "),
            key(" r "),
            Span::raw(": Reload "),
            key(" x "),
            Span::raw(": Dismiss Error "),
        ])),
        InputMode::Editing => Text::from(Line::from(vec![
            key(" Enter "),
            Span::raw(": Submit "),
            key(" Tab "),
            Span::raw(": Next Field "),
            key(" ←/→ "),
            Span::raw(": Priority "),
            key(" Esc "),
            Span::raw(": Cancel "),
        ])),
        InputMode::Search => Text::from(Line::from(vec![
            key(" Enter "),
            Span::raw(": Keep "),
            key(" Esc "),
            Span::raw(": Clear "),
        ])),
    }
}

fn render_editor(f: &mut Frame, area: Rect, editor: &Editor, focused: bool) {
    let title = match (editor.is_editing(), editor.is_busy()) {
        (true, true) => "Updating...",
        (false, true) => "Adding...",
        (true, false) => "Edit Todo",
        (false, false) => "Add New Todo",
    };

    let field_style = |field: EditorField| {
        if editor.is_busy() {
            Style::default().fg(Color::DarkGray)
        } else if focused && editor.field() == field {
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        }
    };
    let label = Style::default().add_modifier(Modifier::BOLD);
    let draft = editor.draft();

    let mut lines = vec![
        Line::from(vec![
            Span::styled("Title *: ", label),
            Span::styled(draft.title.clone(), field_style(EditorField::Title)),
        ]),
        Line::from(vec![
            Span::styled("Priority: ", label),
            Span::styled(
                format!("< {} >", draft.priority),
                field_style(EditorField::Priority),
            ),
        ]),
        Line::from(vec![
            Span::styled("Due Date: ", label),
            Span::styled(
                if draft.due_date.is_empty() && !(focused && editor.field() == EditorField::DueDate)
                {
                    "YYYY-MM-DD".to_string()
                } else {
                    draft.due_date.clone()
                },
                field_style(EditorField::DueDate),
            ),
        ]),
    ];

    if let Some(error) = editor.error() {
        lines.push(Line::from(Span::styled(
            error.to_string(),
            Style::default().fg(Color::Red),
        )));
    }

    let border = if focused {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    let form = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(form, area);
}

fn render_filters(f: &mut Frame, area: Rect, browser: &Browser, searching: bool) {
    let params = browser.params();
    let label = Style::default().add_modifier(Modifier::BOLD);
    let search_style = if searching {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };

    let line = Line::from(vec![
        Span::styled("Search: ", label),
        Span::styled(
            if params.search_query.is_empty() && !searching {
                "Search todos...".to_string()
            } else {
                params.search_query.clone()
            },
            search_style,
        ),
        Span::raw("  "),
        Span::styled("Priority: ", label),
        Span::raw(params.priority.label()),
        Span::raw("  "),
        Span::styled("Status: ", label),
        Span::raw(params.status.label()),
        Span::raw("  "),
        Span::styled("Sort: ", label),
        Span::raw(params.sort_label()),
    ]);

    let bar = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Filters"));
    f.render_widget(bar, area);
}

fn render_list(f: &mut Frame, area: Rect, browser: &mut Browser) {
    let title = format!("Todo List ({} items)", browser.visible().len());
    let block = Block::default().borders(Borders::ALL).title(title);

    if browser.is_loading() {
        let loading = Paragraph::new("Loading todos...")
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(loading, area);
        return;
    }

    if browser.visible().is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(Span::styled(
                "No todos found",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(browser.empty_message()),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let today = Local::now().date_naive();
    let items: Vec<ListItem> = browser
        .visible()
        .iter()
        .map(|todo| ListItem::new(todo_line(todo, today)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, &mut browser.state);
}

pub fn render(f: &mut Frame, app: &mut App) {
    let size = f.area();

    let error = app
        .browser
        .load_error()
        .or(app.browser.action_error())
        .map(str::to_string);
    let editor_height = if app.editor.error().is_some() { 6 } else { 5 };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(editor_height),
                Constraint::Length(3),
                Constraint::Length(if error.is_some() { 3 } else { 0 }),
                Constraint::Min(0),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(size);

    render_editor(
        f,
        chunks[0],
        &app.editor,
        app.input_mode == InputMode::Editing,
    );
    render_filters(f, chunks[1], &app.browser, app.input_mode == InputMode::Search);

    if let Some(error) = error {
        let banner = Paragraph::new(error)
            .style(Style::default().fg(Color::Red))
            .block(Block::default().borders(Borders::ALL).title("Error"))
            .wrap(Wrap { trim: true });
        f.render_widget(banner, chunks[2]);
    }

    render_list(f, chunks[3], &mut app.browser);

    let legend = Paragraph::new(get_legend(app))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(legend, chunks[4]);

    if app.browser.pending_delete().is_some() {
        let popup_area = centered_rect_absolute(50, 3, size);
        let popup = Paragraph::new("Are you sure you want to delete this todo? (y/n)")
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Delete Todo")
                    .style(Style::default().fg(Color::Red)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, popup_area);
        f.render_widget(popup, popup_area);
    }
}

pub async fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> io::Result<()> {
    app.start();
    loop {
        app.drain_messages();
        terminal.draw(|f| render(f, &mut app))?;

        // Handle input
        if event::poll(Duration::from_millis(100))? {
            if let CEvent::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_input(key) {
                    return Ok(());
                }
            }
        }
    }
}
