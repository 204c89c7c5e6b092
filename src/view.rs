//! Filtering and sorting of the browser's list.
//!
//! [`derive`] is a pure function of the todo list and [`ViewParams`]; the
//! browser calls it after every change to either.

use crate::models::{Priority, Todo};
use chrono::NaiveDate;
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq, Default)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn next(&self) -> PriorityFilter {
        match self {
            PriorityFilter::All => PriorityFilter::Only(Priority::Urgent),
            PriorityFilter::Only(Priority::Urgent) => PriorityFilter::Only(Priority::High),
            PriorityFilter::Only(Priority::High) => PriorityFilter::Only(Priority::Medium),
            PriorityFilter::Only(Priority::Medium) => PriorityFilter::Only(Priority::Low),
            PriorityFilter::Only(_) => PriorityFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PriorityFilter::All => "All Priorities",
            PriorityFilter::Only(Priority::Urgent) => "Urgent",
            PriorityFilter::Only(Priority::High) => "High",
            PriorityFilter::Only(Priority::Medium) => "Medium",
            PriorityFilter::Only(Priority::Low) => "Low",
            PriorityFilter::Only(Priority::Other(_)) => "Other",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn next(self) -> StatusFilter {
        match self {
            StatusFilter::All => StatusFilter::Pending,
            StatusFilter::Pending => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All Status",
            StatusFilter::Pending => "Pending",
            StatusFilter::Completed => "Completed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    Title,
    Priority,
    DueDate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// The sort choices offered in the list header, in display order.
pub const SORT_PRESETS: [(SortField, SortOrder, &str); 8] = [
    (SortField::CreatedAt, SortOrder::Desc, "Newest First"),
    (SortField::CreatedAt, SortOrder::Asc, "Oldest First"),
    (SortField::Title, SortOrder::Asc, "Title A-Z"),
    (SortField::Title, SortOrder::Desc, "Title Z-A"),
    (SortField::Priority, SortOrder::Desc, "Priority High-Low"),
    (SortField::Priority, SortOrder::Asc, "Priority Low-High"),
    (SortField::DueDate, SortOrder::Asc, "Due Date Soon"),
    (SortField::DueDate, SortOrder::Desc, "Due Date Later"),
];

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ViewParams {
    pub search_query: String,
    pub priority: PriorityFilter,
    pub status: StatusFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl ViewParams {
    /// True when any search or filter input is set, sort excluded.
    pub fn is_filtered(&self) -> bool {
        !self.search_query.is_empty()
            || self.priority != PriorityFilter::All
            || self.status != StatusFilter::All
    }

    fn preset_index(&self) -> Option<usize> {
        SORT_PRESETS
            .iter()
            .position(|(field, order, _)| *field == self.sort_by && *order == self.sort_order)
    }

    pub fn sort_label(&self) -> &'static str {
        self.preset_index()
            .map(|i| SORT_PRESETS[i].2)
            .unwrap_or("Custom")
    }

    pub fn next_sort(&mut self) {
        let next = self.preset_index().map(|i| i + 1).unwrap_or(0) % SORT_PRESETS.len();
        let (field, order, _) = SORT_PRESETS[next];
        self.sort_by = field;
        self.sort_order = order;
    }
}

fn far_future() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

fn compare(a: &Todo, b: &Todo, field: SortField) -> Ordering {
    match field {
        SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
        SortField::DueDate => {
            let a_due = a.due_on().unwrap_or_else(far_future);
            let b_due = b.due_on().unwrap_or_else(far_future);
            a_due.cmp(&b_due)
        }
        SortField::CreatedAt => a.created_key().cmp(&b.created_key()),
    }
}

/// Applies search, priority and status filters, then a stable sort.
///
/// Equal keys keep their relative order from `todos` under both orders.
pub fn derive(todos: &[Todo], params: &ViewParams) -> Vec<Todo> {
    let query = params.search_query.trim().to_lowercase();

    let mut visible: Vec<Todo> = todos
        .iter()
        .filter(|todo| query.is_empty() || todo.title.to_lowercase().contains(&query))
        .filter(|todo| match &params.priority {
            PriorityFilter::All => true,
            PriorityFilter::Only(p) => todo.priority == *p,
        })
        .filter(|todo| match params.status {
            StatusFilter::All => true,
            StatusFilter::Pending => !todo.completed,
            StatusFilter::Completed => todo.completed,
        })
        .cloned()
        .collect();

    visible.sort_by(|a, b| match params.sort_order {
        SortOrder::Asc => compare(a, b, params.sort_by),
        SortOrder::Desc => compare(b, a, params.sort_by),
    });

    visible
}
