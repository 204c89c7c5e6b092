use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::models::Priority;

static PRIORITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)!(low|medium|high|urgent|[1-4])\b\s*").expect("priority pattern is valid")
});

static DUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bdue:(\d{4}-\d{2}-\d{2})\b\s*").expect("due pattern is valid")
});

static SPACES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

#[derive(Debug, PartialEq)]
pub struct ParsedEntry {
    pub title: String,
    pub priority: Option<Priority>,
    pub due_date: Option<String>,
}

/// Pulls `!<priority>` and `due:YYYY-MM-DD` markers out of a title.
///
/// The first marker of each kind wins. When no marker is present the title is
/// only trimmed; otherwise markers are removed and whitespace collapsed.
pub fn parse_entry(input: &str) -> ParsedEntry {
    let mut priority = None;
    let mut due_date = None;

    for caps in PRIORITY_RE.captures_iter(input) {
        if let Some(m) = caps.get(1) {
            if priority.is_none() {
                priority = Some(priority_token(m.as_str()));
            }
        }
    }

    for caps in DUE_RE.captures_iter(input) {
        if let Some(m) = caps.get(1) {
            if due_date.is_none() && parse_date(m.as_str()).is_some() {
                due_date = Some(m.as_str().to_string());
            }
        }
    }

    if priority.is_none() && due_date.is_none() {
        return ParsedEntry {
            title: input.trim().to_string(),
            priority,
            due_date,
        };
    }

    let title = PRIORITY_RE.replace_all(input, "");
    let title = DUE_RE.replace_all(&title, |caps: &Captures| {
        if parse_date(&caps[1]).is_some() {
            String::new()
        } else {
            caps[0].to_string()
        }
    });
    let title = SPACES_RE.replace_all(&title, " ").trim().to_string();

    ParsedEntry {
        title,
        priority,
        due_date,
    }
}

fn priority_token(token: &str) -> Priority {
    match token {
        "1" => Priority::Low,
        "2" => Priority::Medium,
        "3" => Priority::High,
        "4" => Priority::Urgent,
        other => Priority::from(other.to_string()),
    }
}

/// Date-only part of an ISO date or date-time string.
pub fn date_portion(value: &str) -> &str {
    value.split('T').next().unwrap_or(value).trim()
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_portion(value), "%Y-%m-%d").ok()
}
