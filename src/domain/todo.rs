use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::ValidationError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CategoryId(pub i64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A todo as read from the backend. The category arrives resolved to its
/// display object; writes refer to it by id only (see [`TodoPayload`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    #[serde(default, deserialize_with = "wire::null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default, with = "wire::calendar_date")]
    pub due_date: Option<NaiveDate>,
}

impl Todo {
    pub fn status_label(&self) -> &'static str {
        if self.completed { "Completed" } else { "In Progress" }
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category.as_ref().map(|c| c.id)
    }
}

/// User-editable fields of a todo, as produced by the create and edit forms.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoDraft {
    pub title: String,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub due_date: Option<NaiveDate>,
}

impl TodoDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Body for a creation request. New todos always start incomplete.
    pub fn to_create_payload(&self) -> TodoPayload {
        self.to_payload(false)
    }

    /// Body for an update request; the edit form has no completion toggle so
    /// the caller supplies the current flag.
    pub fn to_update_payload(&self, completed: bool) -> TodoPayload {
        self.to_payload(completed)
    }

    fn to_payload(&self, completed: bool) -> TodoPayload {
        TodoPayload {
            title: self.title.clone(),
            description: self.description.clone(),
            completed,
            category_id: self.category_id,
            due_date: self.due_date,
        }
    }
}

/// Write-side wire shape shared by POST /todos and PATCH /todos/{id}.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoPayload {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub category_id: Option<CategoryId>,
    #[serde(default, with = "wire::calendar_date")]
    pub due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Completed,
    InProgress,
}

impl StatusFilter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Completed => todo.completed,
            StatusFilter::InProgress => !todo.completed,
        }
    }

    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::InProgress,
            StatusFilter::InProgress => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Completed => "Completed",
            StatusFilter::InProgress => "In Progress",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "completed" => Ok(StatusFilter::Completed),
            "in-progress" | "inprogress" => Ok(StatusFilter::InProgress),
            other => Err(format!("unknown status filter: {other}")),
        }
    }
}

mod wire {
    use serde::{Deserialize, Deserializer};

    pub fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
    }

    pub mod calendar_date {
        use chrono::{DateTime, NaiveDate, NaiveDateTime};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
            match date {
                Some(d) => s.serialize_str(&d.format("%Y-%m-%d").to_string()),
                None => s.serialize_none(),
            }
        }

        // The backend may echo a stored date-time; only the calendar date matters.
        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
            let Some(raw) = Option::<String>::deserialize(d)? else { return Ok(None) };
            let raw = raw.trim();
            if raw.is_empty() { return Ok(None); }
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .or_else(|_| raw.parse::<NaiveDateTime>().map(|dt| dt.date()))
                .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
                .map(Some)
                .map_err(|_| serde::de::Error::custom(format!("invalid due_date: {raw}")))
        }
    }
}
