use std::fmt;

use thiserror::Error;

use super::todo::TodoId;

/// Failure of a single exchange with the backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("backend answered with status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection { Todos, Categories }

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Collection::Todos => "todos", Collection::Categories => "categories" })
    }
}

/// Read-path failure during a refresh.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("failed to fetch {collection}: {source}")]
pub struct FetchError {
    pub collection: Collection,
    #[source]
    pub source: BackendError,
}

impl FetchError {
    pub fn todos(source: BackendError) -> Self { Self { collection: Collection::Todos, source } }
    pub fn categories(source: BackendError) -> Self { Self { collection: Collection::Categories, source } }

    pub fn notice(&self) -> String {
        format!("Failed to fetch {}", self.collection)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind { Create, Update, Delete }

impl MutationKind {
    pub fn verb(self) -> &'static str {
        match self { MutationKind::Create => "create", MutationKind::Update => "update", MutationKind::Delete => "delete" }
    }

    fn gerund(self) -> &'static str {
        match self { MutationKind::Create => "creating", MutationKind::Update => "updating", MutationKind::Delete => "deleting" }
    }

    pub fn success_notice(self) -> String {
        let past = match self { MutationKind::Create => "created", MutationKind::Update => "updated", MutationKind::Delete => "deleted" };
        format!("Todo {past} successfully")
    }
}

/// Write-path failure. Local state is never touched when one of these occurs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MutationError {
    #[error("failed to {} todo: {}", .action.verb(), .source)]
    Backend { action: MutationKind, #[source] source: BackendError },
    #[error("todo {0} is not in the current list")]
    UnknownTodo(TodoId),
}

impl MutationError {
    pub fn notice(&self) -> String {
        match self {
            // a rejected request and an unreachable backend read differently to the user
            MutationError::Backend { action, source: BackendError::Transport(_) } => format!("Error {} todo", action.gerund()),
            MutationError::Backend { action, .. } => format!("Failed to {} todo", action.verb()),
            MutationError::UnknownTodo(_) => "Todo no longer exists".to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("title must not be empty")]
    EmptyTitle,
    #[error("due date must be YYYY-MM-DD, got {0:?}")]
    InvalidDueDate(String),
}

impl ValidationError {
    pub fn notice(&self) -> String {
        match self {
            ValidationError::EmptyTitle => "Please enter a title".to_string(),
            ValidationError::InvalidDueDate(_) => "Please enter the due date as YYYY-MM-DD".to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
