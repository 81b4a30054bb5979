use async_trait::async_trait;

use super::error::BackendError;
use super::todo::{Category, Todo, TodoId, TodoPayload};

/// The remote REST backend that owns persistence.
#[async_trait]
pub trait TodoBackend: Send + Sync + 'static {
    async fn list_todos(&self) -> Result<Vec<Todo>, BackendError>;
    async fn list_categories(&self) -> Result<Vec<Category>, BackendError>;
    async fn create_todo(&self, payload: TodoPayload) -> Result<(), BackendError>;
    async fn update_todo(&self, id: TodoId, payload: TodoPayload) -> Result<(), BackendError>;
    async fn delete_todo(&self, id: TodoId) -> Result<(), BackendError>;
}
