use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::domain::{
    backend::TodoBackend,
    error::BackendError,
    todo::{Category, Todo, TodoId, TodoPayload},
};

/// [`TodoBackend`] speaking JSON over HTTP to the REST API.
#[derive(Clone)]
pub struct HttpTodoBackend {
    client: Client,
    base_url: String,
}

impl HttpTodoBackend {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { client, base_url: config.api_url.clone() })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        debug!(path, "GET");
        let res = self.client.get(self.url(path)).send().await.map_err(transport)?;
        check_status(res)?.json::<T>().await.map_err(|e| BackendError::Decode(e.to_string()))
    }
}

#[async_trait]
impl TodoBackend for HttpTodoBackend {
    async fn list_todos(&self) -> Result<Vec<Todo>, BackendError> {
        self.get_json("/todos").await
    }

    async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        self.get_json("/categories").await
    }

    async fn create_todo(&self, payload: TodoPayload) -> Result<(), BackendError> {
        debug!("POST /todos");
        let res = self.client.post(self.url("/todos")).json(&payload).send().await.map_err(transport)?;
        check_status(res).map(|_| ())
    }

    async fn update_todo(&self, id: TodoId, payload: TodoPayload) -> Result<(), BackendError> {
        let path = format!("/todos/{id}");
        debug!(path = %path, "PATCH");
        let res = self.client.patch(self.url(&path)).json(&payload).send().await.map_err(transport)?;
        check_status(res).map(|_| ())
    }

    async fn delete_todo(&self, id: TodoId) -> Result<(), BackendError> {
        let path = format!("/todos/{id}");
        debug!(path = %path, "DELETE");
        let res = self.client.delete(self.url(&path)).send().await.map_err(transport)?;
        check_status(res).map(|_| ())
    }
}

fn transport(e: reqwest::Error) -> BackendError {
    BackendError::Transport(e.to_string())
}

fn check_status(res: Response) -> Result<Response, BackendError> {
    let status = res.status();
    if status.is_success() { Ok(res) } else { Err(BackendError::Status(status.as_u16())) }
}
