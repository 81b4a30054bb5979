//! In-process stand-in for the REST backend, served on an ephemeral port.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Clone, Debug)]
struct StoredTodo {
    id: i64,
    title: String,
    description: Option<String>,
    completed: bool,
    category_id: Option<i64>,
    due_date: Option<String>,
}

#[derive(Default)]
struct Db {
    todos: Vec<StoredTodo>,
    categories: Vec<(i64, String)>,
    next_id: i64,
}

#[derive(Clone, Default)]
pub struct FakeBackend {
    db: Arc<Mutex<Db>>,
    fail_reads: Arc<AtomicU16>,
    fail_writes: Arc<AtomicU16>,
}

#[derive(Deserialize)]
struct WriteBody {
    title: Option<String>,
    description: Option<String>,
    completed: Option<bool>,
    category_id: Option<i64>,
    due_date: Option<String>,
}

impl FakeBackend {
    pub fn with_categories(names: &[&str]) -> Self {
        let backend = Self::default();
        backend.db.lock().unwrap().categories = names.iter().enumerate().map(|(i, n)| (i as i64 + 1, n.to_string())).collect();
        backend
    }

    /// Makes every GET answer `status` (0 restores normal behaviour).
    pub fn fail_reads_with(&self, status: u16) { self.fail_reads.store(status, Ordering::SeqCst); }

    /// Makes every POST/PATCH/DELETE answer `status` (0 restores normal behaviour).
    pub fn fail_writes_with(&self, status: u16) { self.fail_writes.store(status, Ordering::SeqCst); }

    pub fn todo_count(&self) -> usize { self.db.lock().unwrap().todos.len() }

    pub fn raw_due_date(&self, id: i64) -> Option<String> {
        self.db.lock().unwrap().todos.iter().find(|t| t.id == id).and_then(|t| t.due_date.clone())
    }

    pub async fn serve(self) -> SocketAddr {
        let app = Router::new()
            .route("/todos", get(list_todos).post(create_todo))
            .route("/todos/:id", patch(update_todo).delete(delete_todo))
            .route("/categories", get(list_categories))
            .with_state(self);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        addr
    }

    fn render(db: &Db, t: &StoredTodo) -> Value {
        let category = t
            .category_id
            .and_then(|cid| db.categories.iter().find(|(id, _)| *id == cid))
            .map(|(id, name)| json!({ "id": id, "name": name, "description": null }));
        json!({
            "id": t.id,
            "title": t.title,
            "description": t.description,
            "completed": t.completed,
            "category": category,
            // stored as a date-time, the way the real backend echoes it
            "due_date": t.due_date.as_ref().map(|d| format!("{d}T00:00:00")),
            "created_at": "2024-06-01T08:00:00",
            "updated_at": "2024-06-01T08:00:00",
        })
    }
}

fn injected(flag: &AtomicU16) -> Result<(), StatusCode> {
    match flag.load(Ordering::SeqCst) {
        0 => Ok(()),
        code => Err(StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)),
    }
}

async fn list_todos(State(s): State<FakeBackend>) -> Result<Json<Value>, StatusCode> {
    injected(&s.fail_reads)?;
    let db = s.db.lock().unwrap();
    Ok(Json(Value::Array(db.todos.iter().map(|t| FakeBackend::render(&db, t)).collect())))
}

async fn list_categories(State(s): State<FakeBackend>) -> Result<Json<Value>, StatusCode> {
    injected(&s.fail_reads)?;
    let db = s.db.lock().unwrap();
    Ok(Json(Value::Array(db.categories.iter().map(|(id, name)| json!({ "id": id, "name": name })).collect())))
}

async fn create_todo(State(s): State<FakeBackend>, Json(body): Json<WriteBody>) -> Result<(StatusCode, Json<Value>), StatusCode> {
    injected(&s.fail_writes)?;
    let title = body.title.filter(|t| !t.is_empty()).ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;
    let mut db = s.db.lock().unwrap();
    db.next_id += 1;
    let todo = StoredTodo {
        id: db.next_id,
        title,
        description: body.description,
        completed: body.completed.unwrap_or(false),
        category_id: body.category_id,
        due_date: body.due_date,
    };
    db.todos.push(todo.clone());
    Ok((StatusCode::CREATED, Json(FakeBackend::render(&db, &todo))))
}

async fn update_todo(State(s): State<FakeBackend>, Path(id): Path<i64>, Json(body): Json<WriteBody>) -> Result<Json<Value>, StatusCode> {
    injected(&s.fail_writes)?;
    let mut guard = s.db.lock().unwrap();
    let db = &mut *guard;
    let todo = db.todos.iter_mut().find(|t| t.id == id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(title) = body.title { todo.title = title; }
    if body.description.is_some() { todo.description = body.description; }
    if let Some(completed) = body.completed { todo.completed = completed; }
    todo.category_id = body.category_id;
    todo.due_date = body.due_date;
    let todo = todo.clone();
    Ok(Json(FakeBackend::render(db, &todo)))
}

async fn delete_todo(State(s): State<FakeBackend>, Path(id): Path<i64>) -> Result<StatusCode, StatusCode> {
    injected(&s.fail_writes)?;
    let mut db = s.db.lock().unwrap();
    let before = db.todos.len();
    db.todos.retain(|t| t.id != id);
    if db.todos.len() == before { Err(StatusCode::NOT_FOUND) } else { Ok(StatusCode::NO_CONTENT) }
}
