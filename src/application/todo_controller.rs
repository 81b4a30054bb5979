use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::notifier::{Notification, Notifier};
use crate::domain::backend::TodoBackend;
use crate::domain::error::{BackendError, ClientError, FetchError, MutationError, MutationKind};
use crate::domain::todo::{Category, Todo, TodoDraft, TodoId};

/// Server state as of the last applied refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListSnapshot {
    pub todos: Vec<Todo>,
    pub categories: Vec<Category>,
    /// Sequence number of the refresh that produced this snapshot, 0 before the first.
    pub revision: u64,
}

impl ListSnapshot {
    pub fn todo(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RefreshRequested,
    Create(TodoDraft),
    Update(TodoId, TodoDraft),
    Remove(TodoId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    /// A later refresh was issued while this one was in flight; its result was dropped.
    Superseded,
}

/// Single writer of the authoritative todo and category lists.
///
/// Every failure is reported through the [`Notifier`] before it is returned,
/// so callers are free to ignore the `Err` side. A failed operation never
/// changes the published snapshot.
pub struct TodoListController<B: TodoBackend, N: Notifier> {
    backend: B,
    notifier: N,
    state: watch::Sender<ListSnapshot>,
    issued: AtomicU64,
}

impl<B: TodoBackend, N: Notifier> TodoListController<B, N> {
    pub fn new(backend: B, notifier: N) -> Self {
        let (state, _) = watch::channel(ListSnapshot::default());
        Self { backend, notifier, state, issued: AtomicU64::new(0) }
    }

    /// Read-only handle on the authoritative lists.
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.state.borrow().clone()
    }

    pub async fn dispatch(&self, command: Command) -> Result<(), ClientError> {
        match command {
            Command::RefreshRequested => self.refresh().await.map(|_| ()).map_err(ClientError::from),
            Command::Create(draft) => self.create(draft).await,
            Command::Update(id, draft) => self.update(id, draft).await,
            Command::Remove(id) => self.remove(id).await,
        }
    }

    /// Fetches todos and categories together and replaces both lists, unless a
    /// newer refresh has been issued in the meantime.
    pub async fn refresh(&self) -> Result<RefreshOutcome, FetchError> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(seq, "refresh started");

        let (todos, categories) = tokio::join!(self.backend.list_todos(), self.backend.list_categories());
        let fetched = match (todos, categories) {
            (Ok(todos), Ok(categories)) => Ok((todos, categories)),
            (Err(e), _) => Err(FetchError::todos(e)),
            (_, Err(e)) => Err(FetchError::categories(e)),
        };

        if self.issued.load(Ordering::SeqCst) != seq {
            debug!(seq, "refresh superseded, result dropped");
            return Ok(RefreshOutcome::Superseded);
        }

        let (todos, categories) = match fetched {
            Ok(lists) => lists,
            Err(err) => {
                warn!(seq, error = %err, "refresh failed");
                self.notifier.notify(Notification::error(err.notice()));
                return Err(err);
            }
        };

        let count = todos.len();
        // re-check under the channel lock so a slower, older fetch cannot overwrite a newer one
        let applied = self.state.send_if_modified(|current| {
            if seq <= current.revision || self.issued.load(Ordering::SeqCst) != seq {
                return false;
            }
            *current = ListSnapshot { todos, categories, revision: seq };
            true
        });
        if applied {
            info!(seq, todos = count, "todo list refreshed");
            Ok(RefreshOutcome::Applied)
        } else {
            debug!(seq, "refresh superseded, result dropped");
            Ok(RefreshOutcome::Superseded)
        }
    }

    pub async fn create(&self, draft: TodoDraft) -> Result<(), ClientError> {
        self.validate(&draft)?;
        let payload = draft.to_create_payload();
        let result = self.backend.create_todo(payload).await;
        self.finish_mutation(MutationKind::Create, None, result).await
    }

    /// Replaces the editable fields of `id`. Completion is carried over from
    /// the current list since the edit form does not expose it.
    pub async fn update(&self, id: TodoId, draft: TodoDraft) -> Result<(), ClientError> {
        self.validate(&draft)?;
        let completed = self.state.borrow().todo(id).map(|t| t.completed);
        let Some(completed) = completed else {
            let err = MutationError::UnknownTodo(id);
            warn!(%id, "update of todo missing from the list");
            self.notifier.notify(Notification::error(err.notice()));
            return Err(err.into());
        };
        let result = self.backend.update_todo(id, draft.to_update_payload(completed)).await;
        self.finish_mutation(MutationKind::Update, Some(id), result).await
    }

    pub async fn remove(&self, id: TodoId) -> Result<(), ClientError> {
        let result = self.backend.delete_todo(id).await;
        self.finish_mutation(MutationKind::Delete, Some(id), result).await
    }

    fn validate(&self, draft: &TodoDraft) -> Result<(), ClientError> {
        draft.validate().map_err(|err| {
            debug!(error = %err, "draft rejected before dispatch");
            self.notifier.notify(Notification::error(err.notice()));
            ClientError::from(err)
        })
    }

    async fn finish_mutation(
        &self,
        action: MutationKind,
        id: Option<TodoId>,
        result: Result<(), BackendError>,
    ) -> Result<(), ClientError> {
        match result {
            Ok(()) => {
                info!(action = action.verb(), id = ?id.map(|i| i.0), "mutation accepted");
                self.notifier.notify(Notification::success(action.success_notice()));
                // the refresh reports its own failure
                let _ = self.refresh().await;
                Ok(())
            }
            Err(source) => {
                let err = MutationError::Backend { action, source };
                warn!(action = action.verb(), id = ?id.map(|i| i.0), error = %err, "mutation failed");
                self.notifier.notify(Notification::error(err.notice()));
                Err(err.into())
            }
        }
    }
}
