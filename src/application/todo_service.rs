use crate::domain::error::{TodoError, TodoResult};
use crate::domain::query::TodoQuery;
use crate::domain::repository::TodoRepository;
use crate::domain::todo::{self, CreateTodo, Todo, TodoId, UpdateTodo};
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
pub trait TodoService: Send + Sync + 'static {
    async fn list(&self, query: TodoQuery) -> TodoResult<Vec<Todo>>;
    async fn get(&self, id: TodoId) -> TodoResult<Todo>;
    async fn create(&self, input: CreateTodo) -> TodoResult<Todo>;
    async fn update(&self, id: TodoId, input: UpdateTodo) -> TodoResult<Todo>;
    async fn delete(&self, id: TodoId) -> TodoResult<()>;
}

/// Validates every request before the repository sees a mutation, and
/// re-checks existence ahead of replace/remove so a missing id is always
/// reported as `NotFound`.
#[derive(Clone)]
pub struct TodoServiceImpl<R: TodoRepository> {
    repo: R,
}

impl<R: TodoRepository> TodoServiceImpl<R> {
    pub fn new(repo: R) -> Self { Self { repo } }

    pub fn repository(&self) -> &R { &self.repo }
}

#[async_trait]
impl<R: TodoRepository> TodoService for TodoServiceImpl<R> {
    async fn list(&self, query: TodoQuery) -> TodoResult<Vec<Todo>> {
        query.validate()?;
        let all = self.repo.list_all().await?;
        let total = all.len();
        let result = query.apply(all);
        tracing::debug!(?query, total, returned = result.len(), "listed todos");
        Ok(result)
    }

    async fn get(&self, id: TodoId) -> TodoResult<Todo> {
        let id = id.ensure_valid()?;
        self.repo.get(id).await?.ok_or(TodoError::NotFound(id))
    }

    async fn create(&self, input: CreateTodo) -> TodoResult<Todo> {
        let record = input.into_new_todo(Utc::now())?;
        let todo = self.repo.insert(record).await?;
        tracing::info!(id = %todo.id, "created todo");
        Ok(todo)
    }

    async fn update(&self, id: TodoId, input: UpdateTodo) -> TodoResult<Todo> {
        input.validate()?;
        let existing = self.get(id).await?;
        let merged = todo::merge(existing, input, Utc::now());
        self.repo.replace(merged.id, merged.clone()).await?;
        tracing::info!(id = %merged.id, "updated todo");
        Ok(merged)
    }

    async fn delete(&self, id: TodoId) -> TodoResult<()> {
        let existing = self.get(id).await?;
        self.repo.remove(existing.id).await?;
        tracing::info!(id = %existing.id, "deleted todo");
        Ok(())
    }
}
