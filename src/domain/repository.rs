use async_trait::async_trait;
use super::todo::{NewTodo, Todo, TodoId};

/// Storage collaborator. Owns durability and whatever locking concurrent
/// callers need; callers get a consistent view per single call.
#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn init(&self) -> anyhow::Result<()>;
    /// Stores the record under a freshly assigned id and returns it.
    async fn insert(&self, record: NewTodo) -> anyhow::Result<Todo>;
    async fn get(&self, id: TodoId) -> anyhow::Result<Option<Todo>>;
    /// Every live record, in no particular order.
    async fn list_all(&self) -> anyhow::Result<Vec<Todo>>;
    async fn replace(&self, id: TodoId, record: Todo) -> anyhow::Result<()>;
    async fn remove(&self, id: TodoId) -> anyhow::Result<()>;
}
