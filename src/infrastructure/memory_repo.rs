use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::{
    repository::TodoRepository,
    todo::{NewTodo, Todo, TodoId},
};

#[derive(Debug)]
struct Store {
    items: BTreeMap<TodoId, Todo>,
    next_id: i64,
}

/// In-process repository. Clones share the same store.
#[derive(Clone)]
pub struct InMemoryTodoRepository {
    store: Arc<RwLock<Store>>,
}

impl Default for InMemoryTodoRepository {
    fn default() -> Self {
        Self { store: Arc::new(RwLock::new(Store { items: BTreeMap::new(), next_id: 1 })) }
    }
}

impl InMemoryTodoRepository {
    pub fn new() -> Self { Self::default() }

    /// Starts with one incomplete todo per title, ids assigned in order.
    pub fn seeded<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let now = Utc::now();
        let mut store = Store { items: BTreeMap::new(), next_id: 1 };
        for title in titles {
            let id = TodoId(store.next_id);
            store.next_id += 1;
            let todo = NewTodo { title: title.into(), is_completed: false, created_at: now, updated_at: now }.with_id(id);
            store.items.insert(id, todo);
        }
        Self { store: Arc::new(RwLock::new(store)) }
    }
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn init(&self) -> Result<()> { Ok(()) }

    async fn insert(&self, record: NewTodo) -> Result<Todo> {
        let mut store = self.store.write().await;
        let id = TodoId(store.next_id);
        store.next_id += 1;
        let todo = record.with_id(id);
        store.items.insert(id, todo.clone());
        Ok(todo)
    }

    async fn get(&self, id: TodoId) -> Result<Option<Todo>> {
        Ok(self.store.read().await.items.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Todo>> {
        Ok(self.store.read().await.items.values().cloned().collect())
    }

    async fn replace(&self, id: TodoId, record: Todo) -> Result<()> {
        let mut store = self.store.write().await;
        match store.items.get_mut(&id) {
            Some(slot) => *slot = record,
            None => bail!("no todo stored under id {id}"),
        }
        Ok(())
    }

    async fn remove(&self, id: TodoId) -> Result<()> {
        let mut store = self.store.write().await;
        if store.items.remove(&id).is_none() {
            bail!("no todo stored under id {id}");
        }
        Ok(())
    }
}
