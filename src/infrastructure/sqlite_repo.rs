use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow}, Pool, Row, Sqlite};

use crate::domain::{
    repository::TodoRepository,
    todo::{NewTodo, Todo, TodoId},
};

#[derive(Clone)]
pub struct SqliteTodoRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteTodoRepository {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid sqlite url {database_url}"))?
            .create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(5);
        if database_url.contains(":memory:") {
            // each connection to an in-memory database sees its own database,
            // and closing the last one drops it
            pool_options = pool_options.max_connections(1).idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                is_completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&*self.pool)
        .await?;
        Ok(())
    }

    async fn insert(&self, record: NewTodo) -> Result<Todo> {
        let result = sqlx::query(
            "INSERT INTO todos (title, is_completed, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&record.title)
        .bind(record.is_completed)
        .bind(format_timestamp(record.created_at))
        .bind(format_timestamp(record.updated_at))
        .execute(&*self.pool)
        .await?;
        Ok(record.with_id(TodoId(result.last_insert_rowid())))
    }

    async fn get(&self, id: TodoId) -> Result<Option<Todo>> {
        let row = sqlx::query("SELECT id, title, is_completed, created_at, updated_at FROM todos WHERE id = ?1")
            .bind(id.0)
            .fetch_optional(&*self.pool)
            .await?;
        row.map(row_to_todo).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Todo>> {
        let rows = sqlx::query("SELECT id, title, is_completed, created_at, updated_at FROM todos ORDER BY id")
            .fetch_all(&*self.pool)
            .await?;
        rows.into_iter().map(row_to_todo).collect()
    }

    async fn replace(&self, id: TodoId, record: Todo) -> Result<()> {
        let result = sqlx::query("UPDATE todos SET title = ?2, is_completed = ?3, created_at = ?4, updated_at = ?5 WHERE id = ?1")
            .bind(id.0)
            .bind(&record.title)
            .bind(record.is_completed)
            .bind(format_timestamp(record.created_at))
            .bind(format_timestamp(record.updated_at))
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            bail!("no todo stored under id {id}");
        }
        Ok(())
    }

    async fn remove(&self, id: TodoId) -> Result<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1")
            .bind(id.0)
            .execute(&*self.pool)
            .await?;
        if result.rows_affected() == 0 {
            bail!("no todo stored under id {id}");
        }
        Ok(())
    }
}

fn format_timestamp(at: DateTime<Utc>) -> String { at.to_rfc3339_opts(SecondsFormat::Nanos, true) }

fn parse_timestamp(column: &str, value: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("corrupt {column} value {value:?}"))?
        .with_timezone(&Utc))
}

fn row_to_todo(row: SqliteRow) -> Result<Todo> {
    let id: i64 = row.try_get("id")?;
    let title: String = row.try_get("title")?;
    let is_completed: bool = row.try_get("is_completed")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(Todo {
        id: TodoId(id),
        title,
        is_completed,
        created_at: parse_timestamp("created_at", &created_at)?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}
