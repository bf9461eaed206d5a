//! Todo persistence on SQLite.
//!
//! Queries are built at runtime with `sqlx::query`, so the crate builds
//! without a database at hand. [`TodoStore::migrate`] creates the table if
//! it is missing and is safe to call on every start.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;

const MAX_TITLE_LEN: usize = 200;

/// Errors from the todo store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("todo {id} not found")]
    NotFound { id: i64 },

    #[error("invalid todo: {0}")]
    Invalid(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Todo urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown priority '{0}', expected high, medium or low")]
pub struct ParsePriorityError(String);

impl FromStr for Priority {
    type Err = ParsePriorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(ParsePriorityError(other.to_string())),
        }
    }
}

/// A stored todo.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Todo {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let priority: String = row.try_get("priority")?;
        Ok(Todo {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            priority: priority
                .parse()
                .map_err(|e: ParsePriorityError| sqlx::Error::Decode(Box::new(e)))?,
            completed: row.try_get("completed")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Fields for a new todo. Only `title` is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewTodo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
}

impl NewTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            completed: false,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }
}

/// A partial update. Absent fields are left as they are.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TodoPatch {
    pub title: Option<String>,
    /// `Some(None)` clears the description; JSON `null` deserializes to it.
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub priority: Option<Priority>,
    pub completed: Option<bool>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_title(title: &str) -> Result<(), StoreError> {
    if title.trim().is_empty() {
        return Err(StoreError::Invalid("title must not be empty".into()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(StoreError::Invalid(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

const SELECT_TODO: &str =
    "SELECT id, title, description, priority, completed, created_at, updated_at FROM todos";

/// Todo repository over a SQLite pool.
#[derive(Debug, Clone)]
pub struct TodoStore {
    pool: SqlitePool,
}

impl TodoStore {
    /// Opens the database at `url`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] for a malformed URL or a failed
    /// connection.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        tracing::debug!(url, "connected to todo database");
        Ok(Self { pool })
    }

    /// A private in-memory database, migrated and ready to use.
    pub async fn in_memory() -> Result<Self, StoreError> {
        // The database lives as long as its only connection
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                priority TEXT NOT NULL DEFAULT 'medium',
                completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// All todos, oldest first.
    pub async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let todos = sqlx::query_as::<_, Todo>(&format!("{SELECT_TODO} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(todos)
    }

    pub async fn get(&self, id: i64) -> Result<Todo, StoreError> {
        sqlx::query_as::<_, Todo>(&format!("{SELECT_TODO} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound { id })
    }

    /// Inserts a todo and returns it with its id and timestamps.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Invalid`] for an empty or overlong title.
    pub async fn create(&self, todo: NewTodo) -> Result<Todo, StoreError> {
        validate_title(&todo.title)?;
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO todos (title, description, priority, completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.priority.as_str())
        .bind(todo.completed)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        self.get(id).await
    }

    /// Applies `patch` to the todo `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] for an unknown id and
    /// [`StoreError::Invalid`] if the new title is rejected.
    pub async fn update(&self, id: i64, patch: TodoPatch) -> Result<Todo, StoreError> {
        let mut todo = self.get(id).await?;
        if let Some(title) = patch.title {
            validate_title(&title)?;
            todo.title = title;
        }
        if let Some(description) = patch.description {
            todo.description = description;
        }
        if let Some(priority) = patch.priority {
            todo.priority = priority;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }

        sqlx::query(
            "UPDATE todos SET title = ?, description = ?, priority = ?, completed = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.priority.as_str())
        .bind(todo.completed)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        self.get(id).await
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound { id });
        }
        Ok(())
    }

    /// Removes every todo and returns how many there were.
    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM todos").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    /// Inserts `todos` in one transaction. Either all rows land or none do.
    pub async fn insert_many(&self, todos: &[NewTodo]) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        let count = insert_all(&mut tx, todos).await?;
        tx.commit().await?;
        Ok(count)
    }

    /// Deletes every todo and inserts `todos` in their place, atomically.
    /// Returns the number of rows removed and inserted.
    pub async fn replace_all(&self, todos: &[NewTodo]) -> Result<(u64, u64), StoreError> {
        let mut tx = self.pool.begin().await?;
        let deleted = sqlx::query("DELETE FROM todos")
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let created = insert_all(&mut tx, todos).await?;
        tx.commit().await?;
        Ok((deleted, created))
    }
}

async fn insert_all(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    todos: &[NewTodo],
) -> Result<u64, StoreError> {
    for todo in todos {
        validate_title(&todo.title)?;
    }
    let now = Utc::now();
    let mut count = 0;
    for todo in todos {
        count += sqlx::query(
            "INSERT INTO todos (title, description, priority, completed, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(todo.priority.as_str())
        .bind(todo.completed)
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await?
        .rows_affected();
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse() {
        assert_eq!("high".parse::<Priority>(), Ok(Priority::High));
        assert_eq!(Priority::Low.to_string(), "low");
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_new_todo_json_defaults() {
        let todo: NewTodo = serde_json::from_str(r#"{"title":"x"}"#).unwrap();
        assert_eq!(todo, NewTodo::new("x"));
        assert_eq!(todo.priority, Priority::Medium);
    }

    #[tokio::test]
    async fn test_crud() {
        let store = TodoStore::in_memory().await.unwrap();

        let created = store
            .create(NewTodo::new("write docs").priority(Priority::High))
            .await
            .unwrap();
        assert_eq!(created.title, "write docs");
        assert_eq!(created.priority, Priority::High);
        assert!(!created.completed);

        let updated = store
            .update(
                created.id,
                TodoPatch {
                    completed: Some(true),
                    ..TodoPatch::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.completed);
        assert_eq!(updated.title, "write docs");
        assert!(updated.updated_at >= created.updated_at);

        assert_eq!(store.list().await.unwrap().len(), 1);
        store.delete(created.id).await.unwrap();
        assert!(matches!(
            store.get(created.id).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete(created.id).await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_in_memory_stores_are_private() {
        let first = TodoStore::in_memory().await.unwrap();
        let second = TodoStore::in_memory().await.unwrap();
        first.create(NewTodo::new("only here")).await.unwrap();

        assert_eq!(first.list().await.unwrap().len(), 1);
        assert!(second.list().await.unwrap().is_empty());
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let absent: TodoPatch = serde_json::from_str(r#"{"completed":true}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: TodoPatch = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: TodoPatch = serde_json::from_str(r#"{"description":"notes"}"#).unwrap();
        assert_eq!(set.description, Some(Some("notes".to_string())));
    }

    #[tokio::test]
    async fn test_update_clears_description() {
        let store = TodoStore::in_memory().await.unwrap();
        let todo = store
            .create(NewTodo::new("write docs").description("README first"))
            .await
            .unwrap();

        let kept = store
            .update(
                todo.id,
                TodoPatch {
                    completed: Some(true),
                    ..TodoPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(kept.description.as_deref(), Some("README first"));

        let cleared = store
            .update(
                todo.id,
                TodoPatch {
                    description: Some(None),
                    ..TodoPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.description, None);
    }

    #[tokio::test]
    async fn test_blank_title_is_invalid() {
        let store = TodoStore::in_memory().await.unwrap();
        assert!(matches!(
            store.create(NewTodo::new("   ")).await,
            Err(StoreError::Invalid(_))
        ));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_many_is_all_or_nothing() {
        let store = TodoStore::in_memory().await.unwrap();
        let batch = [NewTodo::new("one"), NewTodo::new("")];
        assert!(store.insert_many(&batch).await.is_err());
        assert!(store.list().await.unwrap().is_empty());

        let batch = [NewTodo::new("one"), NewTodo::new("two")];
        assert_eq!(store.insert_many(&batch).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_replace_all() {
        let store = TodoStore::in_memory().await.unwrap();
        store.create(NewTodo::new("old")).await.unwrap();

        let (deleted, created) = store
            .replace_all(&[NewTodo::new("a"), NewTodo::new("b")])
            .await
            .unwrap();
        assert_eq!((deleted, created), (1, 2));

        let titles: Vec<_> = store.list().await.unwrap().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert_eq!(store.delete_all().await.unwrap(), 2);
    }
}
