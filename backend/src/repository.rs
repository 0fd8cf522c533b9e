//! Task rows. The only code that reads or writes the `tasks` table.

use chrono::{DateTime, Utc};
use tasks_shared::{CreateTaskRequest, Task, UpdateTaskRequest};
use tracing::debug;

use crate::db::{Session, StorageError};

const COLUMNS: &str = "id, title, description, completed, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub async fn create(session: &mut Session, new: &CreateTaskRequest) -> Result<Task, StorageError> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "INSERT INTO tasks (title, description, completed, created_at)
         VALUES (?, ?, ?, ?)
         RETURNING {COLUMNS}"
    ))
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.completed)
    .bind(Utc::now())
    .fetch_one(session.conn())
    .await?;

    debug!(task_id = row.id, "Inserted task");
    Ok(row.into())
}

/// Tasks in insertion (id) order, skipping `skip` and returning at most `limit`.
pub async fn list(session: &mut Session, skip: i64, limit: i64) -> Result<Vec<Task>, StorageError> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {COLUMNS} FROM tasks ORDER BY id ASC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(skip)
    .fetch_all(session.conn())
    .await?;

    debug!(skip, limit, count = rows.len(), "Listed tasks");
    Ok(rows.into_iter().map(Task::from).collect())
}

pub async fn get(session: &mut Session, id: i64) -> Result<Option<Task>, StorageError> {
    let row = sqlx::query_as::<_, TaskRow>(&format!("SELECT {COLUMNS} FROM tasks WHERE id = ?"))
        .bind(id)
        .fetch_optional(session.conn())
        .await?;

    Ok(row.map(Task::from))
}

/// Read a row while taking the database write lock.
///
/// SQLite has no `SELECT ... FOR UPDATE`. A no-op `UPDATE ... RETURNING` as the
/// first statement of a session makes SQLite acquire the write lock up front,
/// waiting on the busy timeout, so a later write in the same session cannot
/// fail on lock upgrade. Matches no row, and changes nothing, when `id` is absent.
pub async fn get_for_update(session: &mut Session, id: i64) -> Result<Option<Task>, StorageError> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "UPDATE tasks SET id = id WHERE id = ? RETURNING {COLUMNS}"
    ))
    .bind(id)
    .fetch_optional(session.conn())
    .await?;

    Ok(row.map(Task::from))
}

/// Merge `changes` into the stored row.
///
/// Returns `None` without writing anything when no row has this id.
pub async fn update(
    session: &mut Session,
    id: i64,
    changes: &UpdateTaskRequest,
) -> Result<Option<Task>, StorageError> {
    let Some(mut task) = get_for_update(session, id).await? else {
        return Ok(None);
    };

    task.apply(changes, Utc::now());

    sqlx::query(
        "UPDATE tasks SET title = ?, description = ?, completed = ?, updated_at = ? WHERE id = ?",
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.completed)
    .bind(task.updated_at)
    .bind(task.id)
    .execute(session.conn())
    .await?;

    debug!(task_id = id, "Updated task");
    Ok(Some(task))
}

/// Hard delete. Returns whether a row was removed.
pub async fn delete(session: &mut Session, id: i64) -> Result<bool, StorageError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
        .bind(id)
        .execute(session.conn())
        .await?;

    let removed = result.rows_affected() > 0;
    debug!(task_id = id, removed, "Deleted task");
    Ok(removed)
}
