use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use tasks_shared::{
    parse_json_body, CreateTaskRequest, FieldError, Pagination, TaskResponse, UpdateTaskRequest,
    ValidationErrors,
};
use tracing::info;

use crate::db::Database;
use crate::error::ApiError;
use crate::repository;

pub const WELCOME_MESSAGE: &str = "Welcome to the Task Tracker API";

pub async fn root() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn not_found() -> (StatusCode, Json<Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not Found" })))
}

pub async fn create_task(
    State(db): State<Database>,
    body: Bytes,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let payload = CreateTaskRequest::from_json(&parse_json_body(&body)?)?;

    let mut session = db.acquire().await?;
    let task = repository::create(&mut session, &payload).await?;
    session.commit().await?;

    info!(task_id = task.id, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_tasks(
    State(db): State<Database>,
    query: Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let Query(page) = query.map_err(query_error)?;
    let page = page.validate()?;

    let mut session = db.acquire().await?;
    let tasks = repository::list(&mut session, page.skip, page.limit).await?;
    session.commit().await?;

    Ok(Json(tasks))
}

pub async fn get_task(
    Path(id): Path<String>,
    State(db): State<Database>,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = parse_task_id(&id)?;

    let mut session = db.acquire().await?;
    let task = repository::get(&mut session, id).await?;
    session.commit().await?;

    task.map(Json).ok_or(ApiError::NotFound)
}

pub async fn update_task(
    Path(id): Path<String>,
    State(db): State<Database>,
    body: Bytes,
) -> Result<Json<TaskResponse>, ApiError> {
    let id = parse_task_id(&id)?;
    let changes = UpdateTaskRequest::from_json(&parse_json_body(&body)?)?;

    // update must be the session's first statement so it takes the write lock
    let mut session = db.acquire().await?;
    match repository::update(&mut session, id, &changes).await? {
        Some(task) => {
            session.commit().await?;
            info!(task_id = id, "Task updated");
            Ok(Json(task))
        }
        None => Err(ApiError::NotFound),
    }
}

pub async fn delete_task(
    Path(id): Path<String>,
    State(db): State<Database>,
) -> Result<StatusCode, ApiError> {
    let id = parse_task_id(&id)?;

    let mut session = db.acquire().await?;
    if repository::delete(&mut session, id).await? {
        session.commit().await?;
        info!(task_id = id, "Task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

fn parse_task_id(raw: &str) -> Result<i64, ValidationErrors> {
    raw.parse().map_err(|_| {
        ValidationErrors::single(FieldError::new(
            &["path", "task_id"],
            "int_parsing",
            "Input should be a valid integer, unable to parse string as an integer",
        ))
    })
}

fn query_error(rejection: QueryRejection) -> ValidationErrors {
    ValidationErrors::single(FieldError::new(
        &["query"],
        "int_parsing",
        rejection.body_text(),
    ))
}
