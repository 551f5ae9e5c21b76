//! User CRUD pages.
//!
//! Each handler issues at most one statement. Update and delete do not
//! check that the row exists first; a missing id is a silent no-op.

use axum::{
    extract::{Path, State},
    response::{Redirect, Response},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info};

use super::error::AppError;
use super::validation::{parse_user_id, require_fields, validate_email};
use crate::db::{User, DEFAULT_ROLE};
use crate::ui::{
    render_template, EditTemplate, IndexTemplate, NewTemplate, RenderContext, ShowTemplate,
};
use crate::{AppState, DbPool};

/// Fields shared by the create and update forms
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserForm {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateUserForm {
    pub id: String,
    pub name: String,
    pub email: String,
}

fn validate_user_fields(name: &str, email: &str) -> Result<(), AppError> {
    require_fields(&[("Name", name), ("Email", email)]).map_err(AppError::validation)?;
    validate_email(email).map_err(AppError::validation)
}

async fn find_user(db: &DbPool, id: i64) -> Result<User, AppError> {
    sqlx::query_as("SELECT id, name, email, password, role FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))
}

/// GET /
pub async fn index(
    State(state): State<Arc<AppState>>,
    ctx: RenderContext,
) -> Result<Response, AppError> {
    let users: Vec<User> =
        sqlx::query_as("SELECT id, name, email, password, role FROM users ORDER BY id")
            .fetch_all(&state.db)
            .await?;
    info!(count = users.len(), "Retrieved users");

    render_template(IndexTemplate { ctx, users })
}

/// GET /user/:id
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ctx: RenderContext,
) -> Result<Response, AppError> {
    let user = find_user(&state.db, id).await?;
    render_template(ShowTemplate { ctx, user })
}

/// GET /new
pub async fn new_form(ctx: RenderContext) -> Result<Response, AppError> {
    render_template(NewTemplate { ctx })
}

/// GET|POST /edit/:id
pub async fn edit_form(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    ctx: RenderContext,
) -> Result<Response, AppError> {
    let user = find_user(&state.db, id).await?;
    render_template(EditTemplate { ctx, user })
}

/// POST /insert
pub async fn insert(
    State(state): State<Arc<AppState>>,
    Form(form): Form<UserForm>,
) -> Result<Redirect, AppError> {
    if let Err(e) = validate_user_fields(&form.name, &form.email) {
        debug!(reason = %e.message(), "Rejected insert");
        return Err(e);
    }

    let result = sqlx::query("INSERT INTO users (name, email, role) VALUES (?, ?, ?)")
        .bind(&form.name)
        .bind(&form.email)
        .bind(DEFAULT_ROLE)
        .execute(&state.db)
        .await?;

    info!(user_id = result.last_insert_rowid(), name = %form.name, "User inserted");
    Ok(Redirect::to("/"))
}

/// POST /update
pub async fn update(
    State(state): State<Arc<AppState>>,
    Form(form): Form<UpdateUserForm>,
) -> Result<Redirect, AppError> {
    let id = parse_user_id(&form.id).map_err(AppError::validation)?;
    validate_user_fields(&form.name, &form.email)?;

    let result = sqlx::query("UPDATE users SET name = ?, email = ? WHERE id = ?")
        .bind(&form.name)
        .bind(&form.email)
        .bind(id)
        .execute(&state.db)
        .await?;

    info!(user_id = id, rows = result.rows_affected(), "User updated");
    Ok(Redirect::to("/"))
}

/// GET|POST /delete/:id
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&state.db)
        .await?;

    info!(user_id = id, rows = result.rows_affected(), "User deleted");
    Ok(Redirect::to("/"))
}
