use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};

use super::error::AppError;
use super::validation::{require_fields, validate_email};
use crate::db::DEFAULT_ROLE;
use crate::ui::{render_template, LoginTemplate, RegisterTemplate, RenderContext};
use crate::AppState;

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Auth middleware: only authenticated sessions reach the wrapped handler.
///
/// Anything else (no cookie, unknown or expired session, logged out) gets a
/// 303 to the login page.
pub async fn require_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Response {
    if !state.sessions.load(&jar).is_authenticated() {
        tracing::debug!(path = %request.uri().path(), "Unauthenticated request, redirecting to login");
        return Redirect::to("/login").into_response();
    }

    next.run(request).await
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// GET /register
pub async fn register_page(ctx: RenderContext) -> Result<Response, AppError> {
    render_template(RegisterTemplate { ctx })
}

/// POST /register
pub async fn register_submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<RegisterForm>,
) -> Result<Redirect, AppError> {
    require_fields(&[
        ("Name", form.name.as_str()),
        ("Email", form.email.as_str()),
        ("Password", form.password.as_str()),
    ])
    .map_err(AppError::validation)?;
    validate_email(&form.email).map_err(AppError::validation)?;

    let password_hash = hash_password(&form.password).map_err(|e| {
        tracing::error!(error = %e, "Failed to hash password");
        AppError::internal("Internal server error")
    })?;

    let result = sqlx::query("INSERT INTO users (name, email, password, role) VALUES (?, ?, ?, ?)")
        .bind(&form.name)
        .bind(&form.email)
        .bind(&password_hash)
        .bind(DEFAULT_ROLE)
        .execute(&state.db)
        .await?;

    info!(user_id = result.last_insert_rowid(), "Registered user");
    Ok(Redirect::to("/"))
}

/// GET /login
pub async fn login_page(ctx: RenderContext) -> Result<Response, AppError> {
    render_template(LoginTemplate { ctx })
}

/// POST /login
pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    require_fields(&[("Email", form.email.as_str()), ("Password", form.password.as_str())])
        .map_err(AppError::validation)?;
    validate_email(&form.email).map_err(AppError::validation)?;

    let record: Option<(i64, String, Option<String>)> = sqlx::query_as(
        "SELECT id, name, password FROM users WHERE email = ? ORDER BY id LIMIT 1",
    )
    .bind(&form.email)
    .fetch_optional(&state.db)
    .await?;

    let (user_id, name, password_hash) = match record {
        Some((id, name, Some(hash))) => (id, name, hash),
        Some((id, _, None)) => {
            warn!(user_id = id, "Login failed: account has no password");
            return Err(AppError::unauthorized("Invalid email or password"));
        }
        None => {
            warn!("Login failed: unknown account");
            return Err(AppError::unauthorized("Invalid email or password"));
        }
    };

    if !verify_password(&form.password, &password_hash) {
        warn!(user_id, "Login failed: wrong password");
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    // Never authenticate an id the client already held
    let mut session = state.sessions.regenerate(state.sessions.load(&jar));
    session.authenticate(name);
    let jar = state.sessions.save(jar, session);

    info!(user_id, "User logged in");
    Ok((jar, Redirect::to("/")))
}

/// GET /logout
///
/// Only a session the store already knows is written back, so anonymous
/// callers never create entries.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, Redirect) {
    let mut session = state.sessions.load(&jar);
    if !session.is_stored() {
        return (jar, Redirect::to("/login"));
    }

    if session.is_authenticated() {
        info!(user = %session.data.user, "User logged out");
    }
    session.clear();
    let jar = state.sessions.save(jar, session);
    (jar, Redirect::to("/login"))
}
