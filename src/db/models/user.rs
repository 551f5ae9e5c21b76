//! User model.

use sqlx::FromRow;

/// Role given to every account until an administrator promotes it.
pub const DEFAULT_ROLE: &str = "unverified";

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Argon2 PHC string. Users created from the admin form have none and
    /// cannot log in.
    pub password: Option<String>,
    pub role: String,
}

impl User {
    pub fn can_log_in(&self) -> bool {
        self.password.as_deref().is_some_and(|p| !p.is_empty())
    }
}
