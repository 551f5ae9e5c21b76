// Askama template definitions

use askama::Template;

use super::RenderContext;
use crate::db::User;

/// Custom filters for Askama templates
mod filters {
    /// Human label for a stored role
    pub fn role_label(role: &str) -> ::askama::Result<String> {
        Ok(match role {
            "unverified" => "Unverified".to_string(),
            "" => "-".to_string(),
            other => {
                let mut chars = other.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            }
        })
    }
}

// User listing
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub ctx: RenderContext,
    pub users: Vec<User>,
}

// Single user detail
#[derive(Template)]
#[template(path = "show.html")]
pub struct ShowTemplate {
    pub ctx: RenderContext,
    pub user: User,
}

// Empty create form
#[derive(Template)]
#[template(path = "new.html")]
pub struct NewTemplate {
    pub ctx: RenderContext,
}

// Pre-filled edit form
#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditTemplate {
    pub ctx: RenderContext,
    pub user: User,
}

// Sign-up form
#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub ctx: RenderContext,
}

// Login form
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub ctx: RenderContext,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 7,
            name: "Ann <script>".to_string(),
            email: "ann@example.com".to_string(),
            password: None,
            role: "unverified".to_string(),
        }
    }

    #[test]
    fn test_full_page_includes_layout() {
        let html = NewTemplate {
            ctx: RenderContext::default(),
        }
        .render()
        .unwrap();
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains(r#"action="/insert""#));
    }

    #[test]
    fn test_partial_omits_layout() {
        let html = NewTemplate {
            ctx: RenderContext {
                partial: true,
                user: None,
            },
        }
        .render()
        .unwrap();
        assert!(!html.contains("<!DOCTYPE html>"));
        assert!(html.contains(r#"action="/insert""#));
    }

    #[test]
    fn test_user_values_are_escaped() {
        let html = ShowTemplate {
            ctx: RenderContext::default(),
            user: sample_user(),
        }
        .render()
        .unwrap();
        assert!(html.contains("Ann &lt;script&gt;"));
        assert!(!html.contains("Ann <script>"));
    }

    #[test]
    fn test_layout_shows_signed_in_user() {
        let html = IndexTemplate {
            ctx: RenderContext {
                partial: false,
                user: Some("Ann".to_string()),
            },
            users: vec![],
        }
        .render()
        .unwrap();
        assert!(html.contains("Signed in as Ann"));
        assert!(html.contains(r#"href="/logout""#));
    }

    #[test]
    fn test_edit_form_is_prefilled() {
        let html = EditTemplate {
            ctx: RenderContext::default(),
            user: sample_user(),
        }
        .render()
        .unwrap();
        assert!(html.contains(r#"name="id" value="7""#));
        assert!(html.contains(r#"value="ann@example.com""#));
    }

    #[test]
    fn test_role_label() {
        assert_eq!(filters::role_label("unverified").unwrap(), "Unverified");
        assert_eq!(filters::role_label("admin").unwrap(), "Admin");
        assert_eq!(filters::role_label("").unwrap(), "-");
    }
}
