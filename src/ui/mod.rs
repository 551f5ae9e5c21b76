// Server-side rendering with Askama templates + HTMX fragments

mod templates;

use askama::Template;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use std::convert::Infallible;
use std::sync::Arc;

use crate::api::error::AppError;
use crate::AppState;

pub use templates::*;

/// Header HTMX adds to every request it issues
pub const HX_REQUEST: &str = "HX-Request";

/// Per-request rendering context, computed once by the extractor.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    /// Render only the page fragment, without the surrounding layout
    pub partial: bool,
    /// Display name of the logged-in user
    pub user: Option<String>,
}

impl RenderContext {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_name(&self) -> &str {
        self.user.as_deref().unwrap_or_default()
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RenderContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let partial = parts.headers.contains_key(HX_REQUEST);
        let session = state.sessions.load(&CookieJar::from_headers(&parts.headers));
        let user = session
            .is_authenticated()
            .then(|| session.data.user.clone());

        Ok(Self { partial, user })
    }
}

// Helper to render templates and turn failures into a 500
pub fn render_template<T: Template>(template: T) -> Result<Response, AppError> {
    let html = template.render()?;
    Ok(Html(html).into_response())
}
