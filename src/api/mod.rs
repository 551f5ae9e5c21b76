pub mod auth;
pub mod error;
mod users;
pub mod validation;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Requires an authenticated session
    let protected_routes = Router::new()
        .route("/", get(users::index).fallback(error::method_not_allowed))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_session,
        ));

    // User pages (public)
    let user_routes = Router::new()
        .route(
            "/user/:id",
            get(users::show).fallback(error::method_not_allowed),
        )
        .route(
            "/new",
            get(users::new_form).fallback(error::method_not_allowed),
        )
        .route(
            "/edit/:id",
            get(users::edit_form)
                .post(users::edit_form)
                .fallback(error::method_not_allowed),
        )
        .route(
            "/insert",
            post(users::insert).fallback(error::method_not_allowed),
        )
        .route(
            "/update",
            post(users::update).fallback(error::method_not_allowed),
        )
        .route(
            "/delete/:id",
            get(users::delete)
                .post(users::delete)
                .fallback(error::method_not_allowed),
        );

    // Auth routes (public)
    let auth_routes = Router::new()
        .route(
            "/register",
            get(auth::register_page)
                .post(auth::register_submit)
                .fallback(error::method_not_allowed),
        )
        .route(
            "/login",
            get(auth::login_page)
                .post(auth::login_submit)
                .fallback(error::method_not_allowed),
        )
        .route(
            "/logout",
            get(auth::logout).fallback(error::method_not_allowed),
        );

    Router::new()
        .merge(protected_routes)
        .merge(user_routes)
        .merge(auth_routes)
        .route("/health", get(|| async { "OK" }))
        .nest_service("/static", ServeDir::new(&state.config.server.static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
