use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

use crate::api::{comment_handlers, handlers};
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<Arc<S>> {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Pizzas
        .route(
            "/pizzas",
            get(handlers::list_pizzas::<S>).post(handlers::create_pizza::<S>),
        )
        .route(
            "/pizzas/:id",
            get(handlers::get_pizza::<S>)
                .put(handlers::update_pizza::<S>)
                .delete(handlers::delete_pizza::<S>),
        )
        // Comments live under their pizza
        .route(
            "/pizzas/:id/comments",
            post(comment_handlers::add_comment::<S>),
        )
        .route(
            "/pizzas/:id/comments/:comment_id",
            delete(comment_handlers::remove_comment::<S>),
        )
        // Replies live under their comment
        .route("/comments/:comment_id", get(comment_handlers::get_comment::<S>))
        .route(
            "/comments/:comment_id/replies",
            post(comment_handlers::add_reply::<S>),
        )
        .route(
            "/comments/:comment_id/replies/:reply_id",
            delete(comment_handlers::remove_reply::<S>),
        )
}

/// The full application: API routes over `store`, with unmatched paths served
/// from `static_dir` when one is configured.
pub fn build_app<S: Store + 'static>(store: Arc<S>, static_dir: Option<&str>) -> Router {
    let app = create_router::<S>().with_state(store);
    match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    }
}
