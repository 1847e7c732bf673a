// HTTP routes configuration

use crate::core::state::AppState;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Public endpoints
        .route("/health", get(crate::handlers::health::health_handler))
        .route(
            "/boards",
            get(crate::handlers::boards::list_handler).post(crate::handlers::boards::create_handler),
        )
        .route("/boards/{class_id}", delete(crate::handlers::boards::destroy_handler))
        // Queue state (polled by clients)
        .route(
            "/boards/{class_id}/queue",
            get(crate::handlers::queue::snapshot_handler)
                .patch(crate::handlers::queue::update_flags_handler),
        )
        .route(
            "/boards/{class_id}/queue/enter",
            post(crate::handlers::queue::enter_handler),
        )
        .route(
            "/boards/{class_id}/queue/exit",
            post(crate::handlers::queue::exit_handler),
        )
        // Participants
        .route(
            "/boards/{class_id}/students",
            post(crate::handlers::students::join_handler),
        )
        .route(
            "/boards/{class_id}/students/{id}",
            delete(crate::handlers::students::leave_handler),
        )
        .route("/boards/{class_id}/tas", post(crate::handlers::tas::join_handler))
        .route(
            "/boards/{class_id}/tas/{id}",
            delete(crate::handlers::tas::leave_handler),
        )
        .route(
            "/boards/{class_id}/tas/{id}/accept",
            post(crate::handlers::tas::accept_handler),
        )
        .route(
            "/boards/{class_id}/tas/{id}/release",
            post(crate::handlers::tas::release_handler),
        )
        // Monitoring (requires API key)
        .route("/metrics", get(crate::handlers::metrics::metrics_handler))
        // 404 fallback for all unmatched routes
        .fallback(crate::handlers::fallback::fallback_handler)
        .with_state(state)
}
