use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Authenticated Router Module
///
/// Defines the routes accessible to any user who has successfully passed the
/// authentication layer. This module implements the entire feed surface:
/// post submission, visibility-filtered reads, owner deletion, and the
/// like/unlike pair.
///
/// Access Control Strategy:
/// Every handler in this module relies on the `AuthUser` extractor middleware
/// being present on the router layer above this module. This guarantees that
/// all handlers receive a validated `AuthUser` struct containing the caller's
/// ID, which is then used for all Owner-Only authorization checks (e.g., in
/// `delete_post`).
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /posts      Submits a new post authored by the caller.
        // GET  /posts      Lists the caller's visible feed, newest first.
        .route(
            "/posts",
            post(handlers::create_post).get(handlers::get_posts),
        )
        // GET    /posts/{id}  Single-post detail under the visibility rule.
        // DELETE /posts/{id}  Removes the post. Strict ownership check is
        //                     enforced within the service logic.
        .route(
            "/posts/{id}",
            get(handlers::get_post).delete(handlers::delete_post),
        )
        // --- Like Toggling ---
        // PUT /posts/like/{id}
        // Registers the caller's like. The composite primary key on the
        // `post_likes` table prevents double voting.
        .route("/posts/like/{id}", put(handlers::like_post))
        // PUT /posts/unlike/{id}
        // Withdraws the caller's like; rejected if none was cast.
        .route("/posts/unlike/{id}", put(handlers::unlike_post))
}
