use crate::{
    AppState,
    auth::AuthUser,
    error::FeedError,
    models::{ApiMessage, CreatePostRequest, Like, Post},
};
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

// --- Handlers ---
//
// Every handler resolves the caller through the `AuthUser` extractor and
// hands that id to the service explicitly. Failures surface as `FeedError`,
// which owns the HTTP mapping; nothing here builds a status code by hand.

/// create_post
///
/// [Authenticated Route] Handles the submission of a new post.
/// The author is taken from the authenticated session, never from the payload.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 200, description = "Created", body = Post),
        (status = 400, description = "Missing text", body = ApiMessage)
    )
)]
pub async fn create_post(
    AuthUser { id: author_id }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<Post>, FeedError> {
    let post = state.posts.create(author_id, payload).await?;
    Ok(Json(post))
}

/// get_posts
///
/// [Authenticated Route] Lists every post the caller may read: their own
/// posts (private included) plus everyone else's public posts, newest first.
#[utoipa::path(
    get,
    path = "/posts",
    responses((status = 200, description = "Visible posts", body = [Post]))
)]
pub async fn get_posts(
    AuthUser { id: viewer_id }: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Post>>, FeedError> {
    let posts = state.posts.list_visible(viewer_id).await?;
    Ok(Json(posts))
}

/// get_post
///
/// [Authenticated Route] Retrieves a single post by ID under the visibility
/// rule. A private post belonging to someone else is reported as 404,
/// identical to an id that matches nothing.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 404, description = "Not found or not visible", body = ApiMessage)
    )
)]
pub async fn get_post(
    AuthUser { id: viewer_id }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, FeedError> {
    let post = state.posts.get_visible(viewer_id, id).await?;
    Ok(Json(post))
}

/// delete_post
///
/// [Authenticated Route] Allows a user to delete their own post.
///
/// *Authorization*: The service enforces an **Owner-Only** check against the
/// id provided by the `AuthUser` extractor; a non-owner receives 401.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Removed", body = ApiMessage),
        (status = 401, description = "Not the author", body = ApiMessage),
        (status = 404, description = "Not found", body = ApiMessage)
    )
)]
pub async fn delete_post(
    AuthUser { id: requester_id }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiMessage>, FeedError> {
    state.posts.delete(requester_id, id).await?;
    Ok(Json(ApiMessage {
        msg: "Post removed".to_string(),
    }))
}

/// like_post
///
/// [Authenticated Route] Records the caller's like on a post and returns the
/// post's full like list, newest first.
///
/// *Duplicate guard*: The **one-like-per-user-per-post** rule is enforced
/// atomically in the store; a second like from the same user yields 400.
#[utoipa::path(
    put,
    path = "/posts/like/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Liked", body = [Like]),
        (status = 400, description = "Already liked", body = ApiMessage),
        (status = 404, description = "Not found", body = ApiMessage)
    )
)]
pub async fn like_post(
    AuthUser { id: actor_id }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Like>>, FeedError> {
    let likes = state.likes.like(actor_id, id).await?;
    Ok(Json(likes))
}

/// unlike_post
///
/// [Authenticated Route] Withdraws the caller's like and returns the post's
/// remaining like list. Unliking a post the caller never liked yields 400.
#[utoipa::path(
    put,
    path = "/posts/unlike/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Unliked", body = [Like]),
        (status = 400, description = "Not yet liked", body = ApiMessage),
        (status = 404, description = "Not found", body = ApiMessage)
    )
)]
pub async fn unlike_post(
    AuthUser { id: actor_id }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Like>>, FeedError> {
    let likes = state.likes.unlike(actor_id, id).await?;
    Ok(Json(likes))
}
