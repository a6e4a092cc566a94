use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{models::ApiMessage, store::StoreError};

// --- Service Error Taxonomy ---

/// FeedError
///
/// The closed set of failures the post and like services can report. Callers
/// match on the variant; the HTTP mapping lives in one place below so the
/// core logic never touches status codes.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The request payload is malformed in a way the caller must correct.
    #[error("{0}")]
    InvalidArgument(&'static str),

    /// No such post, or a private post read by someone other than its author.
    /// The two cases are deliberately indistinguishable on the read path.
    #[error("post not found")]
    NotFound,

    /// The caller is authenticated but not permitted to perform the action
    /// (currently: deleting a post they do not own).
    #[error("user not authorized")]
    Unauthorized,

    /// The caller already has a like on this post.
    #[error("post already liked")]
    AlreadyLiked,

    /// The caller has no like on this post to remove.
    #[error("post has not yet been liked")]
    NotLiked,

    /// A persistence-layer fault. Details are logged at this boundary and
    /// never exposed to the caller.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            FeedError::InvalidArgument(reason) => (StatusCode::BAD_REQUEST, reason),
            FeedError::NotFound => (StatusCode::NOT_FOUND, "Post not found"),
            FeedError::Unauthorized => (StatusCode::UNAUTHORIZED, "User not authorized"),
            FeedError::AlreadyLiked => (StatusCode::BAD_REQUEST, "Post already liked"),
            FeedError::NotLiked => (StatusCode::BAD_REQUEST, "Post has not yet been liked"),
            FeedError::Store(err) => {
                tracing::error!("Store failure reached the response boundary: {:?}", err);
                // Internal faults carry no structured body, only the generic marker.
                return (StatusCode::INTERNAL_SERVER_ERROR, "Server Error").into_response();
            }
        };

        (status, Json(ApiMessage { msg: msg.to_string() })).into_response()
    }
}
