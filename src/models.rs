use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// Post
///
/// Represents a single feed entry from the `public.posts` table. This is the
/// primary data structure for the core business logic: everything the service
/// returns to callers is either a `Post` or a slice of one.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    // FK to the identity provider's user id (Owner).
    pub author_id: Uuid,
    pub text: String,

    // Logic Field
    // Controls visibility: a private post is readable by its author only.
    pub is_private: bool,

    // Drives the newest-first feed order; serialized as an ISO string.
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,

    /// Like records for this post, newest first.
    /// Loaded by the store from `public.post_likes`; never a database column,
    /// hence skipped during row decoding and filled in afterwards.
    #[sqlx(skip)]
    pub likes: Vec<Like>,
}

impl Post {
    /// Visibility rule: the author always sees their own post; everyone else
    /// sees it only while it is not private.
    pub fn visible_to(&self, viewer_id: Uuid) -> bool {
        self.author_id == viewer_id || !self.is_private
    }
}

/// Like
///
/// A single vote record in the `public.post_likes` table, keyed on
/// (post, user) so each user counts at most once per post. The post id is
/// implied by the containing `Post`, so only the voter travels over the wire.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Like {
    // The user who cast the vote.
    pub user_id: Uuid,
}

/// --- Request Payloads (Input Schemas) ---

/// CreatePostRequest
///
/// Input payload for submitting a new post (POST /posts).
/// Everything else on a `Post` (id, author, timestamp, likes) is assigned
/// server-side and cannot be supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub text: String,
    // Omitted by most clients; a missing field means a public post.
    #[serde(default)]
    pub is_private: bool,
}

/// --- Response Schemas (Output) ---

/// ApiMessage
///
/// Output schema for endpoints that confirm an action or reject a request
/// with a human-readable reason rather than returning a record.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ApiMessage {
    pub msg: String,
}
