use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::FeedError,
    models::{CreatePostRequest, Like, Post},
    store::{LikeWrite, StoreState},
};

// --- Post Lifecycle ---

/// PostService
///
/// Creation, visibility-filtered reads, and owner-only deletion of posts.
/// Every method takes the verified caller id explicitly; nothing in here
/// reaches into transport or session state, which keeps the rules callable
/// (and testable) without an HTTP request in sight.
#[derive(Clone)]
pub struct PostService {
    store: StoreState,
}

impl PostService {
    pub fn new(store: StoreState) -> Self {
        Self { store }
    }

    /// create
    ///
    /// Creates a post authored by `author_id`. The id and creation timestamp
    /// are assigned here, likes start empty, and text that is empty after
    /// trimming is rejected before anything touches the store.
    pub async fn create(
        &self,
        author_id: Uuid,
        req: CreatePostRequest,
    ) -> Result<Post, FeedError> {
        if req.text.trim().is_empty() {
            return Err(FeedError::InvalidArgument("Text is required"));
        }

        let post = Post {
            id: Uuid::new_v4(),
            author_id,
            text: req.text,
            is_private: req.is_private,
            created_at: Utc::now(),
            likes: Vec::new(),
        };
        self.store.insert_post(post.clone()).await?;

        Ok(post)
    }

    /// list_visible
    ///
    /// Every post `viewer_id` may read: their own (private included) plus
    /// everyone else's public posts, newest first.
    pub async fn list_visible(&self, viewer_id: Uuid) -> Result<Vec<Post>, FeedError> {
        Ok(self.store.visible_posts(viewer_id).await?)
    }

    /// get_visible
    ///
    /// Single-post lookup under the visibility rule. A private post owned by
    /// someone else reports `NotFound`, indistinguishable from an id that
    /// matches nothing, so existence of hidden posts never leaks.
    pub async fn get_visible(&self, viewer_id: Uuid, post_id: Uuid) -> Result<Post, FeedError> {
        match self.store.fetch_post(post_id).await? {
            Some(post) if post.visible_to(viewer_id) => Ok(post),
            _ => Err(FeedError::NotFound),
        }
    }

    /// delete
    ///
    /// Owner-only removal. Unlike the read path, a non-owner is told
    /// `Unauthorized` here rather than `NotFound`, so a delete attempt does
    /// confirm the post exists. Reads stay the tighter of the two rules.
    pub async fn delete(&self, requester_id: Uuid, post_id: Uuid) -> Result<(), FeedError> {
        let post = self
            .store
            .fetch_post(post_id)
            .await?
            .ok_or(FeedError::NotFound)?;

        if post.author_id != requester_id {
            return Err(FeedError::Unauthorized);
        }

        // The post can vanish between the ownership check and the delete;
        // report that the same way as an unknown id.
        if self.store.delete_post(post_id).await? {
            Ok(())
        } else {
            Err(FeedError::NotFound)
        }
    }
}

// --- Like Toggling ---

/// LikeToggle
///
/// Per-(post, user) like membership with duplicate and absence guards.
/// Existence of the post is settled before membership: a missing post is
/// always `NotFound`, never `AlreadyLiked` or `NotLiked`. Both writes return
/// the post's full like list so callers can render the new state without a
/// second read.
#[derive(Clone)]
pub struct LikeToggle {
    store: StoreState,
}

impl LikeToggle {
    pub fn new(store: StoreState) -> Self {
        Self { store }
    }

    /// like
    ///
    /// Adds `actor_id` to the post's likes. The store primitive is atomic,
    /// so two racing likes from one user yield exactly one success and one
    /// `AlreadyLiked`.
    pub async fn like(&self, actor_id: Uuid, post_id: Uuid) -> Result<Vec<Like>, FeedError> {
        match self.store.add_like(post_id, actor_id).await? {
            LikeWrite::Applied(likes) => Ok(likes),
            LikeWrite::Unchanged => Err(FeedError::AlreadyLiked),
            LikeWrite::PostMissing => Err(FeedError::NotFound),
        }
    }

    /// unlike
    ///
    /// Removes `actor_id` from the post's likes. Removing a like that was
    /// never cast is `NotLiked`, not a silent no-op.
    pub async fn unlike(&self, actor_id: Uuid, post_id: Uuid) -> Result<Vec<Like>, FeedError> {
        match self.store.remove_like(post_id, actor_id).await? {
            LikeWrite::Applied(likes) => Ok(likes),
            LikeWrite::Unchanged => Err(FeedError::NotLiked),
            LikeWrite::PostMissing => Err(FeedError::NotFound),
        }
    }
}
