use crate::models::{Like, Post};
use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;
use uuid::Uuid;

/// StoreError
///
/// A driver-level fault (connection loss, constraint breakage, malformed
/// rows). Callers treat it as opaque; the only useful reaction above the
/// store is to log it and fail the request.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// LikeWrite
///
/// Outcome of the conditional like-membership writes. Both membership
/// primitives are atomic: the check and the mutation happen under one
/// lock (memory) or one statement (Postgres), so concurrent duplicates
/// collapse into a single `Applied` with the rest reporting `Unchanged`.
#[derive(Debug)]
pub enum LikeWrite {
    /// Membership changed. Carries the post's full like list after the
    /// write, newest first.
    Applied(Vec<Like>),
    /// The (post, user) membership was already in the requested state.
    Unchanged,
    /// No post with the given id exists (including one deleted mid-flight).
    PostMissing,
}

/// PostStore Trait
///
/// Defines the abstract contract for all persistence operations. Handlers and
/// services interact with the data layer through this trait without knowing
/// the specific implementation (Postgres, in-memory, mock).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn PostStore>`) safely shareable across Axum's asynchronous task
/// boundaries.
#[async_trait]
pub trait PostStore: Send + Sync {
    // --- Post Records ---
    // Persists a fully-formed post; id and created_at are assigned by the caller.
    async fn insert_post(&self, post: Post) -> Result<(), StoreError>;
    // Retrieval by id with no visibility filtering; the service decides who may see it.
    async fn fetch_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;
    // Everything the viewer may read: their own posts plus all public ones,
    // newest first, id descending as the tie-break.
    async fn visible_posts(&self, viewer_id: Uuid) -> Result<Vec<Post>, StoreError>;
    // Returns true only if a record was actually removed.
    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError>;

    // --- Like Membership ---
    // Insert-if-absent of the (post, user) membership.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeWrite, StoreError>;
    // Delete-if-present of the (post, user) membership.
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeWrite, StoreError>;
}

/// StoreState
///
/// The concrete type used to share the persistence layer across the application state.
pub type StoreState = Arc<dyn PostStore>;

// --- In-Memory Driver ---

/// MemoryStore
///
/// A process-local `PostStore` for testing and local development, so the
/// service boots without a database. A single `RwLock` over the post map
/// makes every membership write a check-and-mutate under one guard.
pub struct MemoryStore {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn insert_post(&self, post: Post) -> Result<(), StoreError> {
        self.posts.write().unwrap().insert(post.id, post);
        Ok(())
    }

    async fn fetch_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().unwrap().get(&id).cloned())
    }

    async fn visible_posts(&self, viewer_id: Uuid) -> Result<Vec<Post>, StoreError> {
        let mut posts: Vec<Post> = self
            .posts
            .read()
            .unwrap()
            .values()
            .filter(|post| post.visible_to(viewer_id))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(posts)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.posts.write().unwrap().remove(&id).is_some())
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeWrite, StoreError> {
        // The write guard spans the membership check and the insert.
        let mut posts = self.posts.write().unwrap();
        match posts.get_mut(&post_id) {
            None => Ok(LikeWrite::PostMissing),
            Some(post) => {
                if post.likes.iter().any(|like| like.user_id == user_id) {
                    return Ok(LikeWrite::Unchanged);
                }
                post.likes.insert(0, Like { user_id });
                Ok(LikeWrite::Applied(post.likes.clone()))
            }
        }
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeWrite, StoreError> {
        let mut posts = self.posts.write().unwrap();
        match posts.get_mut(&post_id) {
            None => Ok(LikeWrite::PostMissing),
            Some(post) => match post.likes.iter().position(|like| like.user_id == user_id) {
                None => Ok(LikeWrite::Unchanged),
                Some(idx) => {
                    post.likes.remove(idx);
                    Ok(LikeWrite::Applied(post.likes.clone()))
                }
            },
        }
    }
}

// --- Postgres Driver ---

/// PostgresStore
///
/// The concrete implementation of the `PostStore` trait, backed by PostgreSQL.
///
/// Expected schema:
///   posts(id UUID PK, author_id UUID, text TEXT, is_private BOOL, created_at TIMESTAMPTZ)
///   post_likes(post_id UUID REFERENCES posts(id) ON DELETE CASCADE,
///              user_id UUID, created_at TIMESTAMPTZ,
///              PRIMARY KEY (post_id, user_id))
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a new store instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Current like records for one post, newest first, user id descending
    /// on a timestamp tie so repeated reads agree.
    async fn likes_for(&self, post_id: Uuid) -> Result<Vec<Like>, StoreError> {
        let user_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM post_likes WHERE post_id = $1 ORDER BY created_at DESC, user_id DESC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(user_ids.into_iter().map(|user_id| Like { user_id }).collect())
    }
}

/// True when the error is the `post_likes -> posts` foreign key firing, which
/// is how Postgres tells us the target post does not exist.
fn is_missing_post(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_foreign_key_violation())
        .unwrap_or(false)
}

#[async_trait]
impl PostStore for PostgresStore {
    async fn insert_post(&self, post: Post) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO posts (id, author_id, text, is_private, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(post.id)
        .bind(post.author_id)
        .bind(&post.text)
        .bind(post.is_private)
        .bind(post.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fetch_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(
            "SELECT id, author_id, text, is_private, created_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match post {
            None => Ok(None),
            Some(mut post) => {
                post.likes = self.likes_for(post.id).await?;
                Ok(Some(post))
            }
        }
    }

    /// visible_posts
    ///
    /// The visibility rule is pushed into the WHERE clause so hidden rows
    /// never leave the database. Likes are attached with one batched query
    /// over all returned ids rather than a query per post.
    async fn visible_posts(&self, viewer_id: Uuid) -> Result<Vec<Post>, StoreError> {
        let mut posts = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, author_id, text, is_private, created_at
            FROM posts
            WHERE author_id = $1 OR is_private = false
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(viewer_id)
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = posts.iter().map(|post| post.id).collect();
        let rows = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT post_id, user_id FROM post_likes WHERE post_id = ANY($1) ORDER BY created_at DESC, user_id DESC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut likes_by_post: HashMap<Uuid, Vec<Like>> = HashMap::new();
        for (post_id, user_id) in rows {
            likes_by_post.entry(post_id).or_default().push(Like { user_id });
        }
        for post in &mut posts {
            if let Some(likes) = likes_by_post.remove(&post.id) {
                post.likes = likes;
            }
        }

        Ok(posts)
    }

    async fn delete_post(&self, id: Uuid) -> Result<bool, StoreError> {
        // post_likes rows go with the post via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// add_like
    ///
    /// Single-statement insert-if-absent: `ON CONFLICT DO NOTHING` absorbs
    /// the duplicate case (`rows_affected == 0`), and the foreign key firing
    /// distinguishes a missing post from a database fault.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeWrite, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO post_likes (post_id, user_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(user_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) if res.rows_affected() > 0 => {
                Ok(LikeWrite::Applied(self.likes_for(post_id).await?))
            }
            Ok(_) => Ok(LikeWrite::Unchanged),
            Err(err) if is_missing_post(&err) => Ok(LikeWrite::PostMissing),
            Err(err) => Err(err.into()),
        }
    }

    /// remove_like
    ///
    /// Single-statement delete-if-present. When nothing was deleted a second
    /// lookup settles whether the post itself is gone or merely unliked.
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<LikeWrite, StoreError> {
        let result = sqlx::query("DELETE FROM post_likes WHERE post_id = $1 AND user_id = $2")
            .bind(post_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() > 0 {
            return Ok(LikeWrite::Applied(self.likes_for(post_id).await?));
        }

        let post_exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(&self.pool)
            .await?;

        if post_exists {
            Ok(LikeWrite::Unchanged)
        } else {
            Ok(LikeWrite::PostMissing)
        }
    }
}
