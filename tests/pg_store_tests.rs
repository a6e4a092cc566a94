use chorus::{
    models::Post,
    store::{LikeWrite, PostStore, PostgresStore},
};
use chrono::{TimeZone, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::env;
use uuid::Uuid;

// Driver tests for the Postgres store. They need a live database, so the
// whole suite is ignored by default; run it with
//   DATABASE_URL=postgres://... cargo test --test pg_store_tests -- --ignored
// The tables are created on connect if absent, and every test works with
// fresh ids so repeated runs do not collide.

// Hands back the raw pool alongside the store for tests that need to seed
// rows the store API cannot produce (fixed timestamps, for instance).
async fn connect() -> (PostgresStore, PgPool) {
    dotenv::dotenv().ok();
    let url = env::var("DATABASE_URL").expect("DATABASE_URL must be set for Postgres store tests");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to Postgres in tests");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS posts (
            id UUID PRIMARY KEY,
            author_id UUID NOT NULL,
            text TEXT NOT NULL,
            is_private BOOLEAN NOT NULL,
            created_at TIMESTAMPTZ NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .expect("failed to create posts table");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS post_likes (
            post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            user_id UUID NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            PRIMARY KEY (post_id, user_id)
        )",
    )
    .execute(&pool)
    .await
    .expect("failed to create post_likes table");

    (PostgresStore::new(pool.clone()), pool)
}

// Whole-second timestamps survive the TIMESTAMPTZ round trip exactly.
fn sample_post(author_id: Uuid, is_private: bool, second: u32) -> Post {
    Post {
        id: Uuid::new_v4(),
        author_id,
        text: "pg driver test".to_string(),
        is_private,
        created_at: Utc.with_ymd_and_hms(2026, 8, 15, 10, 0, second).unwrap(),
        likes: Vec::new(),
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn pg_post_round_trip() {
    let (store, _) = connect().await;
    let author = Uuid::new_v4();
    let post = sample_post(author, true, 0);

    store.insert_post(post.clone()).await.unwrap();

    let found = store.fetch_post(post.id).await.unwrap().expect("post should exist");
    assert_eq!(found.id, post.id);
    assert_eq!(found.author_id, author);
    assert_eq!(found.text, post.text);
    assert!(found.is_private);
    assert_eq!(found.created_at, post.created_at);
    assert!(found.likes.is_empty());

    assert!(store.delete_post(post.id).await.unwrap());
    assert!(!store.delete_post(post.id).await.unwrap());
    assert!(store.fetch_post(post.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn pg_like_membership() {
    let (store, _) = connect().await;
    let author = Uuid::new_v4();
    let voter = Uuid::new_v4();
    let post = sample_post(author, false, 1);
    store.insert_post(post.clone()).await.unwrap();

    // Insert-if-absent applies once, then reports Unchanged.
    let applied = store.add_like(post.id, voter).await.unwrap();
    match applied {
        LikeWrite::Applied(likes) => {
            assert_eq!(likes.len(), 1);
            assert_eq!(likes[0].user_id, voter);
        }
        other => panic!("expected Applied, got {:?}", other),
    }
    let duplicate = store.add_like(post.id, voter).await.unwrap();
    assert!(matches!(duplicate, LikeWrite::Unchanged));

    // The foreign key resolves a vanished post to PostMissing.
    let ghost = store.add_like(Uuid::new_v4(), voter).await.unwrap();
    assert!(matches!(ghost, LikeWrite::PostMissing));

    // Delete-if-present drains the membership, then reports Unchanged.
    let removed = store.remove_like(post.id, voter).await.unwrap();
    match removed {
        LikeWrite::Applied(likes) => assert!(likes.is_empty()),
        other => panic!("expected Applied, got {:?}", other),
    }
    let absent = store.remove_like(post.id, voter).await.unwrap();
    assert!(matches!(absent, LikeWrite::Unchanged));

    let ghost = store.remove_like(Uuid::new_v4(), voter).await.unwrap();
    assert!(matches!(ghost, LikeWrite::PostMissing));

    store.delete_post(post.id).await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn pg_visible_posts_filtering_and_likes() {
    let (store, _) = connect().await;
    let author = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let fan = Uuid::new_v4();

    let private_post = sample_post(author, true, 10);
    let older_public = sample_post(author, false, 20);
    let newer_public = sample_post(author, false, 30);
    store.insert_post(private_post.clone()).await.unwrap();
    store.insert_post(older_public.clone()).await.unwrap();
    store.insert_post(newer_public.clone()).await.unwrap();
    store.add_like(older_public.id, fan).await.unwrap();

    // The table is shared with other runs, so assert on relative positions
    // of this test's rows rather than on the full listing.
    let view = store.visible_posts(stranger).await.unwrap();
    let position = |id: Uuid| view.iter().position(|p| p.id == id);

    assert!(position(private_post.id).is_none(), "private post leaked");
    let older_pos = position(older_public.id).expect("older public post missing");
    let newer_pos = position(newer_public.id).expect("newer public post missing");
    assert!(newer_pos < older_pos, "newest-first ordering violated");

    // The batched like attachment found the fan's vote.
    let older_row = &view[older_pos];
    assert_eq!(older_row.likes.len(), 1);
    assert_eq!(older_row.likes[0].user_id, fan);

    for id in [private_post.id, older_public.id, newer_public.id] {
        store.delete_post(id).await.unwrap();
    }
}

#[tokio::test]
#[ignore = "requires a running Postgres (set DATABASE_URL)"]
async fn pg_like_order_is_stable_across_timestamp_ties() {
    let (store, pool) = connect().await;
    let author = Uuid::new_v4();
    let post = sample_post(author, false, 40);
    store.insert_post(post.clone()).await.unwrap();

    // add_like stamps NOW(), so seed the tie directly: two likes sharing one
    // timestamp, plus a strictly newer third. Postgres compares UUIDs
    // bytewise, same as Uuid's Ord, so sorting the pair here predicts the
    // database's tie-break.
    let mut pair = [Uuid::new_v4(), Uuid::new_v4()];
    pair.sort();
    let (low, high) = (pair[0], pair[1]);
    let tied_at = Utc.with_ymd_and_hms(2026, 8, 15, 11, 0, 0).unwrap();
    for user_id in [low, high] {
        sqlx::query("INSERT INTO post_likes (post_id, user_id, created_at) VALUES ($1, $2, $3)")
            .bind(post.id)
            .bind(user_id)
            .bind(tied_at)
            .execute(&pool)
            .await
            .unwrap();
    }
    let newest = Uuid::new_v4();
    sqlx::query("INSERT INTO post_likes (post_id, user_id, created_at) VALUES ($1, $2, $3)")
        .bind(post.id)
        .bind(newest)
        .bind(Utc.with_ymd_and_hms(2026, 8, 15, 11, 0, 1).unwrap())
        .execute(&pool)
        .await
        .unwrap();

    // Newest first, and the tied pair resolves by user id descending, so
    // repeated reads of the same rows always agree.
    let found = store.fetch_post(post.id).await.unwrap().expect("post should exist");
    let order: Vec<Uuid> = found.likes.iter().map(|like| like.user_id).collect();
    assert_eq!(order, vec![newest, high, low]);

    // The batched feed read applies the same order as the single-post read.
    let view = store.visible_posts(author).await.unwrap();
    let row = view.iter().find(|p| p.id == post.id).expect("post missing from feed");
    let batched: Vec<Uuid> = row.likes.iter().map(|like| like.user_id).collect();
    assert_eq!(batched, order);

    store.delete_post(post.id).await.unwrap();
}
