//! Integration tests for the Post repository using in-memory SurrealDB.

use quillpress_core::models::post::{CreatePost, PostStatus};
use quillpress_core::models::tenant::{CreateTenant, PasswordPolicy};
use quillpress_core::repository::{Pagination, PostRepository, TenantRepository};
use quillpress_db::repository::{SurrealPostRepository, SurrealTenantRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> (Surreal<surrealdb::engine::local::Db>, Uuid) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    quillpress_db::run_migrations(&db).await.unwrap();

    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant = tenant_repo
        .create(CreateTenant {
            name: "test-tenant".into(),
            domain: "test.example.com".into(),
            token_secret: Some("secret".into()),
            token_lifetime_secs: 3600,
            allow_registration: true,
            allow_oauth: false,
            oauth_client_id: None,
            oauth_client_secret: None,
            password_policy: PasswordPolicy::default(),
        })
        .await
        .unwrap();

    (db, tenant.id)
}

fn post_input(tenant_id: Uuid, slug: &str, status: PostStatus) -> CreatePost {
    CreatePost {
        tenant_id,
        author_id: Uuid::new_v4(),
        title: format!("Post {slug}"),
        slug: slug.into(),
        status,
    }
}

#[tokio::test]
async fn create_and_get_post() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealPostRepository::new(db);

    let post = repo
        .create(post_input(tenant_id, "hello-world", PostStatus::Published))
        .await
        .unwrap();

    assert_eq!(post.view_count, 0);
    assert_eq!(post.like_count, 0);
    assert!(!post.featured);
    assert!(post.published_at.is_some());

    let fetched = repo.get_by_id(tenant_id, post.id).await.unwrap();
    assert_eq!(fetched.slug, "hello-world");
}

#[tokio::test]
async fn draft_has_no_published_timestamp() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealPostRepository::new(db);

    let post = repo
        .create(post_input(tenant_id, "draft", PostStatus::Draft))
        .await
        .unwrap();
    assert!(post.published_at.is_none());
}

#[tokio::test]
async fn listing_hides_drafts_unless_asked() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealPostRepository::new(db);

    repo.create(post_input(tenant_id, "public", PostStatus::Published))
        .await
        .unwrap();
    repo.create(post_input(tenant_id, "hidden", PostStatus::Draft))
        .await
        .unwrap();

    let public = repo
        .list(tenant_id, false, Pagination::default())
        .await
        .unwrap();
    assert_eq!(public.total, 1);
    assert_eq!(public.items[0].slug, "public");

    let all = repo
        .list(tenant_id, true, Pagination::default())
        .await
        .unwrap();
    assert_eq!(all.total, 2);
}

#[tokio::test]
async fn snapshot_covers_published_posts_only() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealPostRepository::new(db);

    let published = repo
        .create(post_input(tenant_id, "one", PostStatus::Published))
        .await
        .unwrap();
    repo.create(post_input(tenant_id, "two", PostStatus::Draft))
        .await
        .unwrap();

    let snapshot = repo.engagement_snapshot(tenant_id).await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, published.id);
}

#[tokio::test]
async fn featured_swap_is_exclusive() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealPostRepository::new(db);

    let first = repo
        .create(post_input(tenant_id, "first", PostStatus::Published))
        .await
        .unwrap();
    let second = repo
        .create(post_input(tenant_id, "second", PostStatus::Published))
        .await
        .unwrap();

    repo.set_featured_exclusive(tenant_id, first.id)
        .await
        .unwrap();
    let featured = repo.get_featured(tenant_id).await.unwrap().unwrap();
    assert_eq!(featured.id, first.id);

    // Moving the slot clears the old holder.
    repo.set_featured_exclusive(tenant_id, second.id)
        .await
        .unwrap();
    let featured = repo.get_featured(tenant_id).await.unwrap().unwrap();
    assert_eq!(featured.id, second.id);

    let snapshot = repo.engagement_snapshot(tenant_id).await.unwrap();
    let featured_count = snapshot.iter().filter(|s| s.featured).count();
    assert_eq!(featured_count, 1, "exactly one post may hold the slot");
}

#[tokio::test]
async fn clear_featured_empties_the_slot() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealPostRepository::new(db);

    let post = repo
        .create(post_input(tenant_id, "solo", PostStatus::Published))
        .await
        .unwrap();
    repo.set_featured_exclusive(tenant_id, post.id)
        .await
        .unwrap();

    repo.clear_featured(tenant_id).await.unwrap();
    assert!(repo.get_featured(tenant_id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_removes_post() {
    let (db, tenant_id) = setup().await;
    let repo = SurrealPostRepository::new(db);

    let post = repo
        .create(post_input(tenant_id, "gone", PostStatus::Published))
        .await
        .unwrap();
    repo.delete(tenant_id, post.id).await.unwrap();

    assert!(repo.get_by_id(tenant_id, post.id).await.is_err());
    assert_eq!(repo.count(tenant_id).await.unwrap(), 0);
}

#[tokio::test]
async fn posts_are_tenant_isolated() {
    let (db, tenant_a) = setup().await;

    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant_b = tenant_repo
        .create(CreateTenant {
            name: "other".into(),
            domain: "other.example.com".into(),
            token_secret: Some("secret-b".into()),
            token_lifetime_secs: 3600,
            allow_registration: true,
            allow_oauth: false,
            oauth_client_id: None,
            oauth_client_secret: None,
            password_policy: PasswordPolicy::default(),
        })
        .await
        .unwrap();

    let repo = SurrealPostRepository::new(db);
    let post = repo
        .create(post_input(tenant_a, "mine", PostStatus::Published))
        .await
        .unwrap();

    assert!(repo.get_by_id(tenant_b.id, post.id).await.is_err());
}
