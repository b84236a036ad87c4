//! Integration tests for the engagement service over in-memory
//! SurrealDB.

use quillpress_core::models::engagement::EngagementIdentity;
use quillpress_core::models::post::{CreatePost, PostStatus};
use quillpress_core::models::tenant::{CreateTenant, PasswordPolicy};
use quillpress_core::repository::{PostRepository, TenantRepository};
use quillpress_db::repository::{
    SurrealEngagementRepository, SurrealPostRepository, SurrealTenantRepository,
};
use quillpress_engage::{DedupWindow, EngagementService, identity_for};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> (
    Surreal<surrealdb::engine::local::Db>,
    Uuid, // tenant_id
    Uuid, // post_id
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    quillpress_db::run_migrations(&db).await.unwrap();

    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant = tenant_repo
        .create(CreateTenant {
            name: "engage-tenant".into(),
            domain: "engage.example.com".into(),
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

    let post_repo = SurrealPostRepository::new(db.clone());
    let post = post_repo
        .create(CreatePost {
            tenant_id: tenant.id,
            author_id: Uuid::new_v4(),
            title: "A post".into(),
            slug: "a-post".into(),
            status: PostStatus::Published,
        })
        .await
        .unwrap();

    (db, tenant.id, post.id)
}

fn daily_service(
    db: Surreal<surrealdb::engine::local::Db>,
) -> EngagementService<SurrealEngagementRepository<surrealdb::engine::local::Db>> {
    EngagementService::new(
        SurrealEngagementRepository::new(db),
        DedupWindow::daily(chrono_tz::UTC),
    )
}

#[tokio::test]
async fn anonymous_view_dedupes_by_ip_hash() {
    let (db, tenant_id, post_id) = setup().await;
    let svc = daily_service(db);

    let identity = identity_for(None, "203.0.113.7");
    let first = svc.record_view(tenant_id, post_id, &identity).await.unwrap();
    assert!(first.is_new);

    let second = svc.record_view(tenant_id, post_id, &identity).await.unwrap();
    assert!(!second.is_new);
    assert_eq!(second.current_count, 1);

    // Another IP is a fresh identity.
    let other = identity_for(None, "203.0.113.8");
    let third = svc.record_view(tenant_id, post_id, &other).await.unwrap();
    assert!(third.is_new);
    assert_eq!(third.current_count, 2);
}

#[tokio::test]
async fn authenticated_view_is_tracked_by_user_not_ip() {
    let (db, tenant_id, post_id) = setup().await;
    let svc = daily_service(db);

    let user_id = Uuid::new_v4();

    // Same user from two different IPs is one identity.
    let from_home = identity_for(Some(user_id), "203.0.113.7");
    let from_work = identity_for(Some(user_id), "198.51.100.4");
    assert_eq!(from_home, from_work);

    svc.record_view(tenant_id, post_id, &from_home)
        .await
        .unwrap();
    let second = svc
        .record_view(tenant_id, post_id, &from_work)
        .await
        .unwrap();
    assert!(!second.is_new);
}

#[tokio::test]
async fn like_toggle_pair_restores_counter() {
    let (db, tenant_id, post_id) = setup().await;
    let svc = daily_service(db);

    let identity = EngagementIdentity::User(Uuid::new_v4());

    let first = svc.toggle_like(tenant_id, post_id, &identity).await.unwrap();
    let second = svc.toggle_like(tenant_id, post_id, &identity).await.unwrap();

    assert!(first.is_new);
    assert!(!second.is_new);
    assert_eq!(second.current_count, 0);
}

#[tokio::test]
async fn concurrent_toggles_never_skew_the_counter() {
    let (db, tenant_id, post_id) = setup().await;

    // An even number of toggles from one identity, racing: the counter
    // must land back where it started regardless of interleaving.
    let mut handles = Vec::new();
    for _ in 0..4 {
        let svc = daily_service(db.clone());
        handles.push(tokio::spawn(async move {
            svc.toggle_like(tenant_id, post_id, &EngagementIdentity::User(Uuid::nil()))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let post_repo = SurrealPostRepository::new(db);
    let post = post_repo.get_by_id(tenant_id, post_id).await.unwrap();
    assert_eq!(post.like_count, 0);
}
