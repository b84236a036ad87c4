//! Integration tests for the authentication service.

use std::sync::Arc;

use quillpress_auth::admin::AdminService;
use quillpress_auth::service::AuthService;
use quillpress_auth::token::{TokenSigner, generate_tenant_secret};
use quillpress_auth::{Principal, TenantRegistry, TenantSelector};
use quillpress_core::CoreError;
use quillpress_core::models::tenant::{CreateTenant, PasswordPolicy, Tenant, UpdateTenant};
use quillpress_core::models::user::{CreateUser, Role, UpdateUser, UserStatus};
use quillpress_core::repository::{TenantRepository, UserRepository};
use quillpress_db::repository::{SurrealTenantRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Spin up in-memory DB, run migrations, create a tenant.
async fn setup() -> (
    Surreal<surrealdb::engine::local::Db>,
    SurrealUserRepository<surrealdb::engine::local::Db>,
    Tenant,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    quillpress_db::run_migrations(&db).await.unwrap();

    let tenant_repo = SurrealTenantRepository::new(db.clone());
    let tenant = tenant_repo
        .create(CreateTenant {
            name: "test-tenant".into(),
            domain: "test.example.com".into(),
            token_secret: Some(generate_tenant_secret()),
            token_lifetime_secs: 3600,
            allow_registration: true,
            allow_oauth: true,
            oauth_client_id: Some("client-id".into()),
            oauth_client_secret: Some("client-secret".into()),
            password_policy: PasswordPolicy {
                min_length: 8,
                require_uppercase: true,
                require_number: true,
                require_special: false,
            },
        })
        .await
        .unwrap();

    let user_repo = SurrealUserRepository::new(db.clone());
    (db, user_repo, tenant)
}

fn auth_service(
    users: SurrealUserRepository<surrealdb::engine::local::Db>,
    admin_emails: Vec<String>,
) -> AuthService<SurrealUserRepository<surrealdb::engine::local::Db>> {
    AuthService::new(users, Arc::new(TokenSigner::Hmac), admin_emails)
}

#[tokio::test]
async fn register_then_login() {
    let (_db, users, tenant) = setup().await;
    let svc = auth_service(users, vec![]);

    let registered = svc
        .register(&tenant, "alice@example.com", "Password1")
        .await
        .unwrap();
    assert_eq!(registered.user.role, Role::User);
    assert_eq!(registered.user.status, UserStatus::Active);

    let login = svc
        .login(&tenant, "alice@example.com", "Password1")
        .await
        .unwrap();
    assert!(login.user.last_login_at.is_some());

    // The issued token verifies under the tenant and carries its claims.
    let claims = TokenSigner::Hmac.verify(&tenant, &login.token).unwrap();
    assert_eq!(claims.user_id, login.user.id.to_string());
    assert_eq!(claims.email, "alice@example.com");
}

#[tokio::test]
async fn register_enforces_tenant_policy() {
    let (_db, users, tenant) = setup().await;
    let svc = auth_service(users, vec![]);

    // Policy requires uppercase + number at length 8.
    let err = svc
        .register(&tenant, "bob@example.com", "abcdefgh")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation { .. }));

    assert!(
        svc.register(&tenant, "bob@example.com", "Abcdefg1")
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn register_respects_allow_registration_flag() {
    let (db, users, tenant) = setup().await;

    let tenant_repo = SurrealTenantRepository::new(db);
    let tenant = tenant_repo
        .update(
            tenant.id,
            UpdateTenant {
                allow_registration: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let svc = auth_service(users, vec![]);
    let err = svc
        .register(&tenant, "late@example.com", "Password1")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden { .. }));
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let (_db, users, tenant) = setup().await;
    let svc = auth_service(users, vec![]);

    svc.register(&tenant, "carol@example.com", "Password1")
        .await
        .unwrap();

    let err = svc
        .login(&tenant, "carol@example.com", "WrongPass1")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthenticated { .. }));
}

#[tokio::test]
async fn unknown_email_reads_as_invalid_credentials() {
    let (_db, users, tenant) = setup().await;
    let svc = auth_service(users, vec![]);

    let err = svc
        .login(&tenant, "ghost@example.com", "Password1")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Unauthenticated { .. }));
}

#[tokio::test]
async fn suspended_account_cannot_login() {
    let (_db, users, tenant) = setup().await;
    let svc = auth_service(users.clone(), vec![]);

    let registered = svc
        .register(&tenant, "dora@example.com", "Password1")
        .await
        .unwrap();
    users
        .update(
            tenant.id,
            registered.user.id,
            UpdateUser {
                status: Some(UserStatus::Suspended),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = svc
        .login(&tenant, "dora@example.com", "Password1")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden { .. }));
}

#[tokio::test]
async fn oauth_login_creates_and_links_accounts() {
    let (_db, users, tenant) = setup().await;
    let svc = auth_service(users.clone(), vec![]);

    // First OAuth login creates the account.
    let first = svc
        .oauth_login(&tenant, "google|111", "erin@example.com")
        .await
        .unwrap();
    assert_eq!(first.user.role, Role::User);
    assert!(first.user.password_hash.is_none());

    // Second login resolves by provider subject.
    let second = svc
        .oauth_login(&tenant, "google|111", "erin@example.com")
        .await
        .unwrap();
    assert_eq!(second.user.id, first.user.id);
}

#[tokio::test]
async fn oauth_allow_list_promotes_to_admin_at_login() {
    let (_db, users, tenant) = setup().await;

    // Not yet allow-listed: plain user.
    let svc = auth_service(users.clone(), vec![]);
    let first = svc
        .oauth_login(&tenant, "google|222", "boss@example.com")
        .await
        .unwrap();
    assert_eq!(first.user.role, Role::User);

    // Allow-listed now: promoted at the next login, not retroactively.
    let svc = auth_service(users, vec!["boss@example.com".into()]);
    let second = svc
        .oauth_login(&tenant, "google|222", "boss@example.com")
        .await
        .unwrap();
    assert_eq!(second.user.role, Role::Admin);
}

#[tokio::test]
async fn oauth_login_respects_allow_oauth_flag() {
    let (db, users, tenant) = setup().await;

    let tenant_repo = SurrealTenantRepository::new(db);
    let tenant = tenant_repo
        .update(
            tenant.id,
            UpdateTenant {
                allow_oauth: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let svc = auth_service(users, vec![]);
    let err = svc
        .oauth_login(&tenant, "google|333", "nope@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden { .. }));
}

#[tokio::test]
async fn refresh_preserves_stale_role_from_old_token() {
    let (_db, users, tenant) = setup().await;
    let svc = auth_service(users.clone(), vec![]);

    let registered = svc
        .register(&tenant, "frank@example.com", "Password1")
        .await
        .unwrap();

    // Promote, log in, then demote behind the token's back.
    users
        .update(
            tenant.id,
            registered.user.id,
            UpdateUser {
                role: Some(Role::Admin),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let login = svc
        .login(&tenant, "frank@example.com", "Password1")
        .await
        .unwrap();
    users
        .update(
            tenant.id,
            registered.user.id,
            UpdateUser {
                role: Some(Role::User),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Refresh re-signs from the old token; the revoked role survives.
    let refreshed = svc.refresh(&tenant, &login.token).await.unwrap();
    let claims = TokenSigner::Hmac.verify(&tenant, &refreshed).unwrap();
    assert_eq!(claims.role, Role::Admin);
}

#[tokio::test]
async fn tenant_registry_resolves_and_gates() {
    let (db, _users, tenant) = setup().await;
    let registry = TenantRegistry::new(SurrealTenantRepository::new(db.clone()));

    // By id, by name, by subdomain.
    let by_id = registry
        .resolve(&TenantSelector::Id(tenant.id.to_string()))
        .await
        .unwrap();
    assert_eq!(by_id.id, tenant.id);

    let by_name = registry
        .resolve_parts(None, Some("test-tenant"), None)
        .await
        .unwrap();
    assert_eq!(by_name.id, tenant.id);

    let by_subdomain = registry
        .resolve_parts(None, None, Some("test-tenant.example.com"))
        .await
        .unwrap();
    assert_eq!(by_subdomain.id, tenant.id);

    // Unknown name echoes the identifier.
    let err = registry
        .resolve_parts(None, Some("nope"), None)
        .await
        .unwrap_err();
    match err {
        CoreError::NotFound { id, .. } => assert_eq!(id, "nope"),
        other => panic!("expected not-found, got {other}"),
    }

    // Deactivated tenant is forbidden, and the optional variant swallows
    // the failure.
    let tenant_repo = SurrealTenantRepository::new(db);
    tenant_repo
        .update(
            tenant.id,
            UpdateTenant {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let err = registry
        .resolve_parts(None, Some("test-tenant"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden { .. }));
    assert!(
        registry
            .resolve_parts_optional(None, Some("test-tenant"), None)
            .await
            .is_none()
    );
}

#[tokio::test]
async fn admin_protection_end_to_end() {
    let (_db, users, tenant) = setup().await;

    let admin_a = users
        .create(CreateUser {
            tenant_id: tenant.id,
            email: "admin-a@example.com".into(),
            password: Some("Password1".into()),
            oauth_subject: None,
            role: Role::Admin,
        })
        .await
        .unwrap();
    let admin_b = users
        .create(CreateUser {
            tenant_id: tenant.id,
            email: "admin-b@example.com".into(),
            password: Some("Password1".into()),
            oauth_subject: None,
            role: Role::Admin,
        })
        .await
        .unwrap();

    let svc = AdminService::new(users.clone());
    let actor = Principal {
        user_id: admin_a.id,
        tenant_id: tenant.id,
        email: admin_a.email.clone(),
        role: Role::Admin,
    };

    // A targeting B: rejected for role and status changes.
    let err = svc
        .change_role(&actor, admin_b.id, Role::User)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden { .. }));
    let err = svc
        .change_status(&actor, admin_b.id, UserStatus::Suspended)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Forbidden { .. }));

    // A targeting itself: allowed.
    let downgraded = svc
        .change_role(&actor, admin_a.id, Role::User)
        .await
        .unwrap();
    assert_eq!(downgraded.role, Role::User);

    // Deleting an admin is always rejected.
    let err = svc.delete_user(&actor, admin_b.id).await.unwrap_err();
    assert!(matches!(err, CoreError::Forbidden { .. }));

    // Deleting a plain user works.
    let victim = users
        .create(CreateUser {
            tenant_id: tenant.id,
            email: "victim@example.com".into(),
            password: Some("Password1".into()),
            oauth_subject: None,
            role: Role::User,
        })
        .await
        .unwrap();
    svc.delete_user(&actor, victim.id).await.unwrap();
    let gone = users.get_by_id(tenant.id, victim.id).await.unwrap();
    assert_eq!(gone.status, UserStatus::Deleted);
}

#[tokio::test]
async fn admin_mutations_are_tenant_scoped() {
    let (db, users, tenant) = setup().await;

    let tenant_repo = SurrealTenantRepository::new(db);
    let other = tenant_repo
        .create(CreateTenant {
            name: "other".into(),
            domain: "other.example.com".into(),
            token_secret: Some(generate_tenant_secret()),
            token_lifetime_secs: 3600,
            allow_registration: true,
            allow_oauth: false,
            oauth_client_id: None,
            oauth_client_secret: None,
            password_policy: PasswordPolicy::default(),
        })
        .await
        .unwrap();

    let foreign_user = users
        .create(CreateUser {
            tenant_id: other.id,
            email: "foreign@example.com".into(),
            password: Some("Password1".into()),
            oauth_subject: None,
            role: Role::User,
        })
        .await
        .unwrap();

    let svc = AdminService::new(users);
    let actor = Principal {
        user_id: Uuid::new_v4(),
        tenant_id: tenant.id,
        email: "admin@example.com".into(),
        role: Role::Admin,
    };

    // The target belongs to another tenant: not found, not mutated.
    let err = svc
        .change_status(&actor, foreign_user.id, UserStatus::Suspended)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}
