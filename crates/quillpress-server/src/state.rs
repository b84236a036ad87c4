//! Shared application state.

use std::sync::Arc;

use quillpress_auth::admin::AdminService;
use quillpress_auth::service::AuthService;
use quillpress_auth::{TenantRegistry, TokenSigner};
use quillpress_core::error::CoreResult;
use quillpress_db::repository::{
    SurrealEngagementRepository, SurrealPostRepository, SurrealTenantRepository,
    SurrealUserRepository,
};
use quillpress_engage::{EngagementService, FeaturedRanker};
use surrealdb::Surreal;
use surrealdb::engine::remote::ws::Client;

use crate::config::ServerConfig;

pub type Db = Client;

#[derive(Clone)]
pub struct AppState {
    pub tenants: SurrealTenantRepository<Db>,
    pub users: SurrealUserRepository<Db>,
    pub posts: SurrealPostRepository<Db>,
    pub registry: TenantRegistry<SurrealTenantRepository<Db>>,
    pub signer: Arc<TokenSigner>,
    pub auth: Arc<AuthService<SurrealUserRepository<Db>>>,
    pub admin: Arc<AdminService<SurrealUserRepository<Db>>>,
    pub engagement: Arc<EngagementService<SurrealEngagementRepository<Db>>>,
    pub ranker: Arc<FeaturedRanker<SurrealPostRepository<Db>>>,
    pub super_admin_key: String,
    pub default_token_lifetime_secs: u64,
}

impl AppState {
    pub fn new(db: Surreal<Db>, config: &ServerConfig) -> CoreResult<Self> {
        let tenants = SurrealTenantRepository::new(db.clone());
        let users = SurrealUserRepository::new(db.clone());
        let posts = SurrealPostRepository::new(db.clone());
        let engagements = SurrealEngagementRepository::new(db);

        let signer = Arc::new(TokenSigner::from_config(&config.auth)?);

        Ok(Self {
            registry: TenantRegistry::new(tenants.clone()),
            auth: Arc::new(AuthService::new(
                users.clone(),
                signer.clone(),
                config.auth.admin_oauth_emails.clone(),
            )),
            admin: Arc::new(AdminService::new(users.clone())),
            engagement: Arc::new(EngagementService::new(
                engagements,
                config.engagement_window.clone(),
            )),
            ranker: Arc::new(FeaturedRanker::new(posts.clone())),
            signer,
            super_admin_key: config.auth.super_admin_key.clone(),
            default_token_lifetime_secs: config.auth.default_token_lifetime_secs,
            tenants,
            users,
            posts,
        })
    }
}
