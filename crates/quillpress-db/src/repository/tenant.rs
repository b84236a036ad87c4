//! SurrealDB implementation of [`TenantRepository`].

use chrono::{DateTime, Utc};
use quillpress_core::error::CoreResult;
use quillpress_core::models::tenant::{CreateTenant, PasswordPolicy, Tenant, UpdateTenant};
use quillpress_core::repository::{PaginatedResult, Pagination, TenantRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

#[derive(Debug, Clone, SurrealValue)]
struct PolicyRow {
    min_length: u64,
    require_uppercase: bool,
    require_number: bool,
    require_special: bool,
}

impl From<PasswordPolicy> for PolicyRow {
    fn from(policy: PasswordPolicy) -> Self {
        Self {
            min_length: policy.min_length as u64,
            require_uppercase: policy.require_uppercase,
            require_number: policy.require_number,
            require_special: policy.require_special,
        }
    }
}

impl From<PolicyRow> for PasswordPolicy {
    fn from(row: PolicyRow) -> Self {
        Self {
            min_length: row.min_length as usize,
            require_uppercase: row.require_uppercase,
            require_number: row.require_number,
            require_special: row.require_special,
        }
    }
}

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct TenantRow {
    name: String,
    domain: String,
    token_secret: Option<String>,
    token_lifetime_secs: u64,
    allow_registration: bool,
    allow_oauth: bool,
    oauth_client_id: Option<String>,
    oauth_client_secret: Option<String>,
    password_policy: PolicyRow,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRow {
    fn into_tenant(self, id: Uuid) -> Tenant {
        Tenant {
            id,
            name: self.name,
            domain: self.domain,
            token_secret: self.token_secret,
            token_lifetime_secs: self.token_lifetime_secs,
            allow_registration: self.allow_registration,
            allow_oauth: self.allow_oauth,
            oauth_client_id: self.oauth_client_id,
            oauth_client_secret: self.oauth_client_secret,
            password_policy: self.password_policy.into(),
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct TenantRowWithId {
    record_id: String,
    name: String,
    domain: String,
    token_secret: Option<String>,
    token_lifetime_secs: u64,
    allow_registration: bool,
    allow_oauth: bool,
    oauth_client_id: Option<String>,
    oauth_client_secret: Option<String>,
    password_policy: PolicyRow,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TenantRowWithId {
    fn try_into_tenant(self) -> Result<Tenant, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        Ok(Tenant {
            id,
            name: self.name,
            domain: self.domain,
            token_secret: self.token_secret,
            token_lifetime_secs: self.token_lifetime_secs,
            allow_registration: self.allow_registration,
            allow_oauth: self.allow_oauth,
            oauth_client_id: self.oauth_client_id,
            oauth_client_secret: self.oauth_client_secret,
            password_policy: self.password_policy.into(),
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Tenant repository.
#[derive(Clone)]
pub struct SurrealTenantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealTenantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> TenantRepository for SurrealTenantRepository<C> {
    async fn create(&self, input: CreateTenant) -> CoreResult<Tenant> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('tenant', $id) SET \
                 name = $name, domain = $domain, \
                 token_secret = $token_secret, \
                 token_lifetime_secs = $token_lifetime_secs, \
                 allow_registration = $allow_registration, \
                 allow_oauth = $allow_oauth, \
                 oauth_client_id = $oauth_client_id, \
                 oauth_client_secret = $oauth_client_secret, \
                 password_policy = $password_policy, \
                 active = true",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("domain", input.domain))
            .bind(("token_secret", input.token_secret))
            .bind(("token_lifetime_secs", input.token_lifetime_secs))
            .bind(("allow_registration", input.allow_registration))
            .bind(("allow_oauth", input.allow_oauth))
            .bind(("oauth_client_id", input.oauth_client_id))
            .bind(("oauth_client_secret", input.oauth_client_secret))
            .bind(("password_policy", PolicyRow::from(input.password_policy)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_create(e, "tenant"))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id))
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Tenant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('tenant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id))
    }

    async fn get_by_name(&self, name: &str) -> CoreResult<Tenant> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 WHERE name = $name",
            )
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: name.to_string(),
        })?;

        Ok(row.try_into_tenant()?)
    }

    async fn update(&self, id: Uuid, input: UpdateTenant) -> CoreResult<Tenant> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.domain.is_some() {
            sets.push("domain = $domain");
        }
        if input.token_lifetime_secs.is_some() {
            sets.push("token_lifetime_secs = $token_lifetime_secs");
        }
        if input.allow_registration.is_some() {
            sets.push("allow_registration = $allow_registration");
        }
        if input.allow_oauth.is_some() {
            sets.push("allow_oauth = $allow_oauth");
        }
        if input.oauth_client_id.is_some() {
            sets.push("oauth_client_id = $oauth_client_id");
        }
        if input.oauth_client_secret.is_some() {
            sets.push("oauth_client_secret = $oauth_client_secret");
        }
        if input.password_policy.is_some() {
            sets.push("password_policy = $password_policy");
        }
        if input.active.is_some() {
            sets.push("active = $active");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('tenant', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(domain) = input.domain {
            builder = builder.bind(("domain", domain));
        }
        if let Some(token_lifetime_secs) = input.token_lifetime_secs {
            builder = builder.bind(("token_lifetime_secs", token_lifetime_secs));
        }
        if let Some(allow_registration) = input.allow_registration {
            builder = builder.bind(("allow_registration", allow_registration));
        }
        if let Some(allow_oauth) = input.allow_oauth {
            builder = builder.bind(("allow_oauth", allow_oauth));
        }
        if let Some(oauth_client_id) = input.oauth_client_id {
            // Option<Option<String>>: Some(Some(v)) = set, Some(None) = clear.
            builder = builder.bind(("oauth_client_id", oauth_client_id));
        }
        if let Some(oauth_client_secret) = input.oauth_client_secret {
            builder = builder.bind(("oauth_client_secret", oauth_client_secret));
        }
        if let Some(password_policy) = input.password_policy {
            builder = builder.bind(("password_policy", PolicyRow::from(password_policy)));
        }
        if let Some(active) = input.active {
            builder = builder.bind(("active", active));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Migration(e.to_string()))?;

        let rows: Vec<TenantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "tenant".into(),
            id: id_str,
        })?;

        Ok(row.into_tenant(id))
    }

    async fn list(&self, pagination: Pagination) -> CoreResult<PaginatedResult<Tenant>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM tenant GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM tenant \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TenantRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_tenant())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
