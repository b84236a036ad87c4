//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Tenants (global scope)
-- =======================================================================
DEFINE TABLE tenant SCHEMAFULL;
DEFINE FIELD name ON TABLE tenant TYPE string;
DEFINE FIELD domain ON TABLE tenant TYPE string;
DEFINE FIELD token_secret ON TABLE tenant TYPE option<string>;
DEFINE FIELD token_lifetime_secs ON TABLE tenant TYPE int;
DEFINE FIELD allow_registration ON TABLE tenant TYPE bool DEFAULT true;
DEFINE FIELD allow_oauth ON TABLE tenant TYPE bool DEFAULT false;
DEFINE FIELD oauth_client_id ON TABLE tenant TYPE option<string>;
DEFINE FIELD oauth_client_secret ON TABLE tenant TYPE option<string>;
DEFINE FIELD password_policy ON TABLE tenant TYPE object;
DEFINE FIELD password_policy.min_length ON TABLE tenant TYPE int \
    DEFAULT 8;
DEFINE FIELD password_policy.require_uppercase ON TABLE tenant \
    TYPE bool DEFAULT true;
DEFINE FIELD password_policy.require_number ON TABLE tenant \
    TYPE bool DEFAULT true;
DEFINE FIELD password_policy.require_special ON TABLE tenant \
    TYPE bool DEFAULT false;
DEFINE FIELD active ON TABLE tenant TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE tenant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_tenant_name ON TABLE tenant COLUMNS name UNIQUE;

-- =======================================================================
-- Users (tenant scope)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE user TYPE string;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE option<string>;
DEFINE FIELD oauth_subject ON TABLE user TYPE option<string>;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['USER', 'ADMIN'];
DEFINE FIELD status ON TABLE user TYPE string \
    ASSERT $value IN ['ACTIVE', 'SUSPENDED', 'DELETED'];
DEFINE FIELD last_login_at ON TABLE user TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_tenant_email ON TABLE user \
    COLUMNS tenant_id, email UNIQUE;

-- =======================================================================
-- Posts (tenant scope)
-- =======================================================================
DEFINE TABLE post SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE post TYPE string;
DEFINE FIELD author_id ON TABLE post TYPE string;
DEFINE FIELD title ON TABLE post TYPE string;
DEFINE FIELD slug ON TABLE post TYPE string;
DEFINE FIELD status ON TABLE post TYPE string \
    ASSERT $value IN ['PUBLISHED', 'DRAFT'];
DEFINE FIELD view_count ON TABLE post TYPE int DEFAULT 0;
DEFINE FIELD like_count ON TABLE post TYPE int DEFAULT 0;
DEFINE FIELD featured ON TABLE post TYPE bool DEFAULT false;
DEFINE FIELD published_at ON TABLE post TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE post TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE post TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_post_tenant_slug ON TABLE post \
    COLUMNS tenant_id, slug UNIQUE;
DEFINE INDEX idx_post_tenant_featured ON TABLE post \
    COLUMNS tenant_id, featured;

-- =======================================================================
-- Engagement records (tenant scope, dedup keys)
-- =======================================================================
DEFINE TABLE engagement SCHEMAFULL;
DEFINE FIELD tenant_id ON TABLE engagement TYPE string;
DEFINE FIELD post_id ON TABLE engagement TYPE string;
DEFINE FIELD identity ON TABLE engagement TYPE string;
DEFINE FIELD kind ON TABLE engagement TYPE string \
    ASSERT $value IN ['VIEW', 'LIKE'];
DEFINE FIELD recorded_at ON TABLE engagement TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_engagement_key ON TABLE engagement \
    COLUMNS tenant_id, post_id, identity, kind UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }
}
