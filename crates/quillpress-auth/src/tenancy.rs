//! Tenant resolution.
//!
//! Every inbound request is mapped to a tenant before anything else runs.
//! The selector is derived from, in priority order: an explicit tenant-id
//! header (with an optional edge-proxy prefix stripped), an explicit
//! tenant-name header, or the leftmost label of a `Host` with at least
//! three labels.

use quillpress_core::error::{CoreError, CoreResult};
use quillpress_core::models::tenant::Tenant;
use quillpress_core::repository::TenantRepository;
use uuid::Uuid;

pub const TENANT_ID_HEADER: &str = "x-tenant-id";
pub const TENANT_NAME_HEADER: &str = "x-tenant-name";

/// Prefix an edge proxy may prepend to the tenant-id header value.
pub const TENANT_ID_EDGE_PREFIX: &str = "tenant-";

/// How a request identified its tenant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TenantSelector {
    Id(String),
    Name(String),
    Subdomain(String),
}

impl TenantSelector {
    /// Derive a selector from the request parts, in priority order.
    ///
    /// Returns an identification error (400) when none of the three
    /// sources yields an identifier.
    pub fn from_parts(
        id_header: Option<&str>,
        name_header: Option<&str>,
        host: Option<&str>,
    ) -> CoreResult<Self> {
        if let Some(raw) = id_header.map(str::trim).filter(|v| !v.is_empty()) {
            let value = raw.strip_prefix(TENANT_ID_EDGE_PREFIX).unwrap_or(raw);
            return Ok(TenantSelector::Id(value.to_string()));
        }

        if let Some(name) = name_header.map(str::trim).filter(|v| !v.is_empty()) {
            return Ok(TenantSelector::Name(name.to_string()));
        }

        if let Some(label) = host.and_then(subdomain_label) {
            return Ok(TenantSelector::Subdomain(label));
        }

        Err(CoreError::Identification {
            reason: "no tenant id header, tenant name header, or subdomain present".into(),
        })
    }

    /// The raw identifier, echoed in lookup errors for operator debugging.
    pub fn value(&self) -> &str {
        match self {
            TenantSelector::Id(v) | TenantSelector::Name(v) | TenantSelector::Subdomain(v) => v,
        }
    }
}

/// Leftmost label of a hostname with at least three labels, port
/// stripped. `blog.example.com` → `blog`; `example.com` → none.
fn subdomain_label(host: &str) -> Option<String> {
    let host = host.split(':').next().unwrap_or(host);
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() >= 3 && !labels[0].is_empty() {
        Some(labels[0].to_string())
    } else {
        None
    }
}

/// Tenant lookup and gating over a [`TenantRepository`].
#[derive(Clone)]
pub struct TenantRegistry<R: TenantRepository> {
    repo: R,
}

impl<R: TenantRepository> TenantRegistry<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Resolve a selector to an active tenant.
    ///
    /// Lookup misses yield a not-found error echoing the identifier; an
    /// inactive tenant is rejected with a forbidden error.
    pub async fn resolve(&self, selector: &TenantSelector) -> CoreResult<Tenant> {
        let tenant = match selector {
            TenantSelector::Id(value) => {
                let id = Uuid::parse_str(value).map_err(|_| CoreError::NotFound {
                    entity: "tenant".into(),
                    id: value.clone(),
                })?;
                self.repo.get_by_id(id).await?
            }
            TenantSelector::Name(name) | TenantSelector::Subdomain(name) => {
                self.repo.get_by_name(name).await?
            }
        };

        if !tenant.active {
            return Err(CoreError::Forbidden {
                reason: format!("tenant {} is deactivated", tenant.name),
            });
        }

        Ok(tenant)
    }

    /// Resolve from raw request parts.
    pub async fn resolve_parts(
        &self,
        id_header: Option<&str>,
        name_header: Option<&str>,
        host: Option<&str>,
    ) -> CoreResult<Tenant> {
        let selector = TenantSelector::from_parts(id_header, name_header, host)?;
        self.resolve(&selector).await
    }

    /// Like [`resolve_parts`](Self::resolve_parts) but swallows every
    /// failure. Used only by endpoints that degrade gracefully without a
    /// tenant (author/profile widgets).
    pub async fn resolve_parts_optional(
        &self,
        id_header: Option<&str>,
        name_header: Option<&str>,
        host: Option<&str>,
    ) -> Option<Tenant> {
        self.resolve_parts(id_header, name_header, host).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_header_wins_over_name_and_host() {
        let sel = TenantSelector::from_parts(
            Some("0b8d8c74-9f2e-4f1a-9c0a-111111111111"),
            Some("other"),
            Some("acme.example.com"),
        )
        .unwrap();
        assert_eq!(
            sel,
            TenantSelector::Id("0b8d8c74-9f2e-4f1a-9c0a-111111111111".into())
        );
    }

    #[test]
    fn edge_prefix_is_stripped() {
        let sel = TenantSelector::from_parts(Some("tenant-abc123"), None, None).unwrap();
        assert_eq!(sel, TenantSelector::Id("abc123".into()));
    }

    #[test]
    fn name_header_wins_over_host() {
        let sel =
            TenantSelector::from_parts(None, Some("acme"), Some("other.example.com")).unwrap();
        assert_eq!(sel, TenantSelector::Name("acme".into()));
    }

    #[test]
    fn subdomain_requires_three_labels() {
        let sel = TenantSelector::from_parts(None, None, Some("acme.example.com")).unwrap();
        assert_eq!(sel, TenantSelector::Subdomain("acme".into()));

        assert!(TenantSelector::from_parts(None, None, Some("example.com")).is_err());
    }

    #[test]
    fn port_is_ignored_in_host() {
        let sel = TenantSelector::from_parts(None, None, Some("acme.example.com:8080")).unwrap();
        assert_eq!(sel, TenantSelector::Subdomain("acme".into()));
    }

    #[test]
    fn nothing_derivable_is_an_identification_error() {
        let err = TenantSelector::from_parts(None, None, None).unwrap_err();
        assert!(matches!(err, CoreError::Identification { .. }));

        let err = TenantSelector::from_parts(Some("  "), None, Some("localhost")).unwrap_err();
        assert!(matches!(err, CoreError::Identification { .. }));
    }
}
