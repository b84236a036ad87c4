//! Published discovery endpoint for external verifiers.

use axum::Json;
use axum::extract::State;
use quillpress_auth::jwks::JwksDocument;

use crate::state::AppState;

/// `GET /.well-known/jwks.json` — the service's RS256 public key, or an
/// empty key set in per-tenant HMAC deployments.
pub async fn jwks(State(state): State<AppState>) -> Json<JwksDocument> {
    Json(state.signer.jwks())
}
