//! SurrealDB repository implementations.

mod engagement;
mod post;
mod tenant;
mod user;

pub use engagement::SurrealEngagementRepository;
pub use post::SurrealPostRepository;
pub use tenant::SurrealTenantRepository;
pub use user::SurrealUserRepository;
