//! Request middleware: tenant resolution and identity gates.

pub mod identity;
pub mod tenancy;

pub use identity::{Auth, OptionalAuth};
pub use tenancy::{CurrentTenant, MaybeTenant};
