//! Authentication and role-based authorization.
//!
//! - [`JwtService`]: bearer token signing and validation
//! - [`CurrentUser`]: authenticated caller context
//! - [`require_auth`]: authentication middleware
//! - [`require_role`]: role allow-list middleware

pub mod jwt;
pub mod middleware;
pub mod roles;

pub use jwt::{Claims, CurrentUser, JwtError, JwtService};
pub use middleware::{require_auth, require_role};
pub use roles::{Role, ISSUE_REPORTERS, ISSUE_RESOLVERS};
