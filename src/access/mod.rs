pub mod roles;
pub mod scope;

pub use scope::{Principal, ProfileClaims, ScopePredicate, ScopeStrategy};
