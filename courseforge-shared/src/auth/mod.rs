/// Authentication utilities
///
/// Courseforge does not manage identities itself: users sign in with the
/// external identity provider, which issues the tokens this module validates.
///
/// - `jwt`: identity-provider token validation
/// - `context`: per-request auth context and role guards

pub mod context;
pub mod jwt;
