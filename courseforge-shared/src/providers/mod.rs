/// External provider clients
///
/// Narrow capability interfaces over the two SaaS collaborators. Missing
/// credentials produce an `Unconfigured` client at construction time; every
/// call on an unconfigured client fails with `ProviderError::Unconfigured`
/// instead of a scattered null check.
///
/// All provider identifiers (session ids, payment references, asset ids,
/// transfer ids) are opaque strings owned by the provider and are never
/// parsed internally.
///
/// - `payment`: hosted checkout sessions, refunds, payee accounts, transfers
/// - `video`: direct uploads for lesson video
/// - `signature`: webhook signature verification shared by both event streams

pub mod payment;
pub mod signature;
pub mod video;
