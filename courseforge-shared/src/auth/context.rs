/// Per-request authentication context and role guards
///
/// The API's auth middleware validates the identity token, upserts the user
/// row, and inserts an [`AuthContext`] into request extensions. Handlers
/// extract it with `Extension<AuthContext>` and apply role guards:
///
/// ```
/// use courseforge_shared::auth::context::AuthContext;
///
/// # fn handler(auth: AuthContext) -> Result<(), courseforge_shared::auth::context::AccessError> {
/// let admin = auth.require_admin()?;
/// println!("admin {} is acting", admin.id);
/// # Ok(())
/// # }
/// ```

use crate::models::user::{Role, User};
use serde::{Deserialize, Serialize};

/// Error type for role/ownership guards
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// Authenticated but lacking the required role
    #[error("Forbidden: {0}")]
    Forbidden(&'static str),
}

/// Authentication context added to request extensions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// The authenticated user (upserted from the identity profile)
    pub user: User,
}

impl AuthContext {
    /// Creates an auth context for a resolved user
    pub fn new(user: User) -> Self {
        Self { user }
    }

    /// Requires the admin role
    pub fn require_admin(&self) -> Result<&User, AccessError> {
        if self.user.is_admin() {
            Ok(&self.user)
        } else {
            Err(AccessError::Forbidden("admin role required"))
        }
    }

    /// Requires an approved creator
    pub fn require_creator(&self) -> Result<&User, AccessError> {
        if self.user.is_approved_creator() {
            Ok(&self.user)
        } else {
            Err(AccessError::Forbidden("approved creator role required"))
        }
    }

    /// Requires the learner role (e.g., for creator applications)
    pub fn require_learner(&self) -> Result<&User, AccessError> {
        if self.user.role == Role::Learner {
            Ok(&self.user)
        } else {
            Err(AccessError::Forbidden("already a creator or admin"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::CreatorStatus;
    use chrono::Utc;
    use uuid::Uuid;

    fn context(role: Role, creator_status: Option<CreatorStatus>) -> AuthContext {
        AuthContext::new(User {
            id: Uuid::new_v4(),
            identity_id: "idp_1".to_string(),
            email: "user@example.com".to_string(),
            name: None,
            role,
            creator_status,
            payout_account_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    #[test]
    fn test_admin_guard() {
        assert!(context(Role::Admin, None).require_admin().is_ok());
        assert!(context(Role::Creator, Some(CreatorStatus::Approved))
            .require_admin()
            .is_err());
    }

    #[test]
    fn test_creator_guard_needs_approval() {
        assert!(context(Role::Creator, Some(CreatorStatus::Approved))
            .require_creator()
            .is_ok());
        assert!(context(Role::Creator, Some(CreatorStatus::Pending))
            .require_creator()
            .is_err());
        assert!(context(Role::Learner, None).require_creator().is_err());
    }

    #[test]
    fn test_learner_guard() {
        assert!(context(Role::Learner, None).require_learner().is_ok());
        assert!(context(Role::Admin, None).require_learner().is_err());
    }
}
