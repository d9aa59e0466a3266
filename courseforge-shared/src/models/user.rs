/// User model and database operations
///
/// Users are created lazily: the first authenticated request carrying a new
/// identity-provider subject upserts a row keyed by `identity_id`. Identity
/// and sessions live entirely in the external provider; this table only maps
/// the opaque external id to an internal account with a role.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE user_role AS ENUM ('learner', 'creator', 'admin');
/// CREATE TYPE creator_status AS ENUM ('pending', 'approved', 'rejected');
///
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     identity_id VARCHAR(255) NOT NULL UNIQUE,
///     email VARCHAR(320) NOT NULL,
///     name VARCHAR(255),
///     role user_role NOT NULL DEFAULT 'learner',
///     creator_status creator_status,
///     payout_account_id VARCHAR(255),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can browse, purchase, and review courses
    Learner,

    /// Can additionally create and sell courses (once approved)
    Creator,

    /// Can moderate applications/courses and trigger refunds
    Admin,
}

impl Role {
    /// Converts role to string for logging
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Learner => "learner",
            Role::Creator => "creator",
            Role::Admin => "admin",
        }
    }
}

/// Outcome of the most recent creator application review, if any
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "creator_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CreatorStatus {
    Pending,
    Approved,
    Rejected,
}

/// User model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Opaque subject id from the external identity provider
    pub identity_id: String,

    /// Email address (mirrored from the identity provider)
    pub email: String,

    /// Display name
    pub name: Option<String>,

    /// Account role
    pub role: Role,

    /// Creator approval state (null until the user applies)
    pub creator_status: Option<CreatorStatus>,

    /// Opaque payment-provider payee account reference
    pub payout_account_id: Option<String>,

    /// When the user was created
    pub created_at: DateTime<Utc>,

    /// When the user was last updated
    pub updated_at: DateTime<Utc>,
}

/// Profile fields supplied by the identity provider on each request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProfile {
    /// Identity-provider subject id
    pub identity_id: String,

    /// Email address
    pub email: String,

    /// Display name
    pub name: Option<String>,
}

impl User {
    /// Finds a user by internal ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, identity_id, email, name, role, creator_status,
                   payout_account_id, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Upserts a user from an identity-provider profile
    ///
    /// Creates the row on first sign-in; on subsequent requests refreshes the
    /// mirrored profile fields. Role and creator status are never touched
    /// here — those change only through the moderation workflow.
    pub async fn upsert_from_identity(
        pool: &PgPool,
        profile: &IdentityProfile,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (identity_id, email, name)
            VALUES ($1, $2, $3)
            ON CONFLICT (identity_id)
            DO UPDATE SET email = EXCLUDED.email,
                          name = COALESCE(EXCLUDED.name, users.name),
                          updated_at = NOW()
            RETURNING id, identity_id, email, name, role, creator_status,
                      payout_account_id, created_at, updated_at
            "#,
        )
        .bind(&profile.identity_id)
        .bind(&profile.email)
        .bind(&profile.name)
        .fetch_one(pool)
        .await
    }

    /// Links a payment-provider payee account to the user
    pub async fn set_payout_account(
        pool: &PgPool,
        id: Uuid,
        payout_account_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET payout_account_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(payout_account_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// True if the user may create and sell courses
    pub fn is_approved_creator(&self) -> bool {
        self.role == Role::Creator && self.creator_status == Some(CreatorStatus::Approved)
    }

    /// True if the user has admin privileges
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: Role, creator_status: Option<CreatorStatus>) -> User {
        User {
            id: Uuid::new_v4(),
            identity_id: "idp_123".to_string(),
            email: "user@example.com".to_string(),
            name: Some("Test User".to_string()),
            role,
            creator_status,
            payout_account_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_approved_creator_requires_both_fields() {
        assert!(sample_user(Role::Creator, Some(CreatorStatus::Approved)).is_approved_creator());

        // Role alone is not enough
        assert!(!sample_user(Role::Creator, Some(CreatorStatus::Pending)).is_approved_creator());
        assert!(!sample_user(Role::Creator, None).is_approved_creator());
        assert!(!sample_user(Role::Learner, Some(CreatorStatus::Approved)).is_approved_creator());
    }

    #[test]
    fn test_admin_check() {
        assert!(sample_user(Role::Admin, None).is_admin());
        assert!(!sample_user(Role::Learner, None).is_admin());
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Creator).unwrap(), "\"creator\"");
        assert_eq!(Role::Admin.as_str(), "admin");
    }
}
