/// Moderation workflows
///
/// Two independent state machines:
///
/// - **Creator applications**: `pending → approved | rejected` (terminal).
///   Approval flips the user's role to creator; rejection keeps them a
///   learner. The user and application rows are updated in one transaction —
///   a partially applied review is never observable.
/// - **Courses**: `draft → submitted → published | rejected`, with
///   `rejected → submitted` allowed for resubmission after revisions (see
///   DESIGN.md). Publishing stamps `published_at`; rejection clears it.

use crate::models::course::{Course, CourseStatus};
use crate::models::creator_application::{ApplicationStatus, CreatorApplication};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

/// Error type for moderation operations
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    /// Referenced course does not exist
    #[error("Course {0} not found")]
    CourseNotFound(Uuid),

    /// No application exists for the user
    #[error("No creator application for user {0}")]
    ApplicationNotFound(Uuid),

    /// Application has already been reviewed
    #[error("Application for user {0} has already been reviewed")]
    AlreadyReviewed(Uuid),

    /// Caller does not own the course
    #[error("Course {0} is not owned by the caller")]
    NotOwner(Uuid),

    /// Requested transition is not allowed from the current state
    #[error("Course is {current}, cannot transition to {requested}")]
    InvalidTransition {
        current: &'static str,
        requested: &'static str,
    },

    /// Database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Submits a course for review (creator-triggered)
///
/// Allowed from `draft` and, for resubmission, from `rejected`. The caller
/// must own the course.
pub async fn submit_course(
    pool: &PgPool,
    course_id: Uuid,
    creator_id: Uuid,
) -> Result<Course, ModerationError> {
    let course = Course::find_by_id(pool, course_id)
        .await?
        .ok_or(ModerationError::CourseNotFound(course_id))?;

    if course.creator_id != creator_id {
        return Err(ModerationError::NotOwner(course_id));
    }

    if !course.status.can_transition_to(CourseStatus::Submitted) {
        return Err(ModerationError::InvalidTransition {
            current: course.status.as_str(),
            requested: CourseStatus::Submitted.as_str(),
        });
    }

    let updated = sqlx::query_as::<_, Course>(
        r#"
        UPDATE courses
        SET status = 'submitted', updated_at = NOW()
        WHERE id = $1
        RETURNING id, creator_id, title, slug, description, price_cents,
                  category, tags, thumbnail_url, status, published_at,
                  created_at, updated_at
        "#,
    )
    .bind(course_id)
    .fetch_one(pool)
    .await?;

    info!(course_id = %course_id, creator_id = %creator_id, "Course submitted for review");

    Ok(updated)
}

/// Reviews a submitted course (admin-triggered)
///
/// Approval publishes the course and stamps `published_at`; rejection clears
/// it. Only `submitted` courses can be reviewed.
pub async fn review_course(
    pool: &PgPool,
    course_id: Uuid,
    approved: bool,
) -> Result<Course, ModerationError> {
    let course = Course::find_by_id(pool, course_id)
        .await?
        .ok_or(ModerationError::CourseNotFound(course_id))?;

    let target = if approved {
        CourseStatus::Published
    } else {
        CourseStatus::Rejected
    };

    if !course.status.can_transition_to(target) {
        return Err(ModerationError::InvalidTransition {
            current: course.status.as_str(),
            requested: target.as_str(),
        });
    }

    let updated = sqlx::query_as::<_, Course>(
        r#"
        UPDATE courses
        SET status = $2,
            published_at = CASE WHEN $3 THEN NOW() ELSE NULL END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, creator_id, title, slug, description, price_cents,
                  category, tags, thumbnail_url, status, published_at,
                  created_at, updated_at
        "#,
    )
    .bind(course_id)
    .bind(target)
    .bind(approved)
    .fetch_one(pool)
    .await?;

    info!(
        course_id = %course_id,
        status = target.as_str(),
        "Course reviewed"
    );

    Ok(updated)
}

/// Reviews a creator application (admin-triggered)
///
/// Approval sets the user's role to creator and creator_status to approved;
/// rejection keeps the learner role. Both the user and the application row
/// are updated in a single transaction. Terminal applications reject a
/// second review.
pub async fn review_application(
    pool: &PgPool,
    user_id: Uuid,
    approved: bool,
    reviewer_id: Uuid,
) -> Result<CreatorApplication, ModerationError> {
    let mut tx = pool.begin().await?;

    // Lock the application row for the duration of the review so two admins
    // cannot race to opposite verdicts.
    let status: Option<ApplicationStatus> = sqlx::query_scalar(
        "SELECT status FROM creator_applications WHERE user_id = $1 FOR UPDATE",
    )
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;

    let status = status.ok_or(ModerationError::ApplicationNotFound(user_id))?;
    if status.is_terminal() {
        return Err(ModerationError::AlreadyReviewed(user_id));
    }

    let (role, creator_status, app_status) = if approved {
        ("creator", "approved", "approved")
    } else {
        ("learner", "rejected", "rejected")
    };

    sqlx::query(
        r#"
        UPDATE users
        SET role = $2::user_role, creator_status = $3::creator_status, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(role)
    .bind(creator_status)
    .execute(&mut *tx)
    .await?;

    let application = sqlx::query_as::<_, CreatorApplication>(
        r#"
        UPDATE creator_applications
        SET status = $2::application_status, reviewed_by = $3, reviewed_at = NOW()
        WHERE user_id = $1
        RETURNING id, user_id, bio, reason, social_links, status,
                  reviewed_by, reviewed_at, created_at
        "#,
    )
    .bind(user_id)
    .bind(app_status)
    .bind(reviewer_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        user_id = %user_id,
        reviewer_id = %reviewer_id,
        approved = approved,
        "Creator application reviewed"
    );

    Ok(application)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModerationError::InvalidTransition {
            current: "published",
            requested: "submitted",
        };
        assert_eq!(
            err.to_string(),
            "Course is published, cannot transition to submitted"
        );
    }
}
