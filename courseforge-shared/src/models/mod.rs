/// Database models for Courseforge
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Accounts mapped from the external identity provider, role-tagged
/// - `creator_application`: A learner's request to become a creator
/// - `course`: Sellable units of content with a moderation state machine
/// - `course_module`: Ordered groupings of lessons within a course
/// - `lesson`: Playable units backed by the external video platform
/// - `order`: Completed or refunded purchases (the ledger)
/// - `enrollment`: Access grants linking a learner to a purchased course
/// - `payout`: Transfers of aggregated creator earnings
/// - `review`: Learner ratings of purchased courses

pub mod course;
pub mod course_module;
pub mod creator_application;
pub mod enrollment;
pub mod lesson;
pub mod order;
pub mod payout;
pub mod review;
pub mod user;
