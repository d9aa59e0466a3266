/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `courses`: Public catalog and creator course authoring
/// - `modules`: Course module authoring
/// - `lessons`: Lesson authoring and video upload minting
/// - `checkout`: Hosted checkout session creation
/// - `creator`: Creator applications and payee onboarding
/// - `me`: The caller's enrollments and orders
/// - `reviews`: Course reviews
/// - `admin`: Moderation and refunds
/// - `payouts`: Payout batch trigger
/// - `webhooks`: Signed provider webhook ingestion

pub mod admin;
pub mod checkout;
pub mod courses;
pub mod creator;
pub mod health;
pub mod lessons;
pub mod me;
pub mod modules;
pub mod payouts;
pub mod reviews;
pub mod webhooks;
