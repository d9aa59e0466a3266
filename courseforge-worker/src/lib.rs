//! # Courseforge Worker Library
//!
//! Background processing for the Courseforge marketplace.
//!
//! ## Modules
//!
//! - `scheduler`: Interval-driven payout batch scheduler

pub mod scheduler;
