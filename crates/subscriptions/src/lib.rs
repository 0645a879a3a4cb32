//! Recurring charges and their monthly cost.

pub mod subscription;

pub use subscription::{monthly_total, Frequency, Subscription};
