//! Background jobs.

pub mod deletion;

pub use deletion::{DeletionScheduler, DeletionTicket};
