//! Channel membership gate.
//!
//! Decides whether a user may receive content by looking up their status
//! in the required channel. Lookup failures never grant access.

mod gate;

pub use gate::{Membership, MembershipGate};
