//! Bot module - Core bot functionality.

pub mod dispatcher;
mod health;
pub mod messenger;
mod runtime;
mod webhook;

#[cfg(test)]
pub mod testing;

pub use dispatcher::{AppState, build_dispatcher};
pub use runtime::run;
