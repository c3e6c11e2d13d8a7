//! Application controller: authentication gate and domain navigation
//!
//! Access transitions are pure (see [`access`]); [`AppController`] executes
//! their effects by mounting and unmounting session runtimes.

pub mod access;
mod controller;


#[cfg(test)]
pub mod testing;

pub use access::AccessError;
pub use controller::{AppController, AppError, AppView, ControllerConfig};
