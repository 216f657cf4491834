//! Data models for the relay pipeline
//!
//! Everything here is created per incoming message and dropped once the
//! sender has been notified; nothing is cached across messages.

mod incoming;
mod outcome;
mod routing;

pub use incoming::*;
pub use outcome::*;
pub use routing::*;
