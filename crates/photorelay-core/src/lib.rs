//! Photorelay Core Library
//!
//! This crate provides the domain models, error types, configuration and the pure
//! decision rules (access, routing, classification, retry) shared by the
//! pipeline and the bot binary. Nothing in here performs I/O except
//! `Config::from_env`.

pub mod access;
pub mod classify;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod retry;
pub mod routing;

// Re-export commonly used types
pub use access::{AccessDecision, AccessGuard};
pub use classify::{Classification, MetadataClassifier};
pub use config::{Config, LocalEndpoint, LogFormat, LogLevel};
pub use error::{ErrorMetadata, PipelineError};
pub use models::{
    Endpoint, IncomingFile, MediaKind, RejectReason, RoutingDecision, TransmissionMode,
    UploadOutcome,
};
pub use retry::{RetryDecision, RetryPolicy};
pub use routing::TransportRouter;
