//! # Asset Loading Module
//!
//! This module owns the loading side of a vignette: issuing model requests,
//! tracking aggregate completion, and handing out write-once handles to the
//! props that finished loading.
//!
//! ## Key Components
//!
//! - [`loader`] - Threaded OBJ parsing with one-shot-future load tickets
//! - [`readiness`] - The loading/ready state machine that gates rendering
//! - [`registry`] - Write-once mapping from prop names to scene handles
//!
//! A scene issues its whole request batch up front; completions arrive on
//! the event loop, which installs each model, registers its handle, and
//! advances the readiness gate. A single failed request leaves the batch
//! permanently short of ready (no retries, no partial-success mode).

pub mod loader;
pub mod readiness;
pub mod registry;

// Re-export main types
pub use loader::{AssetLoader, AssetRequest, LoadCompletion, LoadError, LoadTicket, Placement};
pub use readiness::{LoadingState, ReadinessGate, REVEAL_DELAY};
pub use registry::{PropHandle, PropRegistry};
