//! Logging macros used across the crate.
//!
//! Events are emitted through `tracing` under the `bulwark_csrf` target;
//! install any subscriber in the host application to see them. Secrets and
//! token values are never logged.

pub use tracing::{debug, trace, warn};
