//! Status broadcasting.
//!
//! The [`StatusChannel`] is injected into the pipeline manager and the stage
//! runner; nothing here is process-global.

mod channel;
mod listeners;
mod status;

pub use channel::{StatusChannel, StatusListener};
pub use listeners::{CollectingListener, FnListener, LoggingListener};
pub use status::{StatusKind, StatusUpdate};

#[cfg(test)]
pub use channel::MockStatusListener;
