//! Testing utilities for pipeline plugins.
//!
//! This module provides:
//! - Recording plugins usable in any stage
//! - A shared call log for asserting invocation order
//! - Closure-backed plugin modules

#[cfg(test)]
mod fixtures;
mod mocks;

#[cfg(test)]
pub use fixtures::PipelineFixture;
pub use mocks::{trail, CallLog, RecordingPlugin, TestModule, TRAIL_KEY};
