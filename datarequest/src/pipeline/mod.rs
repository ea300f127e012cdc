//! Pipeline execution.
//!
//! The [`PipelineManager`] owns the stage definitions and runs them in
//! their fixed order, halting on the first stage failure.

mod manager;


pub use manager::{PipelineManager, PipelineReport};
