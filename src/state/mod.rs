//! State module for tracking traversal progress
//!
//! This module holds everything the pagination controller mutates between
//! pages. None of it is shared with the detail-fetch tasks.
//!
//! # Components
//!
//! - `TraversalState`: page index, empty-page streak, loop snapshot, and the per-page decision
//! - `SeenUrlSet`: every detail URL observed so far in the run
//! - `StopReason`: why a traversal ended

mod stop_reason;
mod traversal;

// Re-export main types
pub use stop_reason::StopReason;
pub use traversal::{PageDecision, SeenUrlSet, TraversalState};
