//! Request lifecycle management
//!
//! This module provides the fetch controller: a trigger operation plus
//! loading/data/error state for a single request target, with cancellation
//! of superseded and orphaned requests.

pub mod controller;

pub use controller::{server_error_from, FetchController};
