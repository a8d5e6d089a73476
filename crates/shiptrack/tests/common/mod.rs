//! Shared test utilities for shiptrack integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated pipeline runs against a fresh database
//! - Builders for inbound payloads and configs

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::{FailingNotifier, RecordingNotifier, TestHarness};
