//! Lakeflow Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared error handling and logging for the Lakeflow workspace.
//!
//! # Overview
//!
//! This crate provides functionality used across all Lakeflow workspace members:
//!
//! - **Error Handling**: The [`LakeflowError`] type and [`Result`] alias
//! - **Logging**: `tracing`-based logging setup shared by every binary

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{LakeflowError, Result};
