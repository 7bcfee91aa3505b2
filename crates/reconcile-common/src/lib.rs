//! Common utilities for the reconcile workspace.
//!
//! This crate provides shared infrastructure used by every component:
//! - **Warning System** - deduplicated, colored stderr output for recoverable
//!   markup problems found while tokenizing or building trees

pub mod warning;
