//! Use-case facades over persistence and maintenance components.
//!
//! # Responsibility
//! - Provide stable entry points for the API layer and tools.
//! - Keep storage, backup and export wiring out of callers.

pub mod library;
