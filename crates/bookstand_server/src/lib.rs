//! HTTP/JSON boundary for the Bookstand core.
//!
//! Thin glue only: handlers translate requests into library calls and map
//! core errors onto status codes. All catalog invariants live in
//! `bookstand_core`.

pub mod api;
