//! HTTP request handlers
//!
//! Chart images are served straight from the graph directory by the router.

pub mod upload;

pub use upload::*;
