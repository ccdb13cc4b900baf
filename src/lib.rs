//! Builds and checks the workspace / pull-bucket trees of a music project
//! from its import folders.

pub mod builder;
pub mod config;
pub mod diff;
pub mod error;
pub mod library;
pub mod logger;
pub mod slug;
pub mod sync;
pub mod template;

pub use error::{Error, Result};
