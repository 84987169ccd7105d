//! saloon-core
//!
//! Shared vocabulary of the search pipeline: indexable documents, content
//! snapshots, search results, the error taxonomy, the seam traits between
//! the index, the content store and the scheduler, and the configuration
//! loader.
#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
