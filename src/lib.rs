//! hubberbot: answers chat queries about a person by their GitHub handle.
//!
//! The public profile is combined with the organization directory entry and
//! returned as a markdown table inside a chat-completion chunk.

pub mod api;
pub mod config;
pub mod error;
pub mod profile;

pub use error::{Error, Result};
