//! Vantage Core Library
//!
//! This crate provides the client-side core for the Vantage console's
//! Projects workspace, including:
//! - Project domain model (records, drafts, role memberships)
//! - REST backend client for the remote Project API
//! - Observable in-memory project store with single-flight reloads
//! - Edit sessions and name validation
//! - Access control collaborators
//! - Headless view models for the list and details screens

pub mod access;
pub mod api;
pub mod config;
pub mod error;
pub mod project;
pub mod session;
pub mod store;
pub mod validate;
pub mod workspace;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::project::Project;
    pub use crate::store::ProjectStore;
}
