//! chesync Che - Che workspace master REST client
//!
//! This crate reads and updates the current workspace and fetches factories
//! through the Che server API, implementing [`chesync_core::WorkspaceApi`].

mod client;
mod error;

pub use client::CheClient;
pub use error::{Error, Result};
