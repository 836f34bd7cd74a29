#![forbid(unsafe_code)]

//! Local user registration backed by SQLite.
//!
//! Open a [`UserStore`], [`initialize`](UserStore::initialize) it, then add,
//! authenticate and list users.

pub mod auth;
pub mod config;

pub use auth::{AddOutcome, StoreError, User, UserStore};
pub use config::Config;
