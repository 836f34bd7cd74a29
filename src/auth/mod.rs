//! User registration module.
//!
//! Provides:
//! - User registration with username/email/password, unique by username
//! - Credential checks by exact username + password match
//! - Listing of registered users
//! - SQLite-backed persistent storage
//!
//! ## Design Decisions
//! - The store is an explicit handle; callers own its lifetime and the
//!   connection closes when it is dropped.
//! - A taken username is an ordinary outcome (`AddOutcome::RejectedDuplicate`),
//!   not an error.
//! - Passwords are stored and compared as given. There is no hashing layer.

pub mod error;
pub mod store;

pub use error::{Result, StoreError};
pub use store::{AddOutcome, User, UserStore};
