//! Issue tracking API for lab computers.
//!
//! Users report problems with one or more computers, lab technicians move
//! issues and individual computers between `pending`, `solved` and
//! `unsolved`, and anyone signed in can comment.
//!
//! ```text
//! request ─► require_auth ─► require_role ─► handler ─► IssueService
//!                 │               │             │
//!                401             403      400 / 404 / 500
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`auth`]: Bearer tokens, roles and the middleware enforcing them
//! - [`issues`]: Issue, computer and comment types
//! - [`service`]: Persistence trait and implementations
//! - [`api`]: HTTP routes and handlers
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod issues;
pub mod metrics;
pub mod service;
pub mod utils;

pub use config::Config;
pub use error::{ApiError, Error, Result, ServiceError};
