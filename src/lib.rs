//! corebank library
//!
//! In-memory banking domain model behind three redundant front-ends: a
//! console menu, a chat-command interpreter and an HTTP API. State lives in
//! process memory for the lifetime of one run or one session.

pub mod api;
pub mod chat;
pub mod config;
pub mod domain;
pub mod service;

mod error;

pub use config::Config;
pub use domain::DomainError;
pub use error::{AppError, AppResult};
pub use service::Bank;
