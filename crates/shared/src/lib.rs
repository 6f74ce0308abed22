//! Shared types, errors, and configuration for Folio.
//!
//! This crate provides common types used across all other crates:
//! - `Money` amounts in whole CFA francs
//! - Typed IDs for type-safe entity references
//! - Roles and the explicit `ActorContext` passed to ledger operations
//! - JWT validation for bearer tokens
//! - Application-wide error types
//! - Configuration management

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::{ActorContext, Claims, Role};
pub use config::{AppConfig, LedgerConfig, RunMode};
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::Money;
