//! Middleware modules for request processing.
//!
//! This module contains middleware and extractors for handling cross-cutting
//! concerns like authentication, authorization, and error shaping.
//!
//! # Modules
//!
//! - [`auth`]: JWT authentication extractor
//! - [`role`]: Role-based route guards
//! - [`error_handler`]: Uniform error envelope and error logging
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. `AuthUser` extractor validates the JWT and extracts claims
//! 3. Role guards check if the user holds one of the allowed roles
//! 4. Handler executes if all checks pass

pub mod auth;
pub mod error_handler;
pub mod role;
