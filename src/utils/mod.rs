//! Utility modules for the StockBay API.
//!
//! This module contains shared utilities used throughout the application:
//!
//! - [`errors`]: Application error taxonomy and the uniform error envelope
//! - [`jwt`]: Session token creation and verification
//! - [`pagination`]: Request pagination utilities
//! - [`password`]: Password hashing and verification
//! - [`serde`]: Custom serde serialization/deserialization helpers

pub mod errors;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod serde;
