use std::env;

/// Token-signing configuration.
///
/// `secret` is `None` when `JWT_SECRET` is unset or blank; token issuance
/// and verification fail closed in that case rather than falling back to a
/// hardcoded development secret.
#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: Option<String>,
    pub expiry: i64,
    pub extended_expiry: i64,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET").ok().filter(|s| !s.trim().is_empty()),
            expiry: env::var("JWT_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(86400), // 1 day
            extended_expiry: env::var("JWT_EXTENDED_EXPIRY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(604800), // 7 days
        }
    }

    /// Constructor for tests and tools that should not touch the process
    /// environment.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: Some(secret.into()),
            expiry: 86400,
            extended_expiry: 604800,
        }
    }
}
