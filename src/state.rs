use sqlx::PgPool;
use std::time::Duration;
use stockbay_cache::{CacheConfig, MemoryCache};

use crate::config::cors::CorsConfig;
use crate::config::database::init_db_pool;
use crate::config::jwt::JwtConfig;
use crate::config::runtime::RuntimeMode;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub runtime: RuntimeMode,
    pub cache: MemoryCache,
    pub cache_config: CacheConfig,
}

pub async fn init_app_state() -> AppState {
    let cache_config = CacheConfig::from_env();
    AppState {
        db: init_db_pool().await,
        jwt_config: JwtConfig::from_env(),
        cors_config: CorsConfig::from_env(),
        runtime: RuntimeMode::from_env(),
        cache: MemoryCache::new(Duration::from_secs(cache_config.default_ttl_seconds)),
        cache_config,
    }
}
