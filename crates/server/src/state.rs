//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::cache::OrderCache;
use crate::config::Config;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// two store handles and configuration. Store lifecycles (connect at
/// startup, drop at shutdown) belong to `main`, not to the components that
/// borrow these handles.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    pool: PgPool,
    cache: OrderCache,
}

impl AppState {
    /// Create a new application state over explicit store handles.
    #[must_use]
    pub fn new(config: Config, pool: PgPool, cache: OrderCache) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                cache,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the order cache handle.
    #[must_use]
    pub fn cache(&self) -> &OrderCache {
        &self.inner.cache
    }
}
