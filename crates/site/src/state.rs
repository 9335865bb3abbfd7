//! Application state shared across handlers.

use std::sync::Arc;

use rjukan_stays_core::BookingStore;

use crate::config::SiteConfig;
use crate::services::BookingService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the store, the booking service and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    store: Arc<dyn BookingStore>,
    bookings: BookingService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `store` - Storage backend opened from `config.store`
    #[must_use]
    pub fn new(config: SiteConfig, store: Arc<dyn BookingStore>) -> Self {
        let bookings = BookingService::new(Arc::clone(&store));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                bookings,
            }),
        }
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn store(&self) -> &dyn BookingStore {
        self.inner.store.as_ref()
    }

    /// Get a reference to the booking service.
    #[must_use]
    pub fn bookings(&self) -> &BookingService {
        &self.inner.bookings
    }
}
