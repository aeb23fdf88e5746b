use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::instrument;

use crate::error::InfrastructureError;
use crate::ports::sheet_store::{SheetConnector, SheetStore};

pub const DEFAULT_CLIENT_TTL: Duration = Duration::from_secs(60 * 60);

struct CachedClient {
    store: Arc<dyn SheetStore>,
    connected_at: Instant,
}

/// Owns the sheet client for the process. The connector runs at most once
/// per TTL window; the lock only guards construction, never appends.
pub struct SheetClientCache {
    connector: Arc<dyn SheetConnector>,
    ttl: Duration,
    client: RwLock<Option<CachedClient>>,
}

impl std::fmt::Debug for SheetClientCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SheetClientCache {{ connector: {:?}, ttl: {:?} }}",
            self.connector, self.ttl
        )
    }
}

impl SheetClientCache {
    pub fn new(connector: Arc<dyn SheetConnector>, ttl: Duration) -> Self {
        Self {
            connector,
            ttl,
            client: RwLock::new(None),
        }
    }

    pub fn with_default_ttl(connector: Arc<dyn SheetConnector>) -> Self {
        Self::new(connector, DEFAULT_CLIENT_TTL)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn fresh(&self, cached: &Option<CachedClient>) -> Option<Arc<dyn SheetStore>> {
        cached
            .as_ref()
            .filter(|cached| cached.connected_at.elapsed() < self.ttl)
            .map(|cached| Arc::clone(&cached.store))
    }

    /// Returns the cached client, connecting first if there is none or it
    /// has outlived the TTL.
    #[instrument]
    pub async fn get(&self) -> error_stack::Result<Arc<dyn SheetStore>, InfrastructureError> {
        let cached = {
            // -- LOCK READ --
            let guard = self.client.read().await;
            self.fresh(&guard)
            // -- END LOCK READ --
        };
        if let Some(store) = cached {
            tracing::trace!("Sheet client cache hit");
            return Ok(store);
        }

        // -- LOCK WRITE --
        let mut guard = self.client.write().await;
        // Another caller may have connected while we waited for the lock.
        if let Some(store) = self.fresh(&guard) {
            return Ok(store);
        }

        tracing::info!("Connecting sheet client");
        let store = self.connector.connect().await?;
        *guard = Some(CachedClient {
            store: Arc::clone(&store),
            connected_at: Instant::now(),
        });
        Ok(store)
        // -- END LOCK WRITE --
    }

    /// Connects eagerly so construction failures surface at start-up.
    pub async fn warm(&self) -> error_stack::Result<(), InfrastructureError> {
        self.get().await.map(|_| ())
    }

    pub async fn invalidate(&self) {
        self.client.write().await.take();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use error_stack::report;

    use super::*;
    use crate::domain::schema::SheetRow;

    #[derive(Debug)]
    struct NullStore;

    #[async_trait::async_trait]
    impl SheetStore for NullStore {
        fn target(&self) -> String {
            "null".to_string()
        }

        async fn append_row(&self, _row: &SheetRow) -> error_stack::Result<(), InfrastructureError> {
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct CountingConnector {
        connects: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl SheetConnector for CountingConnector {
        async fn connect(&self) -> error_stack::Result<Arc<dyn SheetStore>, InfrastructureError> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(report!(InfrastructureError::WorksheetNotFound(
                    "Requests".to_string()
                )));
            }
            Ok(Arc::new(NullStore))
        }
    }

    #[tokio::test]
    async fn test_connects_once_within_ttl() {
        let connector = Arc::new(CountingConnector::default());
        let cache = SheetClientCache::with_default_ttl(connector.clone());

        for _ in 0..5 {
            cache.get().await.expect("connect should succeed");
        }
        assert_eq!(connector.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reconnects_after_ttl() {
        let connector = Arc::new(CountingConnector::default());
        let cache = SheetClientCache::new(connector.clone(), Duration::ZERO);

        cache.get().await.expect("connect should succeed");
        cache.get().await.expect("connect should succeed");
        assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_reconnect() {
        let connector = Arc::new(CountingConnector::default());
        let cache = SheetClientCache::with_default_ttl(connector.clone());

        cache.warm().await.expect("connect should succeed");
        cache.invalidate().await;
        cache.get().await.expect("connect should succeed");
        assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_connect_is_not_cached() {
        let connector = Arc::new(CountingConnector {
            fail: true,
            ..Default::default()
        });
        let cache = SheetClientCache::with_default_ttl(connector.clone());

        let report = cache.warm().await.expect_err("connect should fail");
        assert_eq!(
            report.current_context(),
            &InfrastructureError::WorksheetNotFound("Requests".to_string())
        );
        assert!(cache.get().await.is_err());
        assert_eq!(connector.connects.load(Ordering::SeqCst), 2);
    }
}
