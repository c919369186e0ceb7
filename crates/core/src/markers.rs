use crate::backend::StoreBackend;
use crate::domain::store::StoreMarker;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Store markers for one session. Fetched at most once, then shared read-only.
///
/// A failed fetch is cached as an empty list, which the map renders as its loading
/// placeholder for the rest of the session.
pub struct MarkerCache {
    backend: Arc<dyn StoreBackend>,
    markers: OnceCell<Arc<[StoreMarker]>>,
}

impl MarkerCache {
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self {
            backend,
            markers: OnceCell::new(),
        }
    }

    pub async fn markers(&self) -> Arc<[StoreMarker]> {
        self.markers
            .get_or_init(|| async {
                match self.backend.list_stores().await {
                    Ok(markers) => {
                        tracing::info!(count = markers.len(), "store markers loaded");
                        Arc::from(markers)
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "store list unavailable; map stays in placeholder");
                        Arc::from(Vec::new())
                    }
                }
            })
            .await
            .clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.markers.initialized()
    }
}
