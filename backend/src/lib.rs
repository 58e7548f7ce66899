use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Router;
use tokio::sync::RwLock;

pub mod ai;
pub mod config;
pub mod error;
pub mod store;
pub mod telemetry;

mod routes;

use ai::{AiClient, OfflineAi};
use store::RoomRecord;

#[derive(Clone)]
pub struct AppState {
    pub(crate) rooms: Arc<RwLock<HashMap<String, RoomRecord>>>,
    pub(crate) ai: Arc<dyn AiClient>,
    persist_path: Option<PathBuf>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(OfflineAi))
    }
}

impl AppState {
    pub fn new(ai: Arc<dyn AiClient>) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            ai,
            persist_path: None,
        }
    }

    /// Loads the snapshot at `path` if one exists; every later change is
    /// written back to it.
    pub async fn with_persistence(path: impl Into<PathBuf>, ai: Arc<dyn AiClient>) -> Self {
        let path = path.into();
        let mut state = Self::new(ai);
        state.persist_path = Some(path.clone());
        match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<HashMap<String, RoomRecord>>(&bytes) {
                Ok(saved) => {
                    tracing::info!(rooms = saved.len(), path = %path.display(), "snapshot loaded");
                    *state.rooms.write().await = saved;
                }
                Err(err) => {
                    tracing::warn!(%err, path = %path.display(), "ignoring unreadable snapshot")
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(%err, path = %path.display(), "snapshot not read"),
        }
        state
    }

    pub(crate) async fn persist(&self) {
        if let Some(path) = &self.persist_path {
            let snapshot = {
                let rooms = self.rooms.read().await;
                rooms.clone()
            };
            match serde_json::to_vec_pretty(&snapshot) {
                Ok(json) => {
                    if let Err(err) = tokio::fs::write(path, json).await {
                        tracing::warn!(%err, path = %path.display(), "persist failed");
                    }
                }
                Err(err) => tracing::warn!(%err, "snapshot not serializable"),
            }
        }
    }
}

pub fn app(state: AppState) -> Router {
    routes::router()
        .layer(telemetry::http_trace_layer())
        .with_state(state)
}

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
