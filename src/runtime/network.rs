/*!
 * Network Handles
 * Per-application socket handles with connectivity state
 */

use crate::core::types::{AppId, SocketId};
use ahash::RandomState;
use dashmap::DashMap;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Connection lifecycle of a network handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// One network handle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocketInfo {
    pub id: SocketId,
    pub app: AppId,
    pub url: String,
    pub state: ConnectionState,
}

/// Network footprint of one application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkStatus {
    /// Handles not yet closed
    pub handles: usize,
    /// At least one handle is open
    pub connected: bool,
}

/// Shared socket table
#[derive(Clone)]
pub struct SocketTable {
    sockets: Arc<DashMap<SocketId, SocketInfo, RandomState>>,
    next_id: Arc<AtomicU64>,
}

impl SocketTable {
    pub fn new() -> Self {
        Self {
            sockets: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn open(&self, app: &AppId, url: &str) -> SocketId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sockets.insert(
            id,
            SocketInfo {
                id,
                app: app.clone(),
                url: url.to_string(),
                state: ConnectionState::Connecting,
            },
        );
        debug!("{} opened socket {} to {}", app, id, url);
        id
    }

    pub fn set_state(&self, id: SocketId, state: ConnectionState) -> bool {
        match self.sockets.get_mut(&id) {
            Some(mut info) => {
                info.state = state;
                true
            }
            None => false,
        }
    }

    /// Close and forget a handle
    pub fn close(&self, id: SocketId) -> bool {
        self.sockets.remove(&id).is_some()
    }

    pub fn handles(&self, app: &AppId) -> Vec<SocketInfo> {
        self.sockets
            .iter()
            .filter(|e| &e.app == app)
            .map(|e| e.value().clone())
            .collect()
    }

    pub fn status(&self, app: &AppId) -> NetworkStatus {
        let mut status = NetworkStatus::default();
        for entry in self.sockets.iter().filter(|e| &e.app == app) {
            if entry.state != ConnectionState::Closed {
                status.handles += 1;
            }
            if entry.state == ConnectionState::Open {
                status.connected = true;
            }
        }
        status
    }

    /// Close every handle owned by an application
    pub fn close_app(&self, app: &AppId) -> usize {
        let ids: Vec<SocketId> = self
            .sockets
            .iter()
            .filter(|e| &e.app == app)
            .map(|e| *e.key())
            .collect();
        ids.into_iter().filter(|id| self.close(*id)).count()
    }

    pub fn has_handles(&self, app: &AppId) -> bool {
        self.sockets.iter().any(|e| &e.app == app)
    }
}

impl Default for SocketTable {
    fn default() -> Self {
        Self::new()
    }
}
