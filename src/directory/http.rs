/*!
 * HTTP Directory
 * Application registry backed by the shell backend's `/api/apps` endpoint
 */

use super::{AppDescriptor, AppDirectory};
use crate::core::errors::DirectoryError;
use crate::core::limits::DIRECTORY_APPS_PATH;
use crate::core::types::SandboxResult;
use futures::future::BoxFuture;
use log::{debug, info, warn};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;

/// Remote directory with a local cache for synchronous lookups
#[derive(Clone)]
pub struct HttpAppDirectory {
    client: reqwest::Client,
    endpoint: String,
    cache: Arc<RwLock<Vec<AppDescriptor>>>,
}

impl HttpAppDirectory {
    pub fn new(base_url: &str, timeout: Duration) -> SandboxResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("app-sandbox-kernel/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DirectoryError::RequestFailed(format!("client setup: {}", e).into()))?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), DIRECTORY_APPS_PATH),
            cache: Arc::new(RwLock::new(Vec::new())),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Number of descriptors from the last successful fetch
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    async fn fetch(&self) -> SandboxResult<Vec<AppDescriptor>> {
        debug!("Fetching installed applications from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| DirectoryError::RequestFailed(e.to_string().into()))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Directory returned HTTP {} for {}", status.as_u16(), self.endpoint);
            let reason = format!("HTTP {}", status.as_u16());
            return Err(DirectoryError::RequestFailed(reason.into()).into());
        }

        let apps: Vec<AppDescriptor> = response
            .json()
            .await
            .map_err(|e| DirectoryError::DecodeFailed(e.to_string().into()))?;

        info!("Directory lists {} installed applications", apps.len());
        *self.cache.write() = apps.clone();
        Ok(apps)
    }
}

impl AppDirectory for HttpAppDirectory {
    fn lookup(&self, id: &str) -> Option<AppDescriptor> {
        self.cache.read().iter().find(|a| a.id == id).cloned()
    }

    fn fetch_installed(&self) -> BoxFuture<'_, SandboxResult<Vec<AppDescriptor>>> {
        Box::pin(self.fetch())
    }
}
