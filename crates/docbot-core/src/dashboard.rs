// ── Dashboard facade ──
//
// Owns the HTTP client and the shared poller for one admin service, and
// vends settings forms and the export flow built on the same client.

use std::sync::Arc;

use docbot_api::{AdminClient, TransportConfig};
use tracing::debug;

use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::export::ExportFlow;
use crate::poller::{Poller, ResourceSubscription};
use crate::resource::{ResourceKey, ResourceState};
use crate::settings::SettingsForm;

/// Entry point for dashboard consumers. Cheaply cloneable; clones share
/// the cache and the export flow.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    client: AdminClient,
    poller: Poller,
    export: ExportFlow,
}

impl Dashboard {
    /// Build the client and cache. Does not contact the service.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default().with_timeout(config.timeout);
        let client = AdminClient::new(config.base_url.as_str(), &transport)?;
        debug!(base_url = %client.base_url(), "dashboard client ready");

        let poller = Poller::new(client.clone(), config.intervals);
        let export = ExportFlow::new(client.clone(), config.export_dir.clone(), config.feedback);

        Ok(Self {
            inner: Arc::new(DashboardInner {
                config,
                client,
                poller,
                export,
            }),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn client(&self) -> &AdminClient {
        &self.inner.client
    }

    pub fn poller(&self) -> &Poller {
        &self.inner.poller
    }

    pub fn export(&self) -> &ExportFlow {
        &self.inner.export
    }

    /// A fresh, unloaded settings form.
    pub fn settings_form(&self) -> SettingsForm {
        SettingsForm::new(self.inner.client.clone(), self.inner.config.feedback)
    }

    pub fn subscribe(&self, key: ResourceKey) -> ResourceSubscription {
        self.inner.poller.subscribe(key)
    }

    pub async fn fetch(&self, key: ResourceKey) -> ResourceState {
        self.inner.poller.fetch(key).await
    }

    /// Stop background polling.
    pub fn shutdown(&self) {
        self.inner.poller.shutdown();
    }
}
