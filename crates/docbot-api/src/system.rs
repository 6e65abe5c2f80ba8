// Admin API system endpoints
//
// Host resource usage and the unauthenticated liveness probe.

use crate::client::AdminClient;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::types::{Liveness, SystemHealth};

impl AdminClient {
    /// CPU, memory and disk usage of the service host.
    ///
    /// `GET /api/admin/system/health`
    pub async fn get_system_health(&self) -> Result<SystemHealth, Error> {
        self.get(Endpoint::SystemHealth).await
    }

    /// `GET /health`
    pub async fn get_liveness(&self) -> Result<Liveness, Error> {
        self.get(Endpoint::Liveness).await
    }
}
