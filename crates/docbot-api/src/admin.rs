// Admin API dashboard endpoints
//
// Counters, the conversion log, integration settings and the CSV export.

use bytes::Bytes;
use secrecy::SecretString;
use tracing::debug;

use crate::client::AdminClient;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::types::{Conversion, Credentials, SaveSettingsRequest, SaveSettingsResponse, Stats};

impl AdminClient {
    /// Aggregate conversion counters.
    ///
    /// `GET /api/admin/stats`
    pub async fn get_stats(&self) -> Result<Stats, Error> {
        self.get(Endpoint::Stats).await
    }

    /// Recent conversions, newest first (the server caps the list at 50).
    ///
    /// `GET /api/admin/conversions`
    pub async fn get_conversions(&self) -> Result<Vec<Conversion>, Error> {
        self.get(Endpoint::Conversions).await
    }

    /// Current integration credentials. The server masks `access_token`
    /// and never returns the admin password.
    ///
    /// `GET /api/admin/settings`
    pub async fn get_settings(&self) -> Result<Credentials, Error> {
        self.get(Endpoint::GetSettings).await
    }

    /// Replace the integration credentials.
    ///
    /// `POST /api/admin/settings` with the credentials plus `admin_password`.
    pub async fn save_settings(
        &self,
        credentials: &Credentials,
        admin_password: &SecretString,
    ) -> Result<SaveSettingsResponse, Error> {
        debug!(?credentials, "saving settings");
        let body = SaveSettingsRequest {
            credentials,
            admin_password,
        };
        self.send_json(Endpoint::SaveSettings, &body).await
    }

    /// Download every conversion as CSV.
    ///
    /// `GET /api/admin/conversions/export`
    pub async fn export_conversions(&self) -> Result<Bytes, Error> {
        self.get_bytes(Endpoint::ExportConversions).await
    }
}
