// The admin API endpoint table.
//
// One variant per logical operation. Paths are relative to the configured
// base URL; query parameters (e.g. `days`) are attached by the caller.

use reqwest::Method;
use strum::{Display, EnumIter};

/// Every operation the dashboard performs against the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Endpoint {
    /// `GET /api/admin/stats` -- aggregate counters.
    Stats,
    /// `GET /api/admin/conversions` -- newest-first conversion records.
    Conversions,
    /// `GET /api/admin/settings` -- current credentials, never the password.
    GetSettings,
    /// `POST /api/admin/settings` -- credentials plus `admin_password`.
    SaveSettings,
    /// `GET /api/admin/analytics/timeseries?days=N`
    Timeseries,
    /// `GET /api/admin/analytics/features`
    FeatureUsage,
    /// `GET /api/admin/analytics/users`
    UserAnalytics,
    /// `GET /api/admin/analytics/errors`
    ErrorTracking,
    /// `GET /api/admin/system/health`
    SystemHealth,
    /// `GET /api/admin/conversions/export` -- CSV body, not JSON.
    ExportConversions,
    /// `GET /health` -- liveness probe.
    Liveness,
}

impl Endpoint {
    /// Path relative to the base URL, without a leading slash.
    pub fn path(self) -> &'static str {
        match self {
            Self::Stats => "api/admin/stats",
            Self::Conversions => "api/admin/conversions",
            Self::GetSettings | Self::SaveSettings => "api/admin/settings",
            Self::Timeseries => "api/admin/analytics/timeseries",
            Self::FeatureUsage => "api/admin/analytics/features",
            Self::UserAnalytics => "api/admin/analytics/users",
            Self::ErrorTracking => "api/admin/analytics/errors",
            Self::SystemHealth => "api/admin/system/health",
            Self::ExportConversions => "api/admin/conversions/export",
            Self::Liveness => "health",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Self::SaveSettings => Method::POST,
            _ => Method::GET,
        }
    }
}
