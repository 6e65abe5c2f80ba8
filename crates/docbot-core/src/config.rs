// ── Runtime dashboard configuration ──
//
// Describes where the admin service lives and how often each resource is
// refreshed. Never touches disk: the CLI builds a `DashboardConfig` from
// its profile and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::resource::ResourceKind;

/// Configuration for one dashboard session against one admin service.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Service base URL (e.g., `http://localhost:8000`).
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    pub intervals: PollIntervals,
    pub feedback: FeedbackWindows,
    /// Directory that receives exported CSV files.
    pub export_dir: PathBuf,
}

impl DashboardConfig {
    /// Defaults for everything except the service location.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            intervals: PollIntervals::default(),
            feedback: FeedbackWindows::default(),
            export_dir: PathBuf::from("."),
        }
    }
}

/// Refresh period per resource kind. A zero period fetches once per
/// subscription and never again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub stats: Duration,
    pub conversions: Duration,
    pub timeseries: Duration,
    pub feature_usage: Duration,
    pub user_analytics: Duration,
    pub error_tracking: Duration,
    pub system_health: Duration,
    pub liveness: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            stats: Duration::from_secs(30),
            conversions: Duration::from_secs(10),
            timeseries: Duration::from_secs(60),
            feature_usage: Duration::from_secs(60),
            user_analytics: Duration::from_secs(60),
            error_tracking: Duration::from_secs(30),
            system_health: Duration::from_secs(10),
            liveness: Duration::from_secs(30),
        }
    }
}

impl PollIntervals {
    pub fn for_kind(&self, kind: ResourceKind) -> Duration {
        match kind {
            ResourceKind::Stats => self.stats,
            ResourceKind::Conversions => self.conversions,
            ResourceKind::Timeseries => self.timeseries,
            ResourceKind::FeatureUsage => self.feature_usage,
            ResourceKind::UserAnalytics => self.user_analytics,
            ResourceKind::ErrorTracking => self.error_tracking,
            ResourceKind::SystemHealth => self.system_health,
            ResourceKind::Liveness => self.liveness,
        }
    }
}

/// How long user-visible outcome messages stay up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackWindows {
    pub success: Duration,
    pub failure: Duration,
}

impl Default for FeedbackWindows {
    fn default() -> Self {
        Self {
            success: Duration::from_secs(3),
            failure: Duration::from_secs(5),
        }
    }
}

impl FeedbackWindows {
    pub fn window(&self, succeeded: bool) -> Duration {
        if succeeded { self.success } else { self.failure }
    }
}
