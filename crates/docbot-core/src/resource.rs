// ── Cached resources ──
//
// What the poller caches: a key naming one remote resource, the decoded
// payload, and the state record every subscriber observes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use docbot_api::{
    AdminClient, Conversion, ErrorTracking, FeatureUsage, Liveness, Stats, SystemHealth,
    TimeseriesPoint, UserAnalytics,
};
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;

/// Window used by `timeseries` when no day count is given.
pub const DEFAULT_TIMESERIES_DAYS: u32 = 30;

/// Server-side bounds for the timeseries window.
pub const TIMESERIES_DAYS_RANGE: std::ops::RangeInclusive<u32> = 1..=365;

// ── Keys ─────────────────────────────────────────────────────────────

/// Resource family, independent of request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ResourceKind {
    Stats,
    Conversions,
    Timeseries,
    FeatureUsage,
    UserAnalytics,
    ErrorTracking,
    SystemHealth,
    Liveness,
}

/// Identifies one cacheable remote resource, parameters included.
///
/// Two keys are the same cache entry iff they are equal, so
/// `Timeseries { days: 7 }` and `Timeseries { days: 30 }` poll separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    Stats,
    Conversions,
    Timeseries { days: u32 },
    FeatureUsage,
    UserAnalytics,
    ErrorTracking,
    SystemHealth,
    Liveness,
}

impl ResourceKey {
    pub fn kind(self) -> ResourceKind {
        match self {
            Self::Stats => ResourceKind::Stats,
            Self::Conversions => ResourceKind::Conversions,
            Self::Timeseries { .. } => ResourceKind::Timeseries,
            Self::FeatureUsage => ResourceKind::FeatureUsage,
            Self::UserAnalytics => ResourceKind::UserAnalytics,
            Self::ErrorTracking => ResourceKind::ErrorTracking,
            Self::SystemHealth => ResourceKind::SystemHealth,
            Self::Liveness => ResourceKind::Liveness,
        }
    }

    /// Key for `kind` with default parameters.
    pub fn from_kind(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Stats => Self::Stats,
            ResourceKind::Conversions => Self::Conversions,
            ResourceKind::Timeseries => Self::Timeseries {
                days: DEFAULT_TIMESERIES_DAYS,
            },
            ResourceKind::FeatureUsage => Self::FeatureUsage,
            ResourceKind::UserAnalytics => Self::UserAnalytics,
            ResourceKind::ErrorTracking => Self::ErrorTracking,
            ResourceKind::SystemHealth => Self::SystemHealth,
            ResourceKind::Liveness => Self::Liveness,
        }
    }

    /// Issue the single request that backs this key.
    pub(crate) async fn fetch(self, client: &AdminClient) -> Result<ResourceData, docbot_api::Error> {
        Ok(match self {
            Self::Stats => ResourceData::Stats(client.get_stats().await?),
            Self::Conversions => ResourceData::Conversions(client.get_conversions().await?),
            Self::Timeseries { days } => ResourceData::Timeseries(client.get_timeseries(days).await?),
            Self::FeatureUsage => ResourceData::FeatureUsage(client.get_feature_usage().await?),
            Self::UserAnalytics => ResourceData::UserAnalytics(client.get_user_analytics().await?),
            Self::ErrorTracking => ResourceData::ErrorTracking(client.get_error_tracking().await?),
            Self::SystemHealth => ResourceData::SystemHealth(client.get_system_health().await?),
            Self::Liveness => ResourceData::Liveness(client.get_liveness().await?),
        })
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeseries { days } => write!(f, "timeseries:{days}"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Parses `stats`, `timeseries`, `timeseries:14`, ...
impl FromStr for ResourceKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, param) = match s.split_once(':') {
            Some((name, param)) => (name, Some(param)),
            None => (s, None),
        };
        let kind = ResourceKind::from_str(name).map_err(|_| CoreError::Config {
            message: format!("unknown resource '{name}'"),
        })?;

        match (kind, param) {
            (ResourceKind::Timeseries, Some(days)) => {
                let days = days.parse::<u32>().map_err(|_| CoreError::Config {
                    message: format!("invalid day count '{days}'"),
                })?;
                Ok(Self::Timeseries { days })
            }
            (_, None) => Ok(Self::from_kind(kind)),
            (_, Some(_)) => Err(CoreError::Config {
                message: format!("resource '{name}' takes no parameter"),
            }),
        }
    }
}

// ── Payloads ─────────────────────────────────────────────────────────

/// Decoded body of a cached resource.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResourceData {
    Stats(Stats),
    Conversions(Vec<Conversion>),
    Timeseries(Vec<TimeseriesPoint>),
    FeatureUsage(Vec<FeatureUsage>),
    UserAnalytics(UserAnalytics),
    ErrorTracking(ErrorTracking),
    SystemHealth(SystemHealth),
    Liveness(Liveness),
}

impl ResourceData {
    pub fn as_stats(&self) -> Option<&Stats> {
        match self {
            Self::Stats(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_conversions(&self) -> Option<&[Conversion]> {
        match self {
            Self::Conversions(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_timeseries(&self) -> Option<&[TimeseriesPoint]> {
        match self {
            Self::Timeseries(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_feature_usage(&self) -> Option<&[FeatureUsage]> {
        match self {
            Self::FeatureUsage(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_user_analytics(&self) -> Option<&UserAnalytics> {
        match self {
            Self::UserAnalytics(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_error_tracking(&self) -> Option<&ErrorTracking> {
        match self {
            Self::ErrorTracking(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_system_health(&self) -> Option<&SystemHealth> {
        match self {
            Self::SystemHealth(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_liveness(&self) -> Option<&Liveness> {
        match self {
            Self::Liveness(v) => Some(v),
            _ => None,
        }
    }
}

// ── State ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceStatus {
    /// Never fetched.
    Idle,
    Loading,
    Success,
    Error,
}

impl ResourceStatus {
    pub fn is_loading(self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Everything a subscriber knows about one resource.
///
/// Replaced as a whole on every transition, so a reader never sees `data`
/// from one response next to `status` from another.
#[derive(Debug, Clone)]
pub struct ResourceState {
    /// Last successfully decoded payload. Survives later failures.
    pub data: Option<Arc<ResourceData>>,
    pub status: ResourceStatus,
    /// Failure of the most recent completed fetch, cleared on success.
    pub error: Option<CoreError>,
    /// When `data` was received.
    pub last_updated_at: Option<DateTime<Utc>>,
}

impl Default for ResourceState {
    fn default() -> Self {
        Self {
            data: None,
            status: ResourceStatus::Idle,
            error: None,
            last_updated_at: None,
        }
    }
}

impl ResourceState {
    /// `true` when showing data from an earlier success after a failure.
    pub fn is_stale(&self) -> bool {
        self.status == ResourceStatus::Error && self.data.is_some()
    }

    pub(crate) fn loading(&self) -> Self {
        Self {
            status: ResourceStatus::Loading,
            ..self.clone()
        }
    }

    pub(crate) fn succeeded(data: ResourceData) -> Self {
        Self {
            data: Some(Arc::new(data)),
            status: ResourceStatus::Success,
            error: None,
            last_updated_at: Some(Utc::now()),
        }
    }

    pub(crate) fn failed(&self, error: CoreError) -> Self {
        Self {
            status: ResourceStatus::Error,
            error: Some(error),
            ..self.clone()
        }
    }

    /// The state a cancelled load falls back to.
    pub(crate) fn settled(&self) -> Self {
        let status = if self.error.is_some() {
            ResourceStatus::Error
        } else if self.data.is_some() {
            ResourceStatus::Success
        } else {
            ResourceStatus::Idle
        };
        Self {
            status,
            ..self.clone()
        }
    }
}
