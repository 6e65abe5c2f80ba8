//! Reactive data layer between `docbot-api` and dashboard consumers.
//!
//! - **[`Dashboard`]** -- Facade owning the HTTP client for one admin
//!   service, the shared [`Poller`] and the [`ExportFlow`].
//!
//! - **[`Poller`]** -- Keyed cache of remote resources. Subscribers of the
//!   same [`ResourceKey`] share one timer and one in-flight request; stale
//!   responses are discarded by generation stamp, and the last
//!   unsubscribe cancels outstanding work.
//!
//! - **[`ResourceSubscription`]** -- Handle exposing `current()` /
//!   `latest()` / `changed()` and a `Stream` adapter.
//!
//! - **[`SettingsForm`]** -- Load / edit / validate / submit lifecycle for
//!   the messaging credentials.
//!
//! - **[`ExportFlow`]** -- One-at-a-time CSV export with a self-resetting
//!   status.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod poller;
pub mod resource;
pub mod settings;

pub use config::{DashboardConfig, FeedbackWindows, PollIntervals};
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use export::{ExportArtifact, ExportFlow, ExportStatus, export_file_name};
pub use poller::{Poller, ResourceSubscription, ResourceWatchStream};
pub use resource::{ResourceData, ResourceKey, ResourceKind, ResourceState, ResourceStatus};
pub use settings::{
    CredentialField, FieldError, MIN_ADMIN_PASSWORD_LEN, Notice, NoticeLevel, SettingsForm,
    SettingsPhase,
};

// Wire types consumers need alongside the cache.
pub use docbot_api::{
    Conversion, ConversionStatus, CountryCount, Credentials, ErrorTracking, ErrorType,
    FeatureUsage, Liveness, RecentError, SaveSettingsResponse, Stats, SystemHealth,
    TimeseriesPoint, TopUser, UserAnalytics,
};
