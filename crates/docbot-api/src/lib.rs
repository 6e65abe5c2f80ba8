// docbot-api: Async Rust client for the DocBot admin HTTP API

pub mod admin;
pub mod analytics;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod system;
pub mod transport;
pub mod types;

pub use client::AdminClient;
pub use endpoint::Endpoint;
pub use error::Error;
pub use transport::TransportConfig;
pub use types::{
    Conversion, ConversionStatus, CountryCount, Credentials, ErrorTracking, ErrorType,
    FeatureUsage, Liveness, RecentError, SaveSettingsResponse, Stats, SystemHealth,
    TimeseriesPoint, TopUser, UserAnalytics,
};
