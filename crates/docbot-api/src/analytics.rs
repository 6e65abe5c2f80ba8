// Admin API analytics endpoints

use crate::client::AdminClient;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::types::{ErrorTracking, FeatureUsage, TimeseriesPoint, UserAnalytics};

impl AdminClient {
    /// Per-day conversion counts for the last `days` days, oldest first.
    ///
    /// `GET /api/admin/analytics/timeseries?days=N`
    ///
    /// `days` is passed through unchecked; the server owns the valid range.
    pub async fn get_timeseries(&self, days: u32) -> Result<Vec<TimeseriesPoint>, Error> {
        self.get_with_params(Endpoint::Timeseries, &[("days", days.to_string())])
            .await
    }

    /// `GET /api/admin/analytics/features`
    pub async fn get_feature_usage(&self) -> Result<Vec<FeatureUsage>, Error> {
        self.get(Endpoint::FeatureUsage).await
    }

    /// `GET /api/admin/analytics/users`
    pub async fn get_user_analytics(&self) -> Result<UserAnalytics, Error> {
        self.get(Endpoint::UserAnalytics).await
    }

    /// `GET /api/admin/analytics/errors`
    pub async fn get_error_tracking(&self) -> Result<ErrorTracking, Error> {
        self.get(Endpoint::ErrorTracking).await
    }
}
