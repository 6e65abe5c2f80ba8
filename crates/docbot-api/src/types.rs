// Admin API request and response types
//
// Shapes match the JSON the admin service emits. Timestamps are ISO-8601
// without an offset (server-local time), so they decode as naive values.

use std::fmt;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Stats ────────────────────────────────────────────────────────────

/// Aggregate counters from `GET /api/admin/stats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub total_conversions: u64,
    pub today_conversions: u64,
    /// Percentage in `0.0..=100.0`, one decimal.
    pub success_rate: f64,
    pub pending: u64,
    pub active_users: u64,
    pub avg_processing_time_ms: u64,
    /// Most used successful feature, `"—"` when there is none.
    pub top_feature: String,
    pub total_bandwidth_mb: f64,
}

// ── Conversions ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionStatus {
    Success,
    Failed,
    Pending,
}

impl ConversionStatus {
    /// `true` once the backend will no longer update the record.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One historical conversion from `GET /api/admin/conversions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversion {
    pub id: String,
    pub phone_number: String,
    pub timestamp: NaiveDateTime,
    pub status: ConversionStatus,
    /// Input size in bytes.
    pub file_size: u64,
    #[serde(default)]
    pub feature: Option<String>,
    #[serde(default)]
    pub input_type: Option<String>,
    #[serde(default)]
    pub output_type: Option<String>,
    #[serde(default)]
    pub processing_time_ms: Option<u64>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub output_file_size: Option<u64>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Conversion {
    /// Output size divided by input size, when both are known and non-zero.
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub fn size_ratio(&self) -> Option<f64> {
        let output = self.output_file_size?;
        if self.file_size == 0 {
            return None;
        }
        Some(output as f64 / self.file_size as f64)
    }
}

// ── Settings ─────────────────────────────────────────────────────────

/// Messaging-integration credentials held by the server.
///
/// The server omits fields it has never stored, so every field defaults
/// to empty. The password used to authorise a save is deliberately not a
/// field here -- see [`SaveSettingsRequest`].
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(rename = "whatsapp_business_account_id", default)]
    pub business_account_id: String,
    #[serde(default)]
    pub phone_number_id: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub webhook_verify_token: String,
}

impl Credentials {
    /// `true` when `access_token` is the server's masked rendering
    /// (`first10...last4` or `***`) rather than a usable token.
    pub fn has_masked_token(&self) -> bool {
        self.access_token == "***" || self.access_token.contains("...")
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("business_account_id", &self.business_account_id)
            .field("phone_number_id", &self.phone_number_id)
            .field("access_token", &"[REDACTED]")
            .field("webhook_verify_token", &"[REDACTED]")
            .finish()
    }
}

/// Body of `POST /api/admin/settings`.
#[derive(Serialize)]
pub struct SaveSettingsRequest<'a> {
    #[serde(flatten)]
    pub credentials: &'a Credentials,
    #[serde(serialize_with = "serialize_secret")]
    pub admin_password: &'a SecretString,
}

fn serialize_secret<S: Serializer>(secret: &&SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}

/// Response of a successful settings save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveSettingsResponse {
    pub status: String,
    pub message: String,
}

// ── Analytics ────────────────────────────────────────────────────────

/// One day of `GET /api/admin/analytics/timeseries`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeseriesPoint {
    pub date: NaiveDate,
    pub conversions: u64,
    pub successes: u64,
    pub failures: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureUsage {
    pub feature: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopUser {
    /// Masked by the server (`+919****1234`).
    pub phone: String,
    pub count: u64,
    pub last_active: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryCount {
    pub country: String,
    /// ISO 3166 alpha-2, `"XX"` for unmatched prefixes.
    pub code: String,
    pub count: u64,
}

/// `GET /api/admin/analytics/users`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnalytics {
    pub total_unique_users: u64,
    pub repeat_users: u64,
    pub new_users_today: u64,
    /// At most ten entries, busiest first.
    pub top_users: Vec<TopUser>,
    pub country_distribution: Vec<CountryCount>,
}

/// Failures logged without a message are grouped under this type.
pub const UNKNOWN_ERROR_TYPE: &str = "Unknown error";
/// Shown for a recent failure logged without a message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorType {
    /// The failure message; `null` on the wire becomes [`UNKNOWN_ERROR_TYPE`].
    #[serde(
        rename = "type",
        default = "unknown_error_type",
        deserialize_with = "error_type_or_unknown"
    )]
    pub kind: String,
    pub count: u64,
    pub last_occurred: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentError {
    pub id: String,
    pub timestamp: NaiveDateTime,
    pub feature: String,
    #[serde(default = "unknown_error_message", deserialize_with = "error_message_or_unknown")]
    pub message: String,
}

fn unknown_error_type() -> String {
    UNKNOWN_ERROR_TYPE.to_owned()
}

fn unknown_error_message() -> String {
    UNKNOWN_ERROR_MESSAGE.to_owned()
}

fn error_type_or_unknown<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_error_type))
}

fn error_message_or_unknown<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(unknown_error_message))
}

/// `GET /api/admin/analytics/errors`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorTracking {
    pub total_errors: u64,
    pub error_rate: f64,
    pub errors_today: u64,
    pub error_types: Vec<ErrorType>,
    pub recent_errors: Vec<RecentError>,
}

// ── System ───────────────────────────────────────────────────────────

/// `GET /api/admin/system/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub memory_used_mb: u64,
    pub memory_total_mb: u64,
    pub disk_percent: f64,
    pub disk_used_gb: f64,
    pub disk_total_gb: f64,
    pub uptime_seconds: u64,
    #[serde(rename = "python_version")]
    pub runtime_version: String,
    pub active_sessions: u64,
}

impl SystemHealth {
    pub fn uptime(&self) -> Duration {
        Duration::from_secs(self.uptime_seconds)
    }
}

/// `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liveness {
    pub status: String,
    pub timestamp: NaiveDateTime,
}

impl Liveness {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

// ── Errors ───────────────────────────────────────────────────────────

/// FastAPI error body: `{"detail": "..."}`.
///
/// Request-validation failures (422) carry a list under `detail`; those
/// fail to decode here and the caller falls back to the status text.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn conversion_decodes_with_optional_fields_missing() {
        let raw = json!({
            "id": "c-1",
            "phone_number": "919876543210",
            "timestamp": "2024-06-15T10:30:00.123456",
            "status": "pending",
            "file_size": 2048
        });
        let conversion: Conversion = serde_json::from_value(raw).unwrap();
        assert_eq!(conversion.status, ConversionStatus::Pending);
        assert!(conversion.feature.is_none());
        assert!(conversion.size_ratio().is_none());
        assert!(!conversion.status.is_terminal());
    }

    #[test]
    fn conversion_rejects_unknown_status() {
        let raw = json!({
            "id": "c-1",
            "phone_number": "1",
            "timestamp": "2024-06-15T10:30:00",
            "status": "exploded",
            "file_size": 1
        });
        assert!(serde_json::from_value::<Conversion>(raw).is_err());
    }

    #[test]
    fn size_ratio_uses_output_over_input() {
        let raw = json!({
            "id": "c-2",
            "phone_number": "1",
            "timestamp": "2024-06-15T10:30:00",
            "status": "success",
            "file_size": 1000,
            "output_file_size": 250,
            "error_message": null
        });
        let conversion: Conversion = serde_json::from_value(raw).unwrap();
        assert_eq!(conversion.size_ratio(), Some(0.25));
    }

    #[test]
    fn empty_settings_object_decodes_to_blank_credentials() {
        let creds: Credentials = serde_json::from_value(json!({})).unwrap();
        assert_eq!(creds, Credentials::default());
    }

    #[test]
    fn save_request_flattens_credentials_and_exposes_password() {
        let creds = Credentials {
            business_account_id: "123".into(),
            phone_number_id: "456".into(),
            access_token: "EAA...".into(),
            webhook_verify_token: "tok".into(),
        };
        let password = SecretString::from("secret1".to_string());
        let body = serde_json::to_value(SaveSettingsRequest {
            credentials: &creds,
            admin_password: &password,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "whatsapp_business_account_id": "123",
                "phone_number_id": "456",
                "access_token": "EAA...",
                "webhook_verify_token": "tok",
                "admin_password": "secret1"
            })
        );
    }

    #[test]
    fn masked_token_detection() {
        let mut creds = Credentials {
            access_token: "EAAB123456...wxyz".into(),
            ..Credentials::default()
        };
        assert!(creds.has_masked_token());
        creds.access_token = "***".into();
        assert!(creds.has_masked_token());
        creds.access_token = "EAAB1234567890".into();
        assert!(!creds.has_masked_token());
    }

    #[test]
    fn credentials_debug_redacts_secrets() {
        let creds = Credentials {
            access_token: "EAA-very-secret".into(),
            webhook_verify_token: "hook-secret".into(),
            ..Credentials::default()
        };
        let debug = format!("{creds:?}");
        assert!(!debug.contains("very-secret"));
        assert!(!debug.contains("hook-secret"));
    }

    #[test]
    fn system_health_maps_runtime_version() {
        let raw = json!({
            "cpu_percent": 12.5,
            "memory_percent": 40,
            "memory_used_mb": 1024,
            "memory_total_mb": 4096,
            "disk_percent": 55.1,
            "disk_used_gb": 20.3,
            "disk_total_gb": 64,
            "uptime_seconds": 3600,
            "python_version": "3.12.1",
            "active_sessions": 3
        });
        let health: SystemHealth = serde_json::from_value(raw).unwrap();
        assert_eq!(health.runtime_version, "3.12.1");
        assert_eq!(health.uptime(), Duration::from_secs(3600));
    }
}
