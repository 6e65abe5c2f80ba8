// ── Settings form lifecycle ──
//
// Load credentials, edit them locally, validate, then submit together with
// the admin password. The phase is published on a watch channel so a UI
// can render "saving..." without polling the form.

use std::fmt;
use std::time::{Duration, Instant};

use docbot_api::{AdminClient, Credentials, SaveSettingsResponse};
use secrecy::{ExposeSecret, SecretString};
use strum::{Display, EnumIter};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::FeedbackWindows;
use crate::error::CoreError;

/// Shortest admin password the form accepts.
pub const MIN_ADMIN_PASSWORD_LEN: usize = 6;

// ── Fields ───────────────────────────────────────────────────────────

/// Editable form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum CredentialField {
    BusinessAccountId,
    PhoneNumberId,
    AccessToken,
    WebhookVerifyToken,
    AdminPassword,
}

impl CredentialField {
    pub fn label(self) -> &'static str {
        match self {
            Self::BusinessAccountId => "Business Account ID",
            Self::PhoneNumberId => "Phone Number ID",
            Self::AccessToken => "Access Token",
            Self::WebhookVerifyToken => "Webhook Verify Token",
            Self::AdminPassword => "Admin Password",
        }
    }
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: CredentialField,
    pub message: String,
}

impl FieldError {
    pub fn new(field: CredentialField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check the credentials and password without touching the network.
pub fn validate(credentials: &Credentials, admin_password: &SecretString) -> Result<(), CoreError> {
    let required = [
        (CredentialField::BusinessAccountId, &credentials.business_account_id),
        (CredentialField::PhoneNumberId, &credentials.phone_number_id),
        (CredentialField::AccessToken, &credentials.access_token),
        (CredentialField::WebhookVerifyToken, &credentials.webhook_verify_token),
    ];

    let mut errors: Vec<FieldError> = required
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(field, _)| FieldError::new(field, "is required"))
        .collect();

    let password = admin_password.expose_secret();
    if password.is_empty() {
        errors.push(FieldError::new(CredentialField::AdminPassword, "is required"));
    } else if password.chars().count() < MIN_ADMIN_PASSWORD_LEN {
        errors.push(FieldError::new(
            CredentialField::AdminPassword,
            format!("must be at least {MIN_ADMIN_PASSWORD_LEN} characters"),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Validation { errors })
    }
}

// ── Phase & notices ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum SettingsPhase {
    /// `load()` has not completed yet.
    Unloaded,
    /// Fields reflect the server (or are blank after a failed load).
    Loaded,
    /// Local edits not yet saved.
    Editing,
    /// A save request is outstanding.
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A user-visible outcome message that expires on its own.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    shown_at: Instant,
    ttl: Duration,
}

impl Notice {
    fn new(level: NoticeLevel, message: String, windows: FeedbackWindows) -> Self {
        Self {
            level,
            message,
            shown_at: Instant::now(),
            ttl: windows.window(level == NoticeLevel::Success),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.shown_at.elapsed() >= self.ttl
    }
}

// ── Form ─────────────────────────────────────────────────────────────

/// Client-side state of the settings screen.
///
/// The admin password is kept only until a successful save and is never
/// part of what `load()` returns.
pub struct SettingsForm {
    client: AdminClient,
    feedback: FeedbackWindows,
    credentials: Credentials,
    admin_password: SecretString,
    phase: watch::Sender<SettingsPhase>,
    load_error: Option<CoreError>,
    field_errors: Vec<FieldError>,
    notice: Option<Notice>,
}

impl SettingsForm {
    pub fn new(client: AdminClient, feedback: FeedbackWindows) -> Self {
        let (phase, _) = watch::channel(SettingsPhase::Unloaded);
        Self {
            client,
            feedback,
            credentials: Credentials::default(),
            admin_password: empty_secret(),
            phase,
            load_error: None,
            field_errors: Vec::new(),
            notice: None,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn phase(&self) -> SettingsPhase {
        *self.phase.borrow()
    }

    pub fn watch_phase(&self) -> watch::Receiver<SettingsPhase> {
        self.phase.subscribe()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn has_admin_password(&self) -> bool {
        !self.admin_password.expose_secret().is_empty()
    }

    /// Why the last `load()` failed, if it did.
    pub fn load_error(&self) -> Option<&CoreError> {
        self.load_error.as_ref()
    }

    /// Fields rejected by the last `submit()`.
    pub fn field_errors(&self) -> &[FieldError] {
        &self.field_errors
    }

    pub fn field_error(&self, field: CredentialField) -> Option<&FieldError> {
        self.field_errors.iter().find(|e| e.field == field)
    }

    /// Outcome of the last save, until it expires.
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref().filter(|n| !n.is_expired())
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Fetch the stored credentials.
    ///
    /// On failure the fields are left blank, the error is kept in
    /// [`load_error()`](Self::load_error) and the form stays usable.
    pub async fn load(&mut self) -> Result<&Credentials, CoreError> {
        let result = self.client.get_settings().await;
        self.admin_password = empty_secret();
        self.field_errors.clear();

        match result {
            Ok(credentials) => {
                debug!(masked = credentials.has_masked_token(), "settings loaded");
                self.credentials = credentials;
                self.load_error = None;
                self.phase.send_replace(SettingsPhase::Loaded);
                Ok(&self.credentials)
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "failed to load settings");
                self.credentials = Credentials::default();
                self.load_error = Some(err.clone());
                self.phase.send_replace(SettingsPhase::Loaded);
                Err(err)
            }
        }
    }

    /// Replace the value of one field locally.
    pub fn set_field(&mut self, field: CredentialField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CredentialField::BusinessAccountId => self.credentials.business_account_id = value,
            CredentialField::PhoneNumberId => self.credentials.phone_number_id = value,
            CredentialField::AccessToken => self.credentials.access_token = value,
            CredentialField::WebhookVerifyToken => self.credentials.webhook_verify_token = value,
            CredentialField::AdminPassword => self.admin_password = SecretString::from(value),
        }
        self.field_errors.retain(|e| e.field != field);
        self.phase.send_replace(SettingsPhase::Editing);
    }

    pub fn set_admin_password(&mut self, password: SecretString) {
        self.admin_password = password;
        self.field_errors
            .retain(|e| e.field != CredentialField::AdminPassword);
        self.phase.send_replace(SettingsPhase::Editing);
    }

    /// Validate locally without submitting.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate(&self.credentials, &self.admin_password)
    }

    /// Validate, then send the credentials with the admin password.
    ///
    /// Invalid input issues no request. Success clears the password and
    /// returns to `Loaded`; failure keeps every field for a retry and
    /// returns to `Editing`.
    pub async fn submit(&mut self) -> Result<SaveSettingsResponse, CoreError> {
        if let Err(err) = self.validate() {
            debug!(error = %err, "settings rejected locally");
            self.field_errors = err.field_errors().to_vec();
            self.phase.send_replace(SettingsPhase::Editing);
            return Err(err);
        }
        self.field_errors.clear();
        self.phase.send_replace(SettingsPhase::Submitting);

        match self
            .client
            .save_settings(&self.credentials, &self.admin_password)
            .await
        {
            Ok(response) => {
                info!("settings saved");
                self.admin_password = empty_secret();
                self.notice = Some(Notice::new(
                    NoticeLevel::Success,
                    response.message.clone(),
                    self.feedback,
                ));
                self.phase.send_replace(SettingsPhase::Loaded);
                Ok(response)
            }
            Err(e) => {
                let err = CoreError::from(e);
                warn!(error = %err, "failed to save settings");
                self.notice = Some(Notice::new(NoticeLevel::Error, err.to_string(), self.feedback));
                self.phase.send_replace(SettingsPhase::Editing);
                Err(err)
            }
        }
    }
}

impl fmt::Debug for SettingsForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsForm")
            .field("phase", &self.phase())
            .field("credentials", &self.credentials)
            .field("has_admin_password", &self.has_admin_password())
            .field("load_error", &self.load_error)
            .finish_non_exhaustive()
    }
}

fn empty_secret() -> SecretString {
    SecretString::from(String::new())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filled() -> Credentials {
        Credentials {
            business_account_id: "123".into(),
            phone_number_id: "456".into(),
            access_token: "EAAtoken".into(),
            webhook_verify_token: "hook".into(),
        }
    }

    fn secret(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    #[test]
    fn complete_input_passes() {
        assert!(validate(&filled(), &secret("secret")).is_ok());
    }

    #[test]
    fn short_password_is_rejected() {
        let err = validate(&filled(), &secret("abcde")).unwrap_err();
        assert_eq!(err.field_errors().len(), 1);
        assert_eq!(err.field_errors()[0].field, CredentialField::AdminPassword);
    }

    #[test]
    fn empty_fields_are_each_reported() {
        let err = validate(&Credentials::default(), &secret("")).unwrap_err();
        let fields: Vec<CredentialField> = err.field_errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec![
                CredentialField::BusinessAccountId,
                CredentialField::PhoneNumberId,
                CredentialField::AccessToken,
                CredentialField::WebhookVerifyToken,
                CredentialField::AdminPassword,
            ]
        );
    }

    #[test]
    fn whitespace_values_count_as_present() {
        let creds = Credentials {
            webhook_verify_token: " ".into(),
            ..filled()
        };
        assert!(validate(&creds, &secret("secret")).is_ok());
    }

    #[test]
    fn password_length_counts_characters() {
        assert!(validate(&filled(), &secret("pässwö")).is_ok());
    }

    #[test]
    fn notice_expires_after_its_window() {
        let windows = FeedbackWindows {
            success: Duration::ZERO,
            failure: Duration::from_secs(60),
        };
        assert!(Notice::new(NoticeLevel::Success, "ok".into(), windows).is_expired());
        assert!(!Notice::new(NoticeLevel::Error, "no".into(), windows).is_expired());
    }
}
