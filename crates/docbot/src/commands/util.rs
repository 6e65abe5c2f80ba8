//! Shared helpers for command handlers.

use std::sync::Arc;

use bytesize::ByteSize;
use chrono::NaiveDateTime;
use docbot_core::{CoreError, Dashboard, ResourceData, ResourceKey};

use crate::error::CliError;

/// One-shot read through the cache: the payload, or the fetch's error.
pub async fn fetch_data(
    dashboard: &Dashboard,
    key: ResourceKey,
) -> Result<Arc<ResourceData>, CliError> {
    let state = dashboard.fetch(key).await;
    if let Some(err) = state.error {
        return Err(err.into());
    }
    state.data.ok_or_else(|| {
        CliError::from(CoreError::Config {
            message: format!("request for {key} was cancelled"),
        })
    })
}

/// Narrow a payload to the variant `key` produces.
pub fn expect_payload<'a, T: ?Sized>(
    key: ResourceKey,
    data: &'a ResourceData,
    pick: impl Fn(&'a ResourceData) -> Option<&'a T>,
) -> Result<&'a T, CliError> {
    pick(data).ok_or_else(|| CliError::Decode {
        message: format!("payload does not match resource {key}"),
    })
}

pub fn fmt_time(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub fn fmt_bytes(bytes: u64) -> String {
    ByteSize::b(bytes).to_string()
}

pub fn fmt_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{ms} ms")
    } else {
        humantime::format_duration(std::time::Duration::from_millis(ms)).to_string()
    }
}

pub fn fmt_pct(value: f64) -> String {
    format!("{value:.1}%")
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_durations_stay_in_milliseconds() {
        assert_eq!(fmt_ms(850), "850 ms");
        assert_eq!(fmt_ms(2500), "2s 500ms");
    }

    #[test]
    fn percentages_keep_one_decimal() {
        assert_eq!(fmt_pct(97.26), "97.3%");
        assert_eq!(fmt_pct(100.0), "100.0%");
    }
}
