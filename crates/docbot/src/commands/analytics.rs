//! Analytics views: time series, feature usage, users, errors.

use docbot_core::{
    Dashboard, ErrorTracking, FeatureUsage, ResourceData, ResourceKey, TimeseriesPoint,
    UserAnalytics,
};
use tabled::Tabled;

use crate::cli::{AnalyticsArgs, AnalyticsCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row definitions ───────────────────────────────────────────

#[derive(Tabled)]
struct TimeseriesRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Total")]
    conversions: u64,
    #[tabled(rename = "OK")]
    successes: u64,
    #[tabled(rename = "Failed")]
    failures: u64,
}

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Count")]
    count: u64,
    #[tabled(rename = "Share")]
    share: String,
}

#[derive(Tabled)]
struct TopUserRow {
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Conversions")]
    count: u64,
    #[tabled(rename = "Last Active")]
    last_active: String,
}

#[derive(Tabled)]
struct CountryRow {
    #[tabled(rename = "Country")]
    country: String,
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Users")]
    count: u64,
}

#[derive(Tabled)]
struct ErrorTypeRow {
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Count")]
    count: u64,
    #[tabled(rename = "Last Seen")]
    last: String,
}

#[derive(Tabled)]
struct RecentErrorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Message")]
    message: String,
}

// ── Renderers ───────────────────────────────────────────────────────

fn timeseries_row(p: &TimeseriesPoint) -> TimeseriesRow {
    TimeseriesRow {
        date: p.date.to_string(),
        conversions: p.conversions,
        successes: p.successes,
        failures: p.failures,
    }
}

pub fn render_timeseries(format: &OutputFormat, points: &[TimeseriesPoint]) -> String {
    output::render_list(format, points, timeseries_row, |p| {
        format!("{}\t{}\t{}\t{}", p.date, p.conversions, p.successes, p.failures)
    })
}

fn feature_row(f: &FeatureUsage) -> FeatureRow {
    FeatureRow {
        feature: f.feature.clone(),
        count: f.count,
        share: util::fmt_pct(f.percentage),
    }
}

pub fn render_features(format: &OutputFormat, usage: &[FeatureUsage]) -> String {
    output::render_list(format, usage, feature_row, |f| format!("{}\t{}", f.feature, f.count))
}

fn users_detail(u: &UserAnalytics) -> String {
    let mut out = output::detail_lines(&[
        ("Unique users", u.total_unique_users.to_string()),
        ("Repeat users", u.repeat_users.to_string()),
        ("New today", u.new_users_today.to_string()),
    ]);

    if !u.top_users.is_empty() {
        let rows: Vec<TopUserRow> = u
            .top_users
            .iter()
            .map(|t| TopUserRow {
                phone: t.phone.clone(),
                count: t.count,
                last_active: util::fmt_time(&t.last_active),
            })
            .collect();
        out.push_str("\n\nTop users\n");
        out.push_str(&output::render_table(&rows));
    }

    if !u.country_distribution.is_empty() {
        let rows: Vec<CountryRow> = u
            .country_distribution
            .iter()
            .map(|c| CountryRow {
                country: c.country.clone(),
                code: c.code.clone(),
                count: c.count,
            })
            .collect();
        out.push_str("\n\nCountries\n");
        out.push_str(&output::render_table(&rows));
    }
    out
}

pub fn render_users(format: &OutputFormat, users: &UserAnalytics) -> String {
    output::render_single(format, users, users_detail, |u| {
        u.top_users
            .iter()
            .map(|t| format!("{}\t{}", t.phone, t.count))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

fn errors_detail(e: &ErrorTracking) -> String {
    let mut out = output::detail_lines(&[
        ("Total errors", e.total_errors.to_string()),
        ("Error rate", util::fmt_pct(e.error_rate)),
        ("Today", e.errors_today.to_string()),
    ]);

    if !e.error_types.is_empty() {
        let rows: Vec<ErrorTypeRow> = e
            .error_types
            .iter()
            .map(|t| ErrorTypeRow {
                kind: t.kind.clone(),
                count: t.count,
                last: util::fmt_time(&t.last_occurred),
            })
            .collect();
        out.push_str("\n\nBy type\n");
        out.push_str(&output::render_table(&rows));
    }

    if !e.recent_errors.is_empty() {
        let rows: Vec<RecentErrorRow> = e
            .recent_errors
            .iter()
            .map(|r| RecentErrorRow {
                id: r.id.clone(),
                time: util::fmt_time(&r.timestamp),
                feature: r.feature.clone(),
                message: r.message.clone(),
            })
            .collect();
        out.push_str("\n\nRecent\n");
        out.push_str(&output::render_table(&rows));
    }
    out
}

pub fn render_errors(format: &OutputFormat, errors: &ErrorTracking) -> String {
    output::render_single(format, errors, errors_detail, |e| {
        e.recent_errors
            .iter()
            .map(|r| format!("{}\t{}\t{}", r.id, r.feature, r.message))
            .collect::<Vec<_>>()
            .join("\n")
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    dashboard: &Dashboard,
    args: AnalyticsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let key = match args.command {
        AnalyticsCommand::Timeseries(d) => ResourceKey::Timeseries { days: d.days },
        AnalyticsCommand::Features => ResourceKey::FeatureUsage,
        AnalyticsCommand::Users => ResourceKey::UserAnalytics,
        AnalyticsCommand::Errors => ResourceKey::ErrorTracking,
    };
    let data = util::fetch_data(dashboard, key).await?;

    let out = match key {
        ResourceKey::Timeseries { .. } => {
            let points = util::expect_payload(key, &data, ResourceData::as_timeseries)?;
            render_timeseries(&global.output, points)
        }
        ResourceKey::FeatureUsage => {
            let usage = util::expect_payload(key, &data, ResourceData::as_feature_usage)?;
            render_features(&global.output, usage)
        }
        ResourceKey::UserAnalytics => {
            let users = util::expect_payload(key, &data, ResourceData::as_user_analytics)?;
            render_users(&global.output, users)
        }
        _ => {
            let errors = util::expect_payload(key, &data, ResourceData::as_error_tracking)?;
            render_errors(&global.output, errors)
        }
    };
    output::print_output(&out, global.quiet);
    Ok(())
}
