//! Live polling of one resource.

use chrono::Local;
use docbot_core::{Dashboard, ResourceKey, ResourceState, ResourceStatus};

use crate::cli::{GlobalOpts, WatchArgs, WatchResource};
use crate::error::CliError;
use crate::output::{self, Painter, Tone};

use super::render_data;

fn key_for(resource: WatchResource, days: u32) -> ResourceKey {
    match resource {
        WatchResource::Stats => ResourceKey::Stats,
        WatchResource::Conversions => ResourceKey::Conversions,
        WatchResource::Timeseries => ResourceKey::Timeseries { days },
        WatchResource::Features => ResourceKey::FeatureUsage,
        WatchResource::Users => ResourceKey::UserAnalytics,
        WatchResource::Errors => ResourceKey::ErrorTracking,
        WatchResource::Health => ResourceKey::SystemHealth,
        WatchResource::Liveness => ResourceKey::Liveness,
    }
}

fn header(key: ResourceKey, state: &ResourceState, painter: Painter) -> String {
    let at = state
        .last_updated_at
        .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_default();
    let mut line = painter.heading(&format!("── {key} @ {at}"));
    if state.is_stale() {
        line.push(' ');
        line.push_str(&painter.paint("(stale)", Tone::Pending));
    }
    line
}

/// Print one settled state. Returns `false` for transitional states.
fn report(key: ResourceKey, state: &ResourceState, global: &GlobalOpts, painter: Painter) -> bool {
    match state.status {
        ResourceStatus::Idle | ResourceStatus::Loading => false,
        ResourceStatus::Success => {
            if let Some(ref data) = state.data {
                if !global.quiet {
                    eprintln!("{}", header(key, state, painter));
                }
                output::print_output(&render_data(&global.output, data, painter), global.quiet);
            }
            true
        }
        ResourceStatus::Error => {
            if let Some(ref err) = state.error {
                eprintln!("{} {err}", painter.paint("error:", Tone::Bad));
            }
            true
        }
    }
}

pub async fn handle(
    dashboard: &Dashboard,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let key = key_for(args.resource, args.days);
    let period = args
        .interval
        .unwrap_or_else(|| dashboard.config().intervals.for_kind(key.kind()));
    let painter = Painter::new(&global.color);
    tracing::info!(%key, period = %humantime::format_duration(period), "watching");

    let mut subscription = dashboard.poller().subscribe_with_interval(key, period);
    let mut seen = 0usize;

    if report(key, subscription.current(), global, painter) {
        seen += 1;
    }

    while args.count.is_none_or(|n| seen < n) {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => break,
            state = subscription.changed() => {
                let Some(state) = state else { break };
                if report(key, &state, global, painter) {
                    seen += 1;
                }
            }
        }
    }

    tracing::debug!(%key, updates = seen, "watch finished");
    Ok(())
}
