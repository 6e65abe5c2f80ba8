//! Command dispatch: bridges CLI args -> dashboard reads -> output formatting.

pub mod analytics;
pub mod config_cmd;
pub mod conversions;
pub mod export;
pub mod settings;
pub mod stats;
pub mod system;
pub mod util;
pub mod watch;

use docbot_core::{Dashboard, ResourceData};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::Painter;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    dashboard: &Dashboard,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Stats => stats::handle(dashboard, global).await,
        Command::Conversions(args) => conversions::handle(dashboard, args, global).await,
        Command::Analytics(args) => analytics::handle(dashboard, args, global).await,
        Command::Health => system::handle_health(dashboard, global).await,
        Command::Ping => system::handle_ping(dashboard, global).await,
        Command::Settings(args) => settings::handle(dashboard, args, global).await,
        Command::Export(args) => export::handle(dashboard, args, global).await,
        Command::Watch(args) => watch::handle(dashboard, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled without a service connection".into(),
        }),
    }
}

/// Render any cached payload with its command's renderer.
pub fn render_data(format: &OutputFormat, data: &ResourceData, painter: Painter) -> String {
    match data {
        ResourceData::Stats(s) => stats::render(format, s),
        ResourceData::Conversions(c) => conversions::render(format, c),
        ResourceData::Timeseries(t) => analytics::render_timeseries(format, t),
        ResourceData::FeatureUsage(f) => analytics::render_features(format, f),
        ResourceData::UserAnalytics(u) => analytics::render_users(format, u),
        ResourceData::ErrorTracking(e) => analytics::render_errors(format, e),
        ResourceData::SystemHealth(h) => system::render_health(format, h, painter),
        ResourceData::Liveness(l) => system::render_liveness(format, l, painter),
    }
}
