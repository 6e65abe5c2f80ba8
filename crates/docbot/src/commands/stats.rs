//! Aggregate statistics.

use docbot_core::{Dashboard, ResourceData, ResourceKey, Stats};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(s: &Stats) -> String {
    output::detail_lines(&[
        ("Total conversions", s.total_conversions.to_string()),
        ("Today", s.today_conversions.to_string()),
        ("Success rate", util::fmt_pct(s.success_rate)),
        ("Pending", s.pending.to_string()),
        ("Active users", s.active_users.to_string()),
        ("Avg processing", util::fmt_ms(s.avg_processing_time_ms)),
        ("Top feature", s.top_feature.clone()),
        ("Bandwidth", format!("{:.2} MB", s.total_bandwidth_mb)),
    ])
}

fn plain(s: &Stats) -> String {
    [
        format!("total_conversions\t{}", s.total_conversions),
        format!("today_conversions\t{}", s.today_conversions),
        format!("success_rate\t{}", s.success_rate),
        format!("pending\t{}", s.pending),
        format!("active_users\t{}", s.active_users),
        format!("avg_processing_time_ms\t{}", s.avg_processing_time_ms),
        format!("top_feature\t{}", s.top_feature),
        format!("total_bandwidth_mb\t{}", s.total_bandwidth_mb),
    ]
    .join("\n")
}

pub fn render(format: &OutputFormat, stats: &Stats) -> String {
    output::render_single(format, stats, detail, plain)
}

pub async fn handle(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let key = ResourceKey::Stats;
    let data = util::fetch_data(dashboard, key).await?;
    let stats = util::expect_payload(key, &data, ResourceData::as_stats)?;
    output::print_output(&render(&global.output, stats), global.quiet);
    Ok(())
}
