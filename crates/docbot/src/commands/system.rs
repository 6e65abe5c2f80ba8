//! Host health and liveness.

use docbot_core::{Dashboard, Liveness, ResourceData, ResourceKey, SystemHealth};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, Painter, Tone};

use super::util;

/// Usage above 90% is critical, above 75% a warning.
fn usage_tone(percent: f64) -> Tone {
    if percent > 90.0 {
        Tone::Bad
    } else if percent > 75.0 {
        Tone::Pending
    } else {
        Tone::Good
    }
}

fn health_detail(h: &SystemHealth, painter: Painter) -> String {
    let usage = |pct: f64| painter.paint(&util::fmt_pct(pct), usage_tone(pct));
    output::detail_lines(&[
        ("CPU", usage(h.cpu_percent)),
        (
            "Memory",
            format!(
                "{}  ({} / {} MB)",
                usage(h.memory_percent),
                h.memory_used_mb,
                h.memory_total_mb
            ),
        ),
        (
            "Disk",
            format!(
                "{}  ({:.1} / {:.1} GB)",
                usage(h.disk_percent),
                h.disk_used_gb,
                h.disk_total_gb
            ),
        ),
        ("Uptime", humantime::format_duration(h.uptime()).to_string()),
        ("Runtime", h.runtime_version.clone()),
        ("Sessions", h.active_sessions.to_string()),
    ])
}

pub fn render_health(format: &OutputFormat, health: &SystemHealth, painter: Painter) -> String {
    output::render_single(
        format,
        health,
        |h| health_detail(h, painter),
        |h| {
            format!(
                "cpu_percent\t{}\nmemory_percent\t{}\ndisk_percent\t{}\nuptime_seconds\t{}",
                h.cpu_percent, h.memory_percent, h.disk_percent, h.uptime_seconds
            )
        },
    )
}

pub fn render_liveness(format: &OutputFormat, liveness: &Liveness, painter: Painter) -> String {
    output::render_single(
        format,
        liveness,
        |l| {
            let tone = if l.is_healthy() { Tone::Good } else { Tone::Bad };
            format!(
                "{}  {}",
                painter.paint(&l.status, tone),
                painter.paint(&util::fmt_time(&l.timestamp), Tone::Muted)
            )
        },
        |l| l.status.clone(),
    )
}

pub async fn handle_health(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let key = ResourceKey::SystemHealth;
    let data = util::fetch_data(dashboard, key).await?;
    let health = util::expect_payload(key, &data, ResourceData::as_system_health)?;
    let painter = Painter::new(&global.color);
    output::print_output(&render_health(&global.output, health, painter), global.quiet);
    Ok(())
}

/// Exits non-zero when the service answers but reports itself unhealthy.
pub async fn handle_ping(dashboard: &Dashboard, global: &GlobalOpts) -> Result<(), CliError> {
    let key = ResourceKey::Liveness;
    let data = util::fetch_data(dashboard, key).await?;
    let liveness = util::expect_payload(key, &data, ResourceData::as_liveness)?;
    let painter = Painter::new(&global.color);
    output::print_output(&render_liveness(&global.output, liveness, painter), global.quiet);

    if liveness.is_healthy() {
        Ok(())
    } else {
        Err(CliError::ApiError {
            status: 200,
            message: format!("service reports status '{}'", liveness.status),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::ColorMode;

    use super::*;

    #[test]
    fn health_detail_humanizes_uptime() {
        let health = SystemHealth {
            cpu_percent: 12.5,
            memory_percent: 81.0,
            memory_used_mb: 1620,
            memory_total_mb: 2000,
            disk_percent: 40.2,
            disk_used_gb: 20.1,
            disk_total_gb: 50.0,
            uptime_seconds: 90_061,
            runtime_version: "3.11.4".into(),
            active_sessions: 3,
        };
        let out = health_detail(&health, Painter::new(&ColorMode::Never));
        assert!(out.contains("Uptime    1day 1h 1m 1s"));
        assert!(out.contains("Memory    81.0%  (1620 / 2000 MB)"));
        assert!(out.contains("Runtime   3.11.4"));
    }

    #[test]
    fn usage_thresholds() {
        assert!(matches!(usage_tone(50.0), Tone::Good));
        assert!(matches!(usage_tone(80.0), Tone::Pending));
        assert!(matches!(usage_tone(95.0), Tone::Bad));
    }
}
