//! CSV export of the conversion log.

use std::io::IsTerminal;
use std::time::Duration;

use docbot_core::{Dashboard, ExportFlow};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::cli::{ExportArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Painter, Tone};

use super::util;

#[derive(Serialize)]
struct ExportSummary {
    path: String,
    bytes: u64,
}

fn spinner(quiet: bool) -> ProgressBar {
    if quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Exporting conversions...");
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub async fn handle(
    dashboard: &Dashboard,
    args: ExportArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let flow = match args.dir {
        Some(dir) => {
            ExportFlow::new(dashboard.client().clone(), dir, dashboard.config().feedback)
        }
        None => dashboard.export().clone(),
    };
    tracing::debug!(dir = %flow.dir().display(), "starting export");

    let pb = spinner(global.quiet);
    let result = flow.run().await;
    pb.finish_and_clear();

    let Some(artifact) = result? else {
        return Err(CliError::Validation {
            field: "export".into(),
            reason: "an export is already in progress".into(),
        });
    };

    let summary = ExportSummary {
        path: artifact.path.display().to_string(),
        bytes: artifact.bytes,
    };
    let painter = Painter::new(&global.color);
    let out = output::render_single(
        &global.output,
        &summary,
        |s| {
            format!(
                "{} {} ({})",
                painter.paint("Exported", Tone::Good),
                s.path,
                util::fmt_bytes(s.bytes)
            )
        },
        |s| s.path.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
