//! Conversion history listing.

use docbot_core::{Conversion, ConversionStatus, Dashboard, ResourceData, ResourceKey};
use tabled::Tabled;

use crate::cli::{ConversionsArgs, GlobalOpts, OutputFormat, StatusFilter};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ConversionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Feature")]
    feature: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Took")]
    took: String,
}

fn row(c: &Conversion) -> ConversionRow {
    ConversionRow {
        id: c.id.clone(),
        phone: c.phone_number.clone(),
        time: util::fmt_time(&c.timestamp),
        status: c.status.to_string(),
        feature: c.feature.clone().unwrap_or_else(|| "-".into()),
        size: util::fmt_bytes(c.file_size),
        took: c.processing_time_ms.map_or_else(|| "-".into(), util::fmt_ms),
    }
}

impl From<StatusFilter> for ConversionStatus {
    fn from(f: StatusFilter) -> Self {
        match f {
            StatusFilter::Success => Self::Success,
            StatusFilter::Failed => Self::Failed,
            StatusFilter::Pending => Self::Pending,
        }
    }
}

fn plain(c: &Conversion) -> String {
    format!("{}\t{}\t{}", c.id, c.status, c.timestamp)
}

pub fn render(format: &OutputFormat, conversions: &[Conversion]) -> String {
    output::render_list(format, conversions, row, plain)
}

/// Apply `--status` then `--limit`, keeping the service's order.
fn select(
    all: &[Conversion],
    status: Option<StatusFilter>,
    limit: Option<usize>,
) -> Vec<Conversion> {
    let wanted = status.map(ConversionStatus::from);
    all.iter()
        .filter(|c| wanted.is_none_or(|s| c.status == s))
        .take(limit.unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

pub async fn handle(
    dashboard: &Dashboard,
    args: ConversionsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let key = ResourceKey::Conversions;
    let data = util::fetch_data(dashboard, key).await?;
    let all = util::expect_payload(key, &data, ResourceData::as_conversions)?;
    let shown = select(all, args.status, args.limit);
    output::print_output(&render(&global.output, &shown), global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn conversion(id: &str, status: ConversionStatus) -> Conversion {
        Conversion {
            id: id.into(),
            phone_number: "919876543210".into(),
            timestamp: NaiveDate::from_ymd_opt(2024, 6, 15)
                .and_then(|d| d.and_hms_opt(10, 30, 0))
                .unwrap_or_default(),
            status,
            file_size: 2048,
            feature: Some("pdf_to_word".into()),
            input_type: None,
            output_type: None,
            processing_time_ms: Some(420),
            error_message: None,
            output_file_size: None,
            updated_at: None,
        }
    }

    #[test]
    fn status_filter_then_limit() {
        let all = vec![
            conversion("a", ConversionStatus::Success),
            conversion("b", ConversionStatus::Failed),
            conversion("c", ConversionStatus::Success),
            conversion("d", ConversionStatus::Success),
        ];
        let picked = select(&all, Some(StatusFilter::Success), Some(2));
        let ids: Vec<_> = picked.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);

        assert_eq!(select(&all, None, None).len(), 4);
    }

    #[test]
    fn row_fills_missing_columns_with_dashes() {
        let mut c = conversion("a", ConversionStatus::Pending);
        c.feature = None;
        c.processing_time_ms = None;
        let r = row(&c);
        assert_eq!(r.feature, "-");
        assert_eq!(r.took, "-");
        assert_eq!(r.time, "2024-06-15 10:30:00");
        assert_eq!(r.status, "pending");
    }
}
