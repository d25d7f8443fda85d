use crate::error::RuntimeError;
use rpcload_core::Summary;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

const HEADER: [&str; 11] = [
    "url",
    "method",
    "num_users",
    "num_workers",
    "total_requests",
    "max_response_time",
    "min_response_time",
    "avg_response_time",
    "test_duration_minutes",
    "failed_requests_number",
    "failed_requests_percentage",
];

/// One report line. Latencies are in seconds.
#[derive(Serialize)]
struct Row<'a> {
    url: &'a str,
    method: &'a str,
    num_users: usize,
    num_workers: usize,
    total_requests: u64,
    max_response_time: f64,
    min_response_time: f64,
    avg_response_time: f64,
    test_duration_minutes: f64,
    failed_requests_number: u64,
    failed_requests_percentage: f64,
}

impl<'a> From<&'a Summary> for Row<'a> {
    fn from(summary: &'a Summary) -> Self {
        let stats = &summary.stats;
        Row {
            url: &summary.endpoint,
            method: &summary.method,
            num_users: summary.users,
            num_workers: summary.workers,
            total_requests: stats.total,
            max_response_time: stats.max_latency.as_secs_f64(),
            min_response_time: stats.min_latency.as_secs_f64(),
            avg_response_time: stats.avg_latency.as_secs_f64(),
            test_duration_minutes: summary.duration_minutes(),
            failed_requests_number: stats.failed,
            failed_requests_percentage: stats.failed_pct,
        }
    }
}

/// Write one CSV line per summary to `path`, header first.
///
/// The header is written even if there are no summaries.
pub fn write_report(path: impl AsRef<Path>, summaries: &[Summary]) -> Result<(), RuntimeError> {
    let file = std::fs::File::create(path)?;
    write_rows(file, summaries)
}

fn write_rows<W: Write>(out: W, summaries: &[Summary]) -> Result<(), RuntimeError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(out);

    writer.write_record(HEADER)?;
    for summary in summaries {
        writer.serialize(Row::from(summary))?;
    }
    writer.flush()?;
    Ok(())
}
