use std::io::Write;

use anyhow::Result;

use crate::report::ProgressReport;

/// Write a progress series as `date,<metric>_<unit>` CSV, oldest day first.
pub fn write_progress_csv(report: &ProgressReport, writer: impl Write) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    let value_header = format!("{}_{}", report.metric, report.unit());
    csv.write_record(["date", value_header.as_str()])?;

    for point in &report.points {
        csv.write_record([
            point.date.format("%Y-%m-%d").to_string(),
            format!("{:.1}", point.value),
        ])?;
    }

    csv.flush()?;
    Ok(())
}
