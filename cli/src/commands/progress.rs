use anyhow::Result;
use std::io;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use shred_core::ShredService;
use shred_core::export::write_progress_csv;
use shred_core::report::ProgressReport;
use shred_core::series::{Aggregate, Metric, TimeRange};
use shred_core::session::Session;

fn print_statistics(report: &ProgressReport) {
    let stats = &report.statistics;
    let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| report.format_value(v));

    println!("  Average: {}", fmt(stats.average));
    println!("  Max:     {}", fmt(stats.max));
    match stats.aggregate {
        Some(Aggregate::Total(total)) => println!("  Total:   {}", report.format_value(total)),
        Some(Aggregate::Change(delta)) => {
            let sign = if delta > 0.0 { "+" } else { "" };
            println!("  Change:  {sign}{}", report.format_value(delta));
        }
        None => {}
    }
}

pub(crate) fn cmd_progress(
    svc: &ShredService,
    session: &Session,
    metric: Metric,
    range: TimeRange,
    csv: bool,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct PointRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let report = svc.progress(session, metric, range)?;

    if csv {
        write_progress_csv(&report, io::stdout().lock())?;
        return Ok(());
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if report.points.is_empty() {
        eprintln!(
            "No {} data in the last {} days",
            report.metric,
            report.range.days()
        );
        process::exit(2);
    }

    println!(
        "{} ({}), last {} days\n",
        report.metric.label(),
        report.unit(),
        report.range.days()
    );

    let rows: Vec<PointRow> = report
        .points
        .iter()
        .map(|p| PointRow {
            date: p.date.format("%Y-%m-%d").to_string(),
            value: report.format_value(p.value),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}\n");
    print_statistics(&report);

    Ok(())
}
