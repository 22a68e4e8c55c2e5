use anyhow::Result;
use chrono::NaiveDate;
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use shred_core::ShredService;
use shred_core::models::TIMESTAMP_FORMAT;
use shred_core::series::TimeRange;
use shred_core::session::Session;
use shred_core::units::{display_weight, format_weight, weight_to_canonical, weight_unit};

use super::helpers::{json_error, resolve_logged_at};

/// `value` is in the profile's unit (kg or lb).
pub(crate) fn cmd_weight_log(
    svc: &ShredService,
    session: &Session,
    value: f64,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let units = session.units();
    let weight_kg = weight_to_canonical(value, units);
    let logged_at = resolve_logged_at(date, None, session.now, session.boundary);
    let entry = svc.log_weight(session, weight_kg, logged_at)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "Logged {} for {} [id: {}]",
            format_weight(entry.weight_kg, units),
            session.boundary.day_of(entry.logged_at),
            entry.id
        );
    }

    Ok(())
}

pub(crate) fn cmd_weight_history(
    svc: &ShredService,
    session: &Session,
    range: TimeRange,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct WeightRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Logged")]
        logged_at: String,
        #[tabled(rename = "Weight")]
        weight: String,
    }

    let entries = svc.weight_history(session, range)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        eprintln!("No weight entries found. Use `shred weight log` to record your weight.");
    } else {
        let units = session.units();
        let unit = weight_unit(units);
        let rows: Vec<WeightRow> = entries
            .iter()
            .map(|e| WeightRow {
                id: e.id,
                logged_at: e.logged_at.format(TIMESTAMP_FORMAT).to_string(),
                weight: format!("{:.1} {unit}", display_weight(e.weight_kg, units)),
            })
            .collect();

        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
            .to_string();
        println!("{table}");
    }

    Ok(())
}

pub(crate) fn cmd_weight_delete(svc: &ShredService, id: i64, json: bool) -> Result<()> {
    if svc.delete_weight_log(id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": id }));
        } else {
            println!("Deleted weight entry {id}");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Weight entry {id} not found")));
        } else {
            eprintln!("Weight entry {id} not found");
        }
        process::exit(2);
    }
}
