use anyhow::Result;
use chrono::NaiveDate;
use std::process;

use shred_core::ShredService;
use shred_core::models::MealType;
use shred_core::session::Session;

use super::helpers::{json_error, parse_time, resolve_logged_at};

pub(crate) struct LogArgs {
    pub food_id: i64,
    pub quantity: f64,
    pub meal: MealType,
    pub date: NaiveDate,
    pub time: Option<String>,
}

pub(crate) fn cmd_log(
    svc: &ShredService,
    session: &Session,
    args: LogArgs,
    json: bool,
) -> Result<()> {
    let time = args.time.as_deref().map(parse_time).transpose()?;
    let logged_at = resolve_logged_at(args.date, time, session.now, session.boundary);
    let entry = svc.log_food(session, args.food_id, args.quantity, args.meal, logged_at)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let name = &entry.food.name;
        let qty = entry.quantity;
        let cal = entry.total_calories();
        let meal = entry.meal_type;
        let day = session.boundary.day_of(entry.logged_at);
        println!("Logged {qty} x {name} ({cal} kcal) to {meal} on {day} [id: {}]", entry.id);
    }

    Ok(())
}

pub(crate) fn cmd_log_delete(svc: &ShredService, entry_id: i64, json: bool) -> Result<()> {
    if svc.delete_food_log(entry_id)? {
        if json {
            println!("{}", serde_json::json!({ "deleted": entry_id }));
        } else {
            println!("Deleted entry {entry_id}");
        }
        Ok(())
    } else {
        if json {
            println!("{}", json_error(&format!("Entry {entry_id} not found")));
        } else {
            eprintln!("Entry {entry_id} not found");
        }
        process::exit(2);
    }
}
