use anyhow::Result;
use chrono::NaiveDate;

use shred_core::ShredService;
use shred_core::models::TIMESTAMP_FORMAT;
use shred_core::nutrition::CalorieStatus;
use shred_core::report::Dashboard;
use shred_core::session::Session;
use shred_core::units::format_weight;

use super::helpers::no_neg_zero;

fn status_label(status: CalorieStatus) -> &'static str {
    match status {
        CalorieStatus::Under => "under target",
        CalorieStatus::Near => "close to target",
        CalorieStatus::Over => "over target",
    }
}

fn print_dashboard(dash: &Dashboard) {
    let date = dash.date;
    let name = &dash.user_name;
    println!("=== {date} ({name}) ===\n");

    let p = &dash.progress;
    let pct = p.ratio * 100.0;
    println!(
        "  CALORIES: {} / {} kcal ({pct:.0}%) [{}: {}]",
        p.consumed,
        p.target,
        p.status.color(),
        status_label(p.status)
    );
    println!("  REMAINING: {} kcal\n", p.remaining);

    if dash.entries.is_empty() {
        println!("  No entries for {date}\n");
    }

    for meal in &dash.meals {
        let label = meal.meal_type.as_str().to_uppercase();
        println!("  {label} ({} kcal)", meal.calories);
        for e in dash.entries.iter().filter(|e| e.meal_type == meal.meal_type) {
            let id = e.id;
            let food = &e.food.name;
            let qty = e.quantity;
            let serving = &e.food.serving_size;
            let cal = e.total_calories();
            let (protein, carbs, fat) = (e.protein(), e.carbs(), e.fat());
            println!(
                "    [{id}] {food} x{qty} ({serving}) | {cal} kcal | P:{protein:.1}g C:{carbs:.1}g F:{fat:.1}g"
            );
        }
        println!();
    }

    let t = &dash.totals;
    let m = &dash.macros;
    println!(
        "  TOTAL: {} kcal | P:{:.1}g C:{:.1}g F:{:.1}g",
        t.calories,
        no_neg_zero(t.protein),
        no_neg_zero(t.carbs),
        no_neg_zero(t.fat)
    );
    println!(
        "  MACROS: P:{:.0}% C:{:.0}% F:{:.0}%",
        m.protein, m.carbs, m.fat
    );

    let weight = format_weight(dash.latest_weight.weight_kg, dash.units);
    match dash.latest_weight.logged_at {
        Some(ts) => println!("  WEIGHT: {weight} (logged {})", ts.format(TIMESTAMP_FORMAT)),
        None => println!("  WEIGHT: {weight} (from profile)"),
    }
}

pub(crate) fn cmd_summary(
    svc: &ShredService,
    session: &Session,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let dash = svc.dashboard(session, date)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dash)?);
    } else {
        print_dashboard(&dash);
    }

    Ok(())
}
