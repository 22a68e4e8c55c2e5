use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use shred_core::day::DayBoundary;
use shred_core::models::Food;

/// Parse a date argument relative to `today` (which already honors the
/// day rollover). Accepts YYYY-MM-DD or today/yesterday/tomorrow.
pub(crate) fn parse_date(date_str: Option<String>, today: NaiveDate) -> Result<NaiveDate> {
    match date_str {
        None => Ok(today),
        Some(s) => match s.as_str() {
            "today" => Ok(today),
            "yesterday" => Ok(today - Duration::days(1)),
            "tomorrow" => Ok(today + Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

pub(crate) fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .with_context(|| format!("Invalid time '{s}'. Use HH:MM"))
}

/// Timestamp for a new log entry.
///
/// An explicit time is placed inside `date`'s window, so with a 06:00
/// rollover `02:00` lands on the following calendar morning. Without one,
/// entries for the current day are stamped `now` and other days get the
/// middle of that day.
pub(crate) fn resolve_logged_at(
    date: NaiveDate,
    time: Option<NaiveTime>,
    now: NaiveDateTime,
    boundary: DayBoundary,
) -> NaiveDateTime {
    match time {
        Some(t) => {
            let ts = date.and_time(t);
            if ts < boundary.start_of(date) {
                ts + Duration::days(1)
            } else {
                ts
            }
        }
        None if boundary.day_of(now) == date => now,
        None => boundary.start_of(date) + Duration::hours(12),
    }
}

pub(crate) fn print_food_table(foods: &[&Food]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Serving")]
        serving: String,
        #[tabled(rename = "Calories")]
        calories: i64,
        #[tabled(rename = "Protein")]
        protein: String,
        #[tabled(rename = "Carbs")]
        carbs: String,
        #[tabled(rename = "Fat")]
        fat: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .map(|f| FoodRow {
            id: f.id,
            name: truncate(&f.name, 35),
            serving: truncate(&f.serving_size, 20),
            calories: f.calories,
            protein: format!("{:.1}g", f.protein),
            carbs: format!("{:.1}g", f.carbs),
            fat: format!("{:.1}g", f.fat),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..7)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        d.and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn test_parse_date_none() {
        let today = date(2025, 4, 10);
        assert_eq!(parse_date(None, today).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = date(2025, 4, 10);
        assert_eq!(parse_date(Some("today".to_string()), today).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string()), today).unwrap(),
            date(2025, 4, 9)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string()), today).unwrap(),
            date(2025, 4, 11)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let parsed = parse_date(Some("2024-01-15".to_string()), date(2025, 4, 10)).unwrap();
        assert_eq!(parsed, date(2024, 1, 15));
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string()), date(2025, 4, 10)).is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time("08:30").unwrap(),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap()
        );
        assert!(parse_time("8am").is_err());
    }

    #[test]
    fn test_resolve_logged_at() {
        let today = date(2025, 4, 10);
        let now = at(today, 19, 45);
        let b = DayBoundary::MIDNIGHT;

        assert_eq!(resolve_logged_at(today, None, now, b), now);
        assert_eq!(
            resolve_logged_at(date(2025, 4, 8), None, now, b),
            at(date(2025, 4, 8), 12, 0)
        );
        let t = NaiveTime::from_hms_opt(7, 15, 0).unwrap();
        assert_eq!(resolve_logged_at(today, Some(t), now, b), at(today, 7, 15));
    }

    #[test]
    fn test_resolve_logged_at_with_rollover() {
        let b = DayBoundary::new(6).unwrap();
        // 02:00 on the 11th still counts as the 10th
        let now = at(date(2025, 4, 11), 2, 0);
        assert_eq!(resolve_logged_at(date(2025, 4, 10), None, now, b), now);
        assert_eq!(
            resolve_logged_at(date(2025, 4, 9), None, now, b),
            at(date(2025, 4, 9), 18, 0)
        );

        // Small hours belong to the end of the chosen day
        let early = NaiveTime::from_hms_opt(2, 0, 0).unwrap();
        let ts = resolve_logged_at(date(2025, 4, 10), Some(early), now, b);
        assert_eq!(ts, at(date(2025, 4, 11), 2, 0));
        assert_eq!(b.day_of(ts), date(2025, 4, 10));

        let morning = NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let ts = resolve_logged_at(date(2025, 4, 10), Some(morning), now, b);
        assert_eq!(ts, at(date(2025, 4, 10), 6, 0));
        assert_eq!(b.day_of(ts), date(2025, 4, 10));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
    }

    #[test]
    fn test_truncate_utf8() {
        // Should not panic on multi-byte characters
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
        assert_eq!(truncate("Müsli", 10), "Müsli");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
        assert_eq!(no_neg_zero(-3.0), -3.0);
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("Entry 4 not found"), r#"{"error":"Entry 4 not found"}"#);
    }
}
