use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info};
use uuid::Uuid;

use crate::day::DateRange;
use crate::error::ShredError;
use crate::models::{
    Food, FoodLog, NewFood, NewFoodLog, NewUser, NewWeightLog, TIMESTAMP_FORMAT, User, WeightLog,
};
use crate::store::NutritionStore;

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            debug!("migrating schema to version 1");
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS users (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    weight_kg REAL NOT NULL,
                    height_cm REAL NOT NULL,
                    target_calories INTEGER NOT NULL CHECK (target_calories > 0),
                    unit_system TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS foods (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    name TEXT NOT NULL,
                    calories INTEGER NOT NULL,
                    protein REAL NOT NULL,
                    carbs REAL NOT NULL,
                    fat REAL NOT NULL,
                    serving_size TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS food_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    user_id INTEGER NOT NULL REFERENCES users(id),
                    food_id INTEGER NOT NULL REFERENCES foods(id),
                    quantity REAL NOT NULL,
                    meal_type TEXT NOT NULL,
                    logged_at TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE TABLE IF NOT EXISTS weight_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    uuid TEXT NOT NULL UNIQUE,
                    user_id INTEGER NOT NULL REFERENCES users(id),
                    weight_kg REAL NOT NULL,
                    logged_at TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_foods_name ON foods(name);
                CREATE INDEX IF NOT EXISTS idx_food_logs_user_logged ON food_logs(user_id, logged_at);
                CREATE INDEX IF NOT EXISTS idx_weight_logs_user_logged ON weight_logs(user_id, logged_at);

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Row mapping helpers ---

    fn parse_column<T>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T>
    where
        T: FromStr<Err = anyhow::Error>,
    {
        let text: String = row.get(idx)?;
        text.parse().map_err(|e: anyhow::Error| {
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
        })
    }

    fn timestamp_column(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
        let text: String = row.get(idx)?;
        NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    }

    fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            uuid: row.get(1)?,
            name: row.get(2)?,
            weight_kg: row.get(3)?,
            height_cm: row.get(4)?,
            target_calories: row.get(5)?,
            unit_system: Self::parse_column(row, 6)?,
            created_at: row.get(7)?,
        })
    }

    fn food_from_row(row: &rusqlite::Row) -> rusqlite::Result<Food> {
        Ok(Food {
            id: row.get(0)?,
            uuid: row.get(1)?,
            name: row.get(2)?,
            calories: row.get(3)?,
            protein: row.get(4)?,
            carbs: row.get(5)?,
            fat: row.get(6)?,
            serving_size: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    // Expects columns:
    // 0: fl.id, 1: fl.uuid, 2: fl.user_id, 3: fl.quantity, 4: fl.meal_type,
    // 5: fl.logged_at, 6: fl.created_at, 7..=15: the joined food as in food_from_row
    fn food_log_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodLog> {
        Ok(FoodLog {
            id: row.get(0)?,
            uuid: row.get(1)?,
            user_id: row.get(2)?,
            quantity: row.get(3)?,
            meal_type: Self::parse_column(row, 4)?,
            logged_at: Self::timestamp_column(row, 5)?,
            created_at: row.get(6)?,
            food: Food {
                id: row.get(7)?,
                uuid: row.get(8)?,
                name: row.get(9)?,
                calories: row.get(10)?,
                protein: row.get(11)?,
                carbs: row.get(12)?,
                fat: row.get(13)?,
                serving_size: row.get(14)?,
                created_at: row.get(15)?,
            },
        })
    }

    fn weight_log_from_row(row: &rusqlite::Row) -> rusqlite::Result<WeightLog> {
        Ok(WeightLog {
            id: row.get(0)?,
            uuid: row.get(1)?,
            user_id: row.get(2)?,
            weight_kg: row.get(3)?,
            logged_at: Self::timestamp_column(row, 4)?,
            created_at: row.get(5)?,
        })
    }

    fn range_bounds(range: Option<DateRange>) -> (String, String) {
        match range {
            Some(r) => (
                r.start.format(TIMESTAMP_FORMAT).to_string(),
                r.end.format(TIMESTAMP_FORMAT).to_string(),
            ),
            // Sorts below and above every stored timestamp.
            None => (String::new(), "~".to_string()),
        }
    }

    // --- Users ---

    /// Create the profile, or overwrite the existing one in place.
    pub fn upsert_user(&self, user: &NewUser) -> Result<User> {
        if let Some(existing) = self.get_user()? {
            self.conn.execute(
                "UPDATE users SET name = ?1, weight_kg = ?2, height_cm = ?3,
                 target_calories = ?4, unit_system = ?5 WHERE id = ?6",
                params![
                    user.name,
                    user.weight_kg,
                    user.height_cm,
                    user.target_calories,
                    user.unit_system.as_str(),
                    existing.id,
                ],
            )?;
            info!(user_id = existing.id, "updated profile");
        } else {
            let now = Local::now().to_rfc3339();
            let uuid = Uuid::new_v4().to_string();
            self.conn.execute(
                "INSERT INTO users (uuid, name, weight_kg, height_cm, target_calories, unit_system, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    uuid,
                    user.name,
                    user.weight_kg,
                    user.height_cm,
                    user.target_calories,
                    user.unit_system.as_str(),
                    now,
                ],
            )?;
            info!(user_id = self.conn.last_insert_rowid(), "created profile");
        }
        self.get_user()?.context("Profile not found after upsert")
    }

    /// The single active profile, if onboarding has happened.
    pub fn get_user(&self) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, uuid, name, weight_kg, height_cm, target_calories, unit_system, created_at
                 FROM users ORDER BY id LIMIT 1",
                [],
                Self::user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    // --- Foods ---

    pub fn insert_food(&self, food: &NewFood) -> Result<Food> {
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO foods (uuid, name, calories, protein, carbs, fat, serving_size, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                uuid,
                food.name,
                food.calories,
                food.protein,
                food.carbs,
                food.fat,
                food.serving_size,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(food_id = id, name = %food.name, "inserted food");
        self.get_food(id)
    }

    pub fn get_food(&self, id: i64) -> Result<Food> {
        self.conn
            .query_row(
                "SELECT id, uuid, name, calories, protein, carbs, fat, serving_size, created_at
                 FROM foods WHERE id = ?1",
                params![id],
                Self::food_from_row,
            )
            .optional()?
            .ok_or_else(|| ShredError::NotFound { entity: "Food", id }.into())
    }

    pub fn list_foods(&self, search: Option<&str>) -> Result<Vec<Food>> {
        let pattern = match search {
            Some(query) => {
                let escaped = query
                    .replace('\\', "\\\\")
                    .replace('%', "\\%")
                    .replace('_', "\\_");
                format!("%{escaped}%")
            }
            None => "%".to_string(),
        };
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, name, calories, protein, carbs, fat, serving_size, created_at
             FROM foods WHERE name LIKE ?1 ESCAPE '\\' ORDER BY name, id",
        )?;
        let foods = stmt
            .query_map(params![pattern], Self::food_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(count = foods.len(), "listed foods");
        Ok(foods)
    }

    /// Delete a food no log refers to. Referenced foods are rejected.
    pub fn delete_food(&self, id: i64) -> Result<()> {
        let refs: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM food_logs WHERE food_id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        if refs > 0 {
            bail!(ShredError::Validation(format!(
                "Food {id} is used by {refs} log entr{} and cannot be deleted",
                if refs == 1 { "y" } else { "ies" }
            )));
        }
        let rows = self
            .conn
            .execute("DELETE FROM foods WHERE id = ?1", params![id])?;
        if rows == 0 {
            bail!(ShredError::NotFound { entity: "Food", id });
        }
        info!(food_id = id, "deleted food");
        Ok(())
    }

    // --- Food logs ---

    pub fn insert_food_log(&self, entry: &NewFoodLog) -> Result<FoodLog> {
        // Clean NotFound instead of a foreign key failure.
        self.get_food(entry.food_id)?;

        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO food_logs (uuid, user_id, food_id, quantity, meal_type, logged_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                uuid,
                entry.user_id,
                entry.food_id,
                entry.quantity,
                entry.meal_type.as_str(),
                entry.logged_at.format(TIMESTAMP_FORMAT).to_string(),
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(log_id = id, food_id = entry.food_id, "inserted food log");
        self.get_food_log(id)
    }

    pub fn get_food_log(&self, id: i64) -> Result<FoodLog> {
        self.conn
            .query_row(
                "SELECT fl.id, fl.uuid, fl.user_id, fl.quantity, fl.meal_type, fl.logged_at, fl.created_at,
                        f.id, f.uuid, f.name, f.calories, f.protein, f.carbs, f.fat, f.serving_size, f.created_at
                 FROM food_logs fl
                 JOIN foods f ON fl.food_id = f.id
                 WHERE fl.id = ?1",
                params![id],
                Self::food_log_from_row,
            )
            .optional()?
            .ok_or_else(|| ShredError::NotFound { entity: "Food log", id }.into())
    }

    pub fn delete_food_log(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM food_logs WHERE id = ?1", params![id])?;
        if rows > 0 {
            info!(log_id = id, "deleted food log");
        }
        Ok(rows > 0)
    }

    pub fn list_food_logs(&self, user_id: i64, range: Option<DateRange>) -> Result<Vec<FoodLog>> {
        let (start, end) = Self::range_bounds(range);
        let mut stmt = self.conn.prepare(
            "SELECT fl.id, fl.uuid, fl.user_id, fl.quantity, fl.meal_type, fl.logged_at, fl.created_at,
                    f.id, f.uuid, f.name, f.calories, f.protein, f.carbs, f.fat, f.serving_size, f.created_at
             FROM food_logs fl
             JOIN foods f ON fl.food_id = f.id
             WHERE fl.user_id = ?1 AND fl.logged_at >= ?2 AND fl.logged_at < ?3
             ORDER BY fl.logged_at, fl.id",
        )?;
        let logs = stmt
            .query_map(params![user_id, start, end], Self::food_log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(user_id, count = logs.len(), "listed food logs");
        Ok(logs)
    }

    // --- Weight logs ---

    pub fn insert_weight_log(&self, entry: &NewWeightLog) -> Result<WeightLog> {
        let now = Local::now().to_rfc3339();
        let uuid = Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO weight_logs (uuid, user_id, weight_kg, logged_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                uuid,
                entry.user_id,
                entry.weight_kg,
                entry.logged_at.format(TIMESTAMP_FORMAT).to_string(),
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        info!(weight_id = id, weight_kg = entry.weight_kg, "inserted weight log");
        self.conn
            .query_row(
                "SELECT id, uuid, user_id, weight_kg, logged_at, created_at
                 FROM weight_logs WHERE id = ?1",
                params![id],
                Self::weight_log_from_row,
            )
            .context("Weight log not found after insert")
    }

    pub fn delete_weight_log(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM weight_logs WHERE id = ?1", params![id])?;
        if rows > 0 {
            info!(weight_id = id, "deleted weight log");
        }
        Ok(rows > 0)
    }

    pub fn list_weight_logs(
        &self,
        user_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<WeightLog>> {
        let (start, end) = Self::range_bounds(range);
        let mut stmt = self.conn.prepare(
            "SELECT id, uuid, user_id, weight_kg, logged_at, created_at
             FROM weight_logs
             WHERE user_id = ?1 AND logged_at >= ?2 AND logged_at < ?3
             ORDER BY logged_at, id",
        )?;
        let logs = stmt
            .query_map(params![user_id, start, end], Self::weight_log_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(user_id, count = logs.len(), "listed weight logs");
        Ok(logs)
    }

    /// Most recent weight log strictly before `before`.
    pub fn latest_weight_log(
        &self,
        user_id: i64,
        before: NaiveDateTime,
    ) -> Result<Option<WeightLog>> {
        let log = self
            .conn
            .query_row(
                "SELECT id, uuid, user_id, weight_kg, logged_at, created_at
                 FROM weight_logs
                 WHERE user_id = ?1 AND logged_at < ?2
                 ORDER BY logged_at DESC, id DESC LIMIT 1",
                params![user_id, before.format(TIMESTAMP_FORMAT).to_string()],
                Self::weight_log_from_row,
            )
            .optional()?;
        Ok(log)
    }
}

impl NutritionStore for Database {
    fn get_user(&self) -> Result<Option<User>> {
        Database::get_user(self)
    }

    fn list_food_logs(&self, user_id: i64, range: Option<DateRange>) -> Result<Vec<FoodLog>> {
        Database::list_food_logs(self, user_id, range)
    }

    fn list_weight_logs(
        &self,
        user_id: i64,
        range: Option<DateRange>,
    ) -> Result<Vec<WeightLog>> {
        Database::list_weight_logs(self, user_id, range)
    }

    fn latest_weight_log(&self, user_id: i64, before: NaiveDateTime) -> Result<Option<WeightLog>> {
        Database::latest_weight_log(self, user_id, before)
    }
}
