mod commands;
mod config;
mod logging;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::process;
use tracing::debug;

use crate::commands::{
    LogArgs, ProfileArgs, cmd_ask, cmd_config_set_rollover, cmd_config_show, cmd_food_add,
    cmd_food_delete, cmd_food_list, cmd_log, cmd_log_delete, cmd_profile_set, cmd_profile_show,
    cmd_progress, cmd_summary, cmd_weight_delete, cmd_weight_history, cmd_weight_log, parse_date,
};
use crate::config::Config;
use shred_core::models::NewFood;
use shred_core::query::CannedNutritionQuery;
use shred_core::{ShredError, ShredService};

#[derive(Parser)]
#[command(
    name = "shred",
    version,
    about = "Track what you eat and what you weigh",
    long_about = "Track what you eat and what you weigh.\n\n\
        Data lives in a local SQLite database. Set SHRED_DATA_DIR to use another \
        directory and SHRED_LOG (e.g. `shred_core=debug`) to control logging."
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or edit your profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Manage the food catalog
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Log or delete food entries
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },
    /// Show the dashboard for a day (defaults to today)
    Summary {
        /// Date to show (YYYY-MM-DD, today, yesterday)
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Chart a metric over a trailing window
    Progress {
        /// calories, protein, carbs, fat, or weight
        #[arg(short, long, default_value = "calories")]
        metric: String,
        /// week, month, or 3months
        #[arg(short, long, default_value = "week")]
        range: String,
        /// Write the series as CSV to stdout
        #[arg(long, conflicts_with = "json")]
        csv: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Track body weight
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
    /// Ask for the nutrition facts of a food
    Ask {
        /// Question, e.g. "chicken breast 200g"
        query: String,
        /// Save the answer to the food catalog
        #[arg(long)]
        save: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show the current profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create the profile, or update the given fields
    Set {
        #[arg(long)]
        name: Option<String>,
        /// Body weight in your units (kg or lb)
        #[arg(long)]
        weight: Option<f64>,
        /// Height in your units (cm or inches)
        #[arg(long)]
        height: Option<f64>,
        /// Daily calorie target
        #[arg(long)]
        target: Option<i64>,
        /// metric or imperial
        #[arg(long)]
        units: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Add a food with its nutrition per serving
    Add {
        /// Food name
        name: String,
        /// Calories per serving
        #[arg(long)]
        calories: i64,
        /// Protein (g) per serving
        #[arg(long, default_value = "0")]
        protein: f64,
        /// Carbs (g) per serving
        #[arg(long, default_value = "0")]
        carbs: f64,
        /// Fat (g) per serving
        #[arg(long, default_value = "0")]
        fat: f64,
        /// Serving description, e.g. "100g" or "1 cup"
        #[arg(long, default_value = "1 serving")]
        serving: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List foods, optionally filtered by name
    List {
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a food that has no log entries
    Delete {
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum LogCommands {
    /// Log servings of a food
    Add {
        /// Food ID (see `shred food list`)
        food_id: i64,
        /// Number of servings
        quantity: f64,
        /// Meal type: breakfast, lunch, dinner, snack
        #[arg(short, long, default_value = "snack")]
        meal: String,
        /// Date to log for (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Time of day (HH:MM)
        #[arg(long)]
        time: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a food log entry by ID
    Delete {
        entry_id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Log a weight in your units
    Log {
        value: f64,
        /// Date to log for (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List weight entries
    History {
        /// week, month, or 3months
        #[arg(short, long, default_value = "month")]
        range: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a weight entry by ID
    Delete {
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show config and data paths
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Set the hour (0-23) at which a new day starts
    SetRollover {
        hour: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        if ShredError::is_missing_user(&e) {
            eprintln!("{e}");
            eprintln!(
                "  e.g. shred profile set --name Sam --weight 80 --height 180 --target 2000"
            );
            process::exit(2);
        }
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load()?;
    let svc = ShredService::new(&config.db_path, config.boundary()?)?;
    let now = Local::now().naive_local();
    debug!(
        db = %config.db_path.display(),
        rollover = config.settings.day_rollover_hour,
        "opened database"
    );

    match cli.command {
        Commands::Profile { command } => match command {
            ProfileCommands::Show { json } => cmd_profile_show(&svc, json),
            ProfileCommands::Set {
                name,
                weight,
                height,
                target,
                units,
                json,
            } => {
                let args = ProfileArgs {
                    name,
                    weight,
                    height,
                    target,
                    units: units.map(|u| u.parse()).transpose()?,
                };
                cmd_profile_set(&svc, args, json)
            }
        },
        Commands::Food { command } => match command {
            FoodCommands::Add {
                name,
                calories,
                protein,
                carbs,
                fat,
                serving,
                json,
            } => {
                let food = NewFood {
                    name,
                    calories,
                    protein,
                    carbs,
                    fat,
                    serving_size: serving,
                };
                cmd_food_add(&svc, &food, json)
            }
            FoodCommands::List { search, json } => cmd_food_list(&svc, search.as_deref(), json),
            FoodCommands::Delete { id, json } => cmd_food_delete(&svc, id, json),
        },
        Commands::Log { command } => match command {
            LogCommands::Add {
                food_id,
                quantity,
                meal,
                date,
                time,
                json,
            } => {
                let session = svc.session(now)?;
                let args = LogArgs {
                    food_id,
                    quantity,
                    meal: meal.parse()?,
                    date: parse_date(date, session.today())?,
                    time,
                };
                cmd_log(&svc, &session, args, json)
            }
            LogCommands::Delete { entry_id, json } => cmd_log_delete(&svc, entry_id, json),
        },
        Commands::Summary { date, json } => {
            let session = svc.session(now)?;
            let date = parse_date(date, session.today())?;
            cmd_summary(&svc, &session, date, json)
        }
        Commands::Progress {
            metric,
            range,
            csv,
            json,
        } => {
            let session = svc.session(now)?;
            cmd_progress(&svc, &session, metric.parse()?, range.parse()?, csv, json)
        }
        Commands::Weight { command } => match command {
            WeightCommands::Log { value, date, json } => {
                let session = svc.session(now)?;
                let date = parse_date(date, session.today())?;
                cmd_weight_log(&svc, &session, value, date, json)
            }
            WeightCommands::History { range, json } => {
                let session = svc.session(now)?;
                cmd_weight_history(&svc, &session, range.parse()?, json)
            }
            WeightCommands::Delete { id, json } => cmd_weight_delete(&svc, id, json),
        },
        Commands::Ask { query, save, json } => {
            cmd_ask(&svc, &CannedNutritionQuery, &query, save, json)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show { json } => cmd_config_show(&config, json),
            ConfigCommands::SetRollover { hour, json } => {
                cmd_config_set_rollover(&mut config, hour, json)
            }
        },
    }
}
