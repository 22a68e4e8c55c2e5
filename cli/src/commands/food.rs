use anyhow::Result;
use std::process;

use shred_core::models::{Food, NewFood};
use shred_core::{ShredError, ShredService};

use super::helpers::{json_error, print_food_table};

pub(crate) fn cmd_food_add(svc: &ShredService, food: &NewFood, json: bool) -> Result<()> {
    let food = svc.add_food(food)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        let name = &food.name;
        let id = food.id;
        println!("Added food: {name} (id: {id})");
    }

    Ok(())
}

pub(crate) fn cmd_food_list(svc: &ShredService, search: Option<&str>, json: bool) -> Result<()> {
    let foods = svc.list_foods(search)?;

    if foods.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No foods found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&foods)?);
    } else {
        let refs: Vec<&Food> = foods.iter().collect();
        print_food_table(&refs);
    }

    Ok(())
}

pub(crate) fn cmd_food_delete(svc: &ShredService, id: i64, json: bool) -> Result<()> {
    match svc.delete_food(id) {
        Ok(()) => {
            if json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("Deleted food {id}");
            }
            Ok(())
        }
        Err(e) if matches!(e.downcast_ref::<ShredError>(), Some(ShredError::NotFound { .. })) => {
            if json {
                println!("{}", json_error(&e.to_string()));
            } else {
                eprintln!("{e}");
            }
            process::exit(2);
        }
        Err(e) => Err(e),
    }
}
