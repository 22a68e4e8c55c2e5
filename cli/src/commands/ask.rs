use anyhow::Result;

use shred_core::ShredService;
use shred_core::query::{NutritionQueryError, NutritionQueryProvider, NutritionQueryResult};

fn print_answer(result: &NutritionQueryResult) {
    println!("{} ({})", result.food_name, result.serving_size);
    println!(
        "  {} kcal | P:{:.1}g C:{:.1}g F:{:.1}g",
        result.calories, result.protein, result.carbs, result.fat
    );
    println!(
        "  Source: {} (confidence {:.0}%)",
        result.source,
        result.confidence * 100.0
    );
    if !result.is_high_confidence() {
        eprintln!("Warning: {}", NutritionQueryError::LowConfidence);
    }
}

pub(crate) fn cmd_ask(
    svc: &ShredService,
    provider: &dyn NutritionQueryProvider,
    question: &str,
    save: bool,
    json: bool,
) -> Result<()> {
    if save {
        let (result, food) = svc.ask_and_save(provider, question)?;
        if json {
            let out = serde_json::json!({ "answer": result, "food": food });
            println!("{}", serde_json::to_string_pretty(&out)?);
        } else {
            print_answer(&result);
            println!("\nSaved as food {} (id: {})", food.name, food.id);
        }
        return Ok(());
    }

    let result = svc.ask(provider, question)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_answer(&result);
    }

    Ok(())
}
