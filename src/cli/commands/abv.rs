use serde_json::json;

use crate::cli::utils::{open_store, output_success};
use crate::cli::OutputFormat;
use crate::services::CocktailService;

pub async fn handle(cocktail_id: i64, output_format: OutputFormat) -> anyhow::Result<()> {
    let cocktail = CocktailService::new(open_store().await?).show(cocktail_id).await?;
    let abv = cocktail.alcohol_content();

    if matches!(output_format, OutputFormat::Text) {
        for item in &cocktail.ingredients {
            println!(
                "  {:<20} {:>7.1} ml  {:>5.1}%",
                item.ingredient.name, item.pivot.measure_ml, item.ingredient.alcohol_content
            );
        }
    }

    output_success(
        output_format,
        &format!("{}: {:.2}% ABV", cocktail.name(), abv),
        Some(json!({ "cocktail": cocktail.name(), "alcohol_content": abv })),
    )
}
