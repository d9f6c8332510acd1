//! History and dashboard CLI commands

use anyhow::Result;
use colored::Colorize;
use tabled::Tabled;

use crate::client::{ApiClient, DashboardStats, PredictionPage, PredictionRecord};
use crate::output::{
    color_source, format_price, format_timestamp, print_info, print_json, print_table,
    print_warning, OutputFormat,
};

/// Row for the history table
#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Predicted")]
    predicted_at: String,
    #[tabled(rename = "Area")]
    area: String,
    #[tabled(rename = "Beds")]
    bedrooms: String,
    #[tabled(rename = "Baths")]
    bathrooms: String,
    #[tabled(rename = "Furnishing")]
    furnishing: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Source")]
    source: String,
}

impl From<&PredictionRecord> for HistoryRow {
    fn from(record: &PredictionRecord) -> Self {
        let attr = |name: &str| {
            record
                .attributes
                .get(name)
                .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
                .unwrap_or_else(|| "-".to_string())
        };
        Self {
            id: record.id,
            predicted_at: format_timestamp(&record.predicted_at),
            area: attr("area"),
            bedrooms: attr("bedrooms"),
            bathrooms: attr("bathrooms"),
            furnishing: attr("furnishingstatus"),
            price: format_price(record.predicted_price),
            source: color_source(&record.source),
        }
    }
}

/// List the user's predictions, newest first
pub async fn show_history(client: &ApiClient, page: usize, format: OutputFormat) -> Result<()> {
    let result: PredictionPage = client
        .get(&format!("api/v1/predictions?page={}", page.max(1)))
        .await?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Table => {
            if result.items.is_empty() {
                print_warning("No predictions found");
                return Ok(());
            }

            print_table(result.items.iter().map(HistoryRow::from).collect());
            println!(
                "\nPage {} of {} ({} predictions)",
                result.page, result.pages, result.total
            );
            if result.page < result.pages {
                print_info(&format!("Next page: --page {}", result.page + 1));
            }
        }
    }

    Ok(())
}

/// Summary over the most recent predictions
pub async fn show_dashboard(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let stats: DashboardStats = client.get("api/v1/dashboard").await?;

    match format {
        OutputFormat::Json => print_json(&stats)?,
        OutputFormat::Table => {
            println!("{}", "Prediction Dashboard".bold());
            println!("{}", "=".repeat(40));
            println!("Total predictions:  {}", stats.total_predictions);
            if stats.total_predictions == 0 {
                print_warning("No predictions yet");
                return Ok(());
            }
            println!();
            println!("{}", "Recent predictions".bold());
            println!("{}", "-".repeat(40));
            println!("Average price:      {}", format_price(stats.avg_price).cyan());
            println!("Highest price:      {}", format_price(stats.max_price).green());
            println!("Lowest price:       {}", format_price(stats.min_price).yellow());
        }
    }

    Ok(())
}
