//! Model introspection CLI command

use anyhow::Result;
use colored::Colorize;

use crate::client::{ApiClient, ModelInfo};
use crate::output::{print_json, OutputFormat};

/// Show the artifact the service is running
pub async fn show_model(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let info: ModelInfo = client.get("api/v1/model").await?;

    match format {
        OutputFormat::Json => print_json(&info)?,
        OutputFormat::Table => {
            println!("{}", "Model".bold());
            println!("{}", "=".repeat(50));
            println!(
                "Name:           {}",
                info.model_name.as_deref().unwrap_or("unnamed").cyan()
            );
            println!("Kind:           {}", info.model_kind);
            println!(
                "Trained:        {}",
                info.training_date.as_deref().unwrap_or("unknown")
            );
            if let Some(checksum) = &info.checksum {
                println!("Checksum:       {}", &checksum[..checksum.len().min(12)]);
            }

            if !info.metrics.is_empty() {
                println!();
                println!("{}", "Metrics".bold());
                println!("{}", "-".repeat(50));
                for (name, value) in &info.metrics {
                    println!("{:<16}{:.4}", name, value);
                }
            }

            println!();
            println!("{} ({})", "Features".bold(), info.features.len());
            println!("{}", "-".repeat(50));
            for feature in &info.features {
                println!("  {}", feature);
            }
        }
    }

    Ok(())
}
