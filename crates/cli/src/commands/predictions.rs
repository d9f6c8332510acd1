//! Prediction CLI commands

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;

use crate::client::{ApiClient, PredictRequest, PredictionRecord, PredictionResponse};
use crate::output::{
    color_source, format_price, format_timestamp, print_json, print_success, print_warning,
    OutputFormat,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum YesNo {
    Yes,
    No,
}

impl YesNo {
    fn as_str(self) -> &'static str {
        match self {
            YesNo::Yes => "yes",
            YesNo::No => "no",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Furnishing {
    Furnished,
    SemiFurnished,
    Unfurnished,
}

impl Furnishing {
    fn as_str(self) -> &'static str {
        match self {
            Furnishing::Furnished => "furnished",
            Furnishing::SemiFurnished => "semi-furnished",
            Furnishing::Unfurnished => "unfurnished",
        }
    }
}

/// House attributes for a prediction
#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    /// Lot area in square feet
    #[arg(long, value_parser = clap::value_parser!(u32).range(500..=50_000))]
    pub area: u32,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub bedrooms: u32,

    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=10))]
    pub bathrooms: u32,

    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=5))]
    pub stories: u32,

    /// Parking spaces
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=10))]
    pub parking: u32,

    /// Connected to a main road
    #[arg(long, value_enum, default_value = "no")]
    pub mainroad: YesNo,

    #[arg(long, value_enum, default_value = "no")]
    pub guestroom: YesNo,

    #[arg(long, value_enum, default_value = "no")]
    pub basement: YesNo,

    #[arg(long, value_enum, default_value = "no")]
    pub hotwaterheating: YesNo,

    #[arg(long, value_enum, default_value = "no")]
    pub airconditioning: YesNo,

    /// Located in a preferred area
    #[arg(long, value_enum, default_value = "no")]
    pub prefarea: YesNo,

    #[arg(long, value_enum, default_value = "unfurnished")]
    pub furnishingstatus: Furnishing,
}

impl PredictArgs {
    pub fn to_request(&self) -> PredictRequest {
        PredictRequest {
            area: self.area,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            stories: self.stories,
            parking: self.parking,
            mainroad: self.mainroad.as_str().to_string(),
            guestroom: self.guestroom.as_str().to_string(),
            basement: self.basement.as_str().to_string(),
            hotwaterheating: self.hotwaterheating.as_str().to_string(),
            airconditioning: self.airconditioning.as_str().to_string(),
            prefarea: self.prefarea.as_str().to_string(),
            furnishingstatus: self.furnishingstatus.as_str().to_string(),
        }
    }
}

/// Request a price prediction
pub async fn predict(client: &ApiClient, args: &PredictArgs, format: OutputFormat) -> Result<()> {
    let response: PredictionResponse = client
        .post("api/v1/predictions", &args.to_request())
        .await?;

    match format {
        OutputFormat::Json => print_json(&response)?,
        OutputFormat::Table => {
            print_success(&format!(
                "Predicted price: {}",
                format_price(response.prediction.predicted_price).bold()
            ));
            if let Some(diagnostic) = &response.diagnostic {
                print_warning(diagnostic);
            }
            println!(
                "Saved as prediction #{} ({})",
                response.prediction.id,
                color_source(&response.prediction.source)
            );
        }
    }

    Ok(())
}

/// Show one stored prediction
pub async fn show_prediction(client: &ApiClient, id: u64, format: OutputFormat) -> Result<()> {
    let record: PredictionRecord = client.get(&format!("api/v1/predictions/{}", id)).await?;

    match format {
        OutputFormat::Json => print_json(&record)?,
        OutputFormat::Table => {
            println!("{}", format!("Prediction #{}", record.id).bold());
            println!("{}", "=".repeat(40));
            println!("Price:      {}", format_price(record.predicted_price));
            println!("Source:     {}", color_source(&record.source));
            println!("Predicted:  {}", format_timestamp(&record.predicted_at));
            println!();
            for (name, value) in &record.attributes {
                let value = value
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| value.to_string());
                println!("{:<18}{}", name, value);
            }
        }
    }

    Ok(())
}

/// Delete one of the user's predictions
pub async fn delete_prediction(client: &ApiClient, id: u64) -> Result<()> {
    client.delete(&format!("api/v1/predictions/{}", id)).await?;
    print_success(&format!("Prediction #{} deleted", id));
    Ok(())
}
