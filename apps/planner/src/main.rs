use std::{path::PathBuf, process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::{load_settings, load_settings_from, Settings},
    views::{load_dashboard, load_trip_detail},
    AuthProvider, BackendClient, HttpTripCreator, MissingAuthProvider, RestCountriesClient,
    SubmitOutcome, TripDraftController,
};
use shared::domain::{FieldUpdate, FormField, TripId};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "planner", about = "Admin tools for AI-generated trips")]
struct Args {
    /// Settings file, defaults to ./planner.toml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List destination countries.
    Countries {
        #[arg(long)]
        filter: Option<String>,
    },
    /// Print the fixed choices for the categorical trip fields.
    Options,
    /// Submit a trip draft to the generation endpoint.
    CreateTrip {
        #[arg(long)]
        country: String,
        #[arg(long, allow_hyphen_values = true)]
        duration: i64,
        #[arg(long)]
        travel_style: String,
        #[arg(long)]
        interest: String,
        #[arg(long)]
        budget: String,
        #[arg(long)]
        group_type: String,
    },
    /// Show a trip with its popular-trip sidebar.
    Trip { id: String },
    /// Show the admin dashboard records.
    Dashboard,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => load_settings_from(path),
        None => load_settings(),
    };

    match args.command {
        Command::Countries { filter } => {
            let controller = trip_controller(&settings).await?;
            let options = controller.filter_countries(filter.as_deref().unwrap_or_default());
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
        Command::Options => {
            let catalog: Vec<_> = [
                FormField::TravelStyle,
                FormField::Interest,
                FormField::Budget,
                FormField::GroupType,
            ]
            .into_iter()
            .map(|field| (field, field.options()))
            .collect();
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        Command::CreateTrip {
            country,
            duration,
            travel_style,
            interest,
            budget,
            group_type,
        } => {
            let controller = trip_controller(&settings).await?;
            for update in [
                FieldUpdate::Country(country),
                FieldUpdate::TravelStyle(travel_style),
                FieldUpdate::Interest(interest),
                FieldUpdate::Budget(budget),
                FieldUpdate::Duration(duration),
                FieldUpdate::GroupType(group_type),
            ] {
                controller.update_field(update).await;
            }
            if let Some(marker) = controller.selected_country_marker().await {
                info!(country = %marker.country, lat = marker.coordinates.0, lng = marker.coordinates.1, "destination selected");
            }

            match controller.submit().await {
                SubmitOutcome::Created {
                    trip_id,
                    detail_path,
                } => {
                    println!(
                        "{}",
                        serde_json::json!({ "id": trip_id, "detailPath": detail_path })
                    );
                }
                SubmitOutcome::Rejected(err) => {
                    eprintln!("{err}");
                    return Ok(ExitCode::FAILURE);
                }
                SubmitOutcome::AlreadyInFlight => {
                    eprintln!("a trip request is already in flight");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Command::Trip { id } => {
            let backend = BackendClient::from_settings(&settings).context("backend settings")?;
            let view = load_trip_detail(&backend, &TripId::new(id)).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
        Command::Dashboard => {
            let backend = BackendClient::from_settings(&settings).context("backend settings")?;
            let view = load_dashboard(&backend, &backend, &backend).await?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn trip_controller(settings: &Settings) -> Result<TripDraftController> {
    let auth: Arc<dyn AuthProvider> = match BackendClient::from_settings(settings) {
        Ok(backend) => Arc::new(backend),
        Err(error) => {
            warn!(%error, "backend unavailable; submissions will be unauthenticated");
            Arc::new(MissingAuthProvider)
        }
    };
    let creator = HttpTripCreator::new(&settings.trip_api_url, settings.http_timeout())
        .context("trip api url")?;
    let countries = RestCountriesClient::new(&settings.countries_url, settings.http_timeout())
        .context("countries url")?;

    match TripDraftController::load(auth.clone(), Arc::new(creator.clone()), &countries).await {
        Ok(controller) => Ok(controller),
        Err(error) => {
            warn!(error = ?error, "continuing without a country list");
            Ok(TripDraftController::new(auth, Arc::new(creator), Vec::new()))
        }
    }
}
