//! Trip draft form: field state, validation, and the submission pipeline.

use std::sync::Arc;

use anyhow::{Context, Result};
use shared::{
    domain::{
        trip_detail_path, ComboOption, Country, FieldUpdate, MapMarker, TripFormData, TripId,
    },
    protocol::CreateTripRequest,
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{AuthProvider, CountryDirectory, TripCreator};

pub const SELECTED_COUNTRY_COLOR: &str = "#EA382E";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please provide values for all fields")]
    MissingFields,
    #[error("Duration must be between 1 and 10 days")]
    DurationOutOfRange,
    #[error("User not authenticated")]
    NotAuthenticated,
    #[error("Failed to generate trip")]
    GenerationFailed,
    #[error("Something went wrong")]
    Unexpected,
    #[error("illegal request state transition from {from} to {to}")]
    IllegalTransition {
        from: &'static str,
        to: &'static str,
    },
}

/// Lifecycle of a single submission attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Succeeded {
        trip_id: TripId,
    },
    Failed {
        message: String,
    },
}

impl RequestState {
    fn name(&self) -> &'static str {
        match self {
            RequestState::Idle => "idle",
            RequestState::InFlight => "in_flight",
            RequestState::Succeeded { .. } => "succeeded",
            RequestState::Failed { .. } => "failed",
        }
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestState::Failed { message } => Some(message.as_str()),
            _ => None,
        }
    }

    /// Enters `InFlight`, dropping any previous outcome.
    pub fn begin(&mut self) -> Result<(), FormError> {
        if self.is_in_flight() {
            return Err(FormError::IllegalTransition {
                from: self.name(),
                to: "in_flight",
            });
        }
        *self = RequestState::InFlight;
        Ok(())
    }

    /// Leaves `InFlight` for the terminal state matching `result`.
    pub fn finish(&mut self, result: &Result<TripId, FormError>) -> Result<(), FormError> {
        let next = match result {
            Ok(trip_id) => RequestState::Succeeded {
                trip_id: trip_id.clone(),
            },
            Err(err) => RequestState::Failed {
                message: err.to_string(),
            },
        };
        if !self.is_in_flight() {
            return Err(FormError::IllegalTransition {
                from: self.name(),
                to: next.name(),
            });
        }
        *self = next;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The caller should navigate to `detail_path`.
    Created { trip_id: TripId, detail_path: String },
    Rejected(FormError),
    AlreadyInFlight,
}

/// Local checks run before any collaborator is contacted.
pub fn validate(form: &TripFormData) -> Result<(), FormError> {
    if !form.missing_fields().is_empty() {
        return Err(FormError::MissingFields);
    }
    if !form.duration_in_range() {
        return Err(FormError::DurationOutOfRange);
    }
    Ok(())
}

struct ControllerState {
    form: TripFormData,
    request: RequestState,
}

pub struct TripDraftController {
    auth: Arc<dyn AuthProvider>,
    creator: Arc<dyn TripCreator>,
    countries: Vec<Country>,
    state: Mutex<ControllerState>,
}

impl TripDraftController {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        creator: Arc<dyn TripCreator>,
        countries: Vec<Country>,
    ) -> Self {
        let form = initial_form(&countries);
        Self {
            auth,
            creator,
            countries,
            state: Mutex::new(ControllerState {
                form,
                request: RequestState::Idle,
            }),
        }
    }

    /// Fetches the country list once and builds a controller around it.
    pub async fn load(
        auth: Arc<dyn AuthProvider>,
        creator: Arc<dyn TripCreator>,
        directory: &dyn CountryDirectory,
    ) -> Result<Self> {
        let countries = directory
            .list_countries()
            .await
            .context("failed to load country list")?;
        info!(count = countries.len(), "loaded countries for trip form");
        Ok(Self::new(auth, creator, countries))
    }

    pub async fn form(&self) -> TripFormData {
        self.state.lock().await.form.clone()
    }

    pub async fn request_state(&self) -> RequestState {
        self.state.lock().await.request.clone()
    }

    pub async fn is_submitting(&self) -> bool {
        self.state.lock().await.request.is_in_flight()
    }

    pub async fn error_message(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .request
            .error_message()
            .map(str::to_owned)
    }

    pub async fn update_field(&self, update: FieldUpdate) {
        let mut state = self.state.lock().await;
        debug!(field = ?update.field(), "trip form field updated");
        state.form = state.form.with(update);
    }

    /// Restores the initial field values. The request state is left alone so
    /// an in-flight submission still resolves normally.
    pub async fn reset_form(&self) {
        self.state.lock().await.form = initial_form(&self.countries);
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let form = {
            let mut state = self.state.lock().await;
            if state.request.begin().is_err() {
                debug!("ignoring submit while a trip request is in flight");
                return SubmitOutcome::AlreadyInFlight;
            }
            state.form.clone()
        };

        let result = self.run_submission(&form).await;

        let mut state = self.state.lock().await;
        if let Err(err) = state.request.finish(&result) {
            error!(%err, "submission finished outside of in-flight state");
        }
        match result {
            Ok(trip_id) => {
                info!(%trip_id, "trip created");
                SubmitOutcome::Created {
                    detail_path: trip_detail_path(&trip_id),
                    trip_id,
                }
            }
            Err(err) => SubmitOutcome::Rejected(err),
        }
    }

    async fn run_submission(&self, form: &TripFormData) -> Result<TripId, FormError> {
        validate(form)?;

        let user = match self.auth.current_user().await {
            Ok(Some(user)) if !user.id.as_str().trim().is_empty() => user,
            Ok(_) => return Err(FormError::NotAuthenticated),
            Err(err) => {
                warn!(error = ?err, "failed to resolve current user");
                return Err(FormError::NotAuthenticated);
            }
        };

        let request = CreateTripRequest::from_form(form, user.id);
        match self.creator.create_trip(request).await {
            Ok(response) => response.trip_id().cloned().ok_or_else(|| {
                warn!("trip endpoint responded without an id");
                FormError::GenerationFailed
            }),
            Err(err) => {
                error!(error = ?err, "trip generation request failed");
                Err(FormError::Unexpected)
            }
        }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn country_options(&self) -> Vec<ComboOption> {
        self.countries
            .iter()
            .map(|country| ComboOption {
                text: country.name.clone(),
                value: country.value.clone(),
            })
            .collect()
    }

    /// Case-insensitive substring match on the display name.
    pub fn filter_countries(&self, query: &str) -> Vec<ComboOption> {
        let query = query.trim().to_lowercase();
        self.countries
            .iter()
            .filter(|country| query.is_empty() || country.name.to_lowercase().contains(&query))
            .map(|country| ComboOption {
                text: country.name.clone(),
                value: country.value.clone(),
            })
            .collect()
    }

    pub async fn selected_country_marker(&self) -> Option<MapMarker> {
        let selected = self.state.lock().await.form.country.clone();
        self.countries
            .iter()
            .find(|country| country.value == selected || country.name == selected)
            .map(|country| MapMarker {
                country: country.value.clone(),
                color: SELECTED_COUNTRY_COLOR.to_string(),
                coordinates: country.coordinates,
            })
    }
}

fn initial_form(countries: &[Country]) -> TripFormData {
    TripFormData {
        country: countries
            .first()
            .map(|country| country.value.clone())
            .unwrap_or_default(),
        ..TripFormData::default()
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
