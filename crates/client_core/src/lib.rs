use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{AuthUser, Country, TripId},
    protocol::{CreateTripRequest, CreateTripResponse, DocumentList, TripDocument, UserDocument},
};

mod backend;
pub mod config;
mod countries;
pub mod error;
pub mod form;
mod trip_api;
pub mod views;

pub use backend::BackendClient;
pub use countries::RestCountriesClient;
pub use form::{FormError, RequestState, SubmitOutcome, TripDraftController};
pub use trip_api::HttpTripCreator;

pub type TripPage = DocumentList<TripDocument>;
pub type UserPage = DocumentList<UserDocument>;

/// Resolves the user behind the current session.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_user(&self) -> Result<Option<AuthUser>>;
}

/// Country list backing the destination picker.
#[async_trait]
pub trait CountryDirectory: Send + Sync {
    async fn list_countries(&self) -> Result<Vec<Country>>;
}

/// Trip-generation endpoint. `Err` means the request never produced a
/// decodable response.
#[async_trait]
pub trait TripCreator: Send + Sync {
    async fn create_trip(&self, request: CreateTripRequest) -> Result<CreateTripResponse>;
}

#[async_trait]
pub trait TripStore: Send + Sync {
    async fn get_trip(&self, trip_id: &TripId) -> Result<Option<TripDocument>>;
    async fn list_trips(&self, limit: u32, offset: u32) -> Result<TripPage>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn list_users(&self, limit: u32, offset: u32) -> Result<UserPage>;
    async fn find_by_account(&self, account_id: &str) -> Result<Option<UserDocument>>;
}

pub struct MissingAuthProvider;

#[async_trait]
impl AuthProvider for MissingAuthProvider {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        Ok(None)
    }
}

pub struct MissingCountryDirectory;

#[async_trait]
impl CountryDirectory for MissingCountryDirectory {
    async fn list_countries(&self) -> Result<Vec<Country>> {
        Err(anyhow!("country directory is unavailable"))
    }
}

pub struct MissingTripCreator;

#[async_trait]
impl TripCreator for MissingTripCreator {
    async fn create_trip(&self, _request: CreateTripRequest) -> Result<CreateTripResponse> {
        Err(anyhow!("trip generation endpoint is unavailable"))
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
