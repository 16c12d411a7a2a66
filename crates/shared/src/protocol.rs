use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Country, TripFormData, TripId, UserId};

/// Body posted to the trip-generation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTripRequest {
    pub country: String,
    pub number_of_days: i64,
    pub travel_style: String,
    pub interests: String,
    pub budget: String,
    pub group_type: String,
    pub user_id: UserId,
}

impl CreateTripRequest {
    pub fn from_form(form: &TripFormData, user_id: UserId) -> Self {
        Self {
            country: form.country.clone(),
            number_of_days: form.duration,
            travel_style: form.travel_style.clone(),
            interests: form.interest.clone(),
            budget: form.budget.clone(),
            group_type: form.group_type.clone(),
            user_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTripResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TripId>,
}

impl CreateTripResponse {
    /// The created trip id, ignoring blank identifiers.
    pub fn trip_id(&self) -> Option<&TripId> {
        self.id.as_ref().filter(|id| !id.as_str().trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RestCountryName {
    pub common: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestCountryMaps {
    #[serde(default)]
    pub open_street_map: Option<String>,
}

/// One record of `GET /v3.1/all?fields=name,flag,latlng,maps`.
#[derive(Debug, Clone, Deserialize)]
pub struct RestCountryRecord {
    pub name: RestCountryName,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub latlng: Vec<f64>,
    #[serde(default)]
    pub maps: Option<RestCountryMaps>,
}

impl RestCountryRecord {
    /// `None` when the record carries no usable lat/lng pair.
    pub fn into_country(self) -> Option<Country> {
        let coordinates = match self.latlng.as_slice() {
            [lat, lng] => (*lat, *lng),
            _ => return None,
        };
        Some(Country {
            name: format!("{}{}", self.flag, self.name.common),
            coordinates,
            value: self.name.common,
            open_street_map: self.maps.and_then(|maps| maps.open_street_map),
        })
    }
}

/// `GET /account` response of the backend service.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountResponse {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList<T> {
    #[serde(default)]
    pub total: u64,
    #[serde(default = "Vec::new")]
    pub documents: Vec<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDocument {
    #[serde(rename = "$id")]
    pub id: TripId,
    #[serde(rename = "$createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub trip_detail: String,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub itinerary_count: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    #[serde(default)]
    pub day: u32,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripLocation {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub coordinates: Vec<f64>,
    #[serde(default)]
    pub open_street_map: Option<String>,
}

/// Generated itinerary stored as a JSON string in a trip document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TripDetail {
    pub name: String,
    pub description: String,
    pub estimated_price: String,
    pub duration: u32,
    pub budget: String,
    pub travel_style: String,
    pub country: String,
    pub interests: String,
    pub group_type: String,
    pub best_time_to_visit: Vec<String>,
    pub weather_info: Vec<String>,
    pub location: TripLocation,
    pub itinerary: Vec<DayPlan>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripCard {
    pub id: TripId,
    pub name: String,
    pub image_url: String,
    pub location: String,
    pub tags: Vec<String>,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserItineraryCount {
    pub image_url: String,
    pub name: String,
    pub count: u32,
}
