use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(TripId);

pub const MIN_TRIP_DAYS: i64 = 1;
pub const MAX_TRIP_DAYS: i64 = 10;

pub const TRAVEL_STYLES: &[&str] = &[
    "Relaxed",
    "Luxury",
    "Adventure",
    "Cultural",
    "Nature & Outdoors",
    "City Exploration",
];

pub const INTERESTS: &[&str] = &[
    "Food & Culinary",
    "Historical Sites",
    "Hiking & Nature Walks",
    "Beaches & Water Activities",
    "Museums & Art",
    "Nightlife & Bars",
    "Photography Spots",
    "Shopping",
    "Local Experiences",
];

pub const BUDGET_OPTIONS: &[&str] = &["Budget", "Mid-range", "Luxury", "Premium"];

pub const GROUP_TYPES: &[&str] = &["Solo", "Couple", "Family", "Friends", "Business"];

/// Keys of the trip draft form, used when a front end reports a field change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Country,
    TravelStyle,
    Interest,
    Budget,
    Duration,
    GroupType,
}

impl FormField {
    /// Fixed choices offered for a categorical field. `Country` and `Duration`
    /// have no static catalog.
    pub fn options(self) -> &'static [&'static str] {
        match self {
            FormField::TravelStyle => TRAVEL_STYLES,
            FormField::Interest => INTERESTS,
            FormField::Budget => BUDGET_OPTIONS,
            FormField::GroupType => GROUP_TYPES,
            FormField::Country | FormField::Duration => &[],
        }
    }
}

/// A single field replacement. Duration is carried as a signed integer so that
/// out-of-range input reaches validation unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldUpdate {
    Country(String),
    TravelStyle(String),
    Interest(String),
    Budget(String),
    Duration(i64),
    GroupType(String),
}

impl FieldUpdate {
    pub fn field(&self) -> FormField {
        match self {
            FieldUpdate::Country(_) => FormField::Country,
            FieldUpdate::TravelStyle(_) => FormField::TravelStyle,
            FieldUpdate::Interest(_) => FormField::Interest,
            FieldUpdate::Budget(_) => FormField::Budget,
            FieldUpdate::Duration(_) => FormField::Duration,
            FieldUpdate::GroupType(_) => FormField::GroupType,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripFormData {
    pub country: String,
    pub travel_style: String,
    pub interest: String,
    pub budget: String,
    pub duration: i64,
    pub group_type: String,
}

impl TripFormData {
    /// Returns a copy with one field replaced.
    #[must_use]
    pub fn with(&self, update: FieldUpdate) -> Self {
        let mut next = self.clone();
        match update {
            FieldUpdate::Country(v) => next.country = v,
            FieldUpdate::TravelStyle(v) => next.travel_style = v,
            FieldUpdate::Interest(v) => next.interest = v,
            FieldUpdate::Budget(v) => next.budget = v,
            FieldUpdate::Duration(v) => next.duration = v,
            FieldUpdate::GroupType(v) => next.group_type = v,
        }
        next
    }

    pub fn categorical_fields(&self) -> [(FormField, &str); 5] {
        [
            (FormField::Country, self.country.as_str()),
            (FormField::TravelStyle, self.travel_style.as_str()),
            (FormField::Interest, self.interest.as_str()),
            (FormField::Budget, self.budget.as_str()),
            (FormField::GroupType, self.group_type.as_str()),
        ]
    }

    /// Categorical fields that are empty or whitespace-only.
    pub fn missing_fields(&self) -> Vec<FormField> {
        self.categorical_fields()
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| field)
            .collect()
    }

    pub fn duration_in_range(&self) -> bool {
        (MIN_TRIP_DAYS..=MAX_TRIP_DAYS).contains(&self.duration)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Country {
    pub name: String,
    pub coordinates: (f64, f64),
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_street_map: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboOption {
    pub text: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub country: String,
    pub color: String,
    pub coordinates: (f64, f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

pub fn trip_detail_path(trip_id: &TripId) -> String {
    format!("/trips/{trip_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> TripFormData {
        TripFormData {
            country: "Japan".into(),
            travel_style: "Relaxed".into(),
            interest: "Shopping".into(),
            budget: "Luxury".into(),
            duration: 5,
            group_type: "Solo".into(),
        }
    }

    #[test]
    fn with_replaces_only_the_named_field() {
        let form = filled();
        let next = form.with(FieldUpdate::Budget("Budget".into()));
        assert_eq!(next.budget, "Budget");
        assert_eq!(form.budget, "Luxury");
        assert_eq!(next.country, form.country);
        assert_eq!(next.duration, form.duration);
    }

    #[test]
    fn whitespace_counts_as_missing() {
        let form = filled()
            .with(FieldUpdate::Interest("  ".into()))
            .with(FieldUpdate::GroupType(String::new()));
        assert_eq!(
            form.missing_fields(),
            vec![FormField::Interest, FormField::GroupType]
        );
    }

    #[test]
    fn duration_bounds_are_inclusive() {
        for days in [1, 10] {
            assert!(filled().with(FieldUpdate::Duration(days)).duration_in_range());
        }
        for days in [0, 11, -3] {
            assert!(!filled().with(FieldUpdate::Duration(days)).duration_in_range());
        }
    }

    #[test]
    fn field_update_serializes_as_tagged_pair() {
        let json = serde_json::to_value(FieldUpdate::Duration(4)).expect("json");
        assert_eq!(json, serde_json::json!({"field": "duration", "value": 4}));
    }

    #[test]
    fn detail_path_uses_trip_id() {
        assert_eq!(trip_detail_path(&TripId::new("abc123")), "/trips/abc123");
    }
}
