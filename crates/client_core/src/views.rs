//! Shapes collaborator documents into the records the admin screens render.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use shared::{
    domain::{AuthUser, TripId},
    protocol::{TripCard, TripDetail, TripDocument, UserDocument, UserItineraryCount},
};
use tracing::{debug, warn};

use crate::{AuthProvider, TripStore, UserStore};

pub const POPULAR_TRIPS_LIMIT: u32 = 4;
pub const DASHBOARD_USERS_LIMIT: u32 = 4;
pub const GUEST_NAME: &str = "Guest";
pub const STATS_PAGE_SIZE: u32 = 100;
pub const ACTIVE_USER_STATUS: &str = "user";

pub fn parse_trip_data(raw: &str) -> Option<TripDetail> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(detail) => Some(detail),
        Err(error) => {
            warn!(%error, "failed to parse trip detail");
            None
        }
    }
}

pub fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or_default()
}

pub fn itinerary_summary(detail: &TripDetail, days: usize) -> String {
    detail
        .itinerary
        .iter()
        .take(days)
        .map(|plan| plan.location.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn trip_card(document: &TripDocument) -> TripCard {
    let detail = parse_trip_data(&document.trip_detail).unwrap_or_default();
    TripCard {
        id: document.id.clone(),
        image_url: document
            .image_urls
            .as_ref()
            .and_then(|urls| urls.first())
            .cloned()
            .unwrap_or_default(),
        location: detail
            .itinerary
            .first()
            .map(|plan| plan.location.clone())
            .unwrap_or_default(),
        tags: vec![detail.interests, detail.travel_style],
        name: detail.name,
        price: detail.estimated_price,
    }
}

pub fn user_itinerary_count(user: &UserDocument) -> UserItineraryCount {
    UserItineraryCount {
        image_url: user.image_url.clone().unwrap_or_default(),
        name: user.name.clone(),
        count: user.itinerary_count.unwrap_or(0),
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripDetailView {
    pub id: TripId,
    pub detail: Option<TripDetail>,
    pub image_urls: Vec<String>,
    pub duration_label: String,
    pub itinerary_summary: String,
    pub chips: Vec<String>,
    pub popular_trips: Vec<TripCard>,
}

pub async fn load_trip_detail(store: &dyn TripStore, trip_id: &TripId) -> Result<TripDetailView> {
    if trip_id.as_str().trim().is_empty() {
        bail!("Trip ID is required");
    }

    let (trip, popular) = futures::try_join!(
        store.get_trip(trip_id),
        store.list_trips(POPULAR_TRIPS_LIMIT, 0)
    )
    .with_context(|| format!("failed to load trip {trip_id}"))?;

    let trip = trip.with_context(|| format!("trip {trip_id} not found"))?;
    let detail = parse_trip_data(&trip.trip_detail);
    let (duration_label, itinerary_summary, chips) = match &detail {
        Some(detail) => (
            format!("{} day plan", detail.duration),
            itinerary_summary(detail, 5),
            [
                &detail.travel_style,
                &detail.group_type,
                &detail.budget,
                &detail.interests,
            ]
            .into_iter()
            .map(|text| first_word(text).to_string())
            .collect::<Vec<_>>(),
        ),
        None => (String::new(), String::new(), Vec::new()),
    };

    Ok(TripDetailView {
        id: trip.id.clone(),
        image_urls: trip.image_urls.clone().unwrap_or_default(),
        detail,
        duration_label,
        itinerary_summary,
        chips,
        popular_trips: popular.documents.iter().map(trip_card).collect(),
    })
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyCount {
    pub total: u64,
    pub current_month: u64,
    pub last_month: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: u64,
    pub users_joined: MonthlyCount,
    pub total_trips: u64,
    pub trips_created: MonthlyCount,
    pub active_users: MonthlyCount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub day: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelStyleCount {
    pub travel_style: String,
    pub count: u64,
}

fn month_of(date: DateTime<Utc>) -> (i32, u32) {
    (date.year(), date.month())
}

fn previous_month((year, month): (i32, u32)) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Undated entries count toward `total` only.
pub fn count_by_month<I>(dates: I, now: DateTime<Utc>) -> MonthlyCount
where
    I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
    let current = month_of(now);
    let last = previous_month(current);
    dates
        .into_iter()
        .fold(MonthlyCount::default(), |mut count, date| {
            count.total += 1;
            match date.map(month_of) {
                Some(month) if month == current => count.current_month += 1,
                Some(month) if month == last => count.last_month += 1,
                _ => {}
            }
            count
        })
}

pub fn is_active_user(user: &UserDocument) -> bool {
    user.status
        .as_deref()
        .is_some_and(|status| status.trim().eq_ignore_ascii_case(ACTIVE_USER_STATUS))
}

pub fn dashboard_stats(
    users: &[UserDocument],
    trips: &[TripDocument],
    now: DateTime<Utc>,
) -> DashboardStats {
    DashboardStats {
        total_users: users.len() as u64,
        users_joined: count_by_month(users.iter().map(|user| user.joined_at), now),
        total_trips: trips.len() as u64,
        trips_created: count_by_month(trips.iter().map(|trip| trip.created_at), now),
        active_users: count_by_month(
            users
                .iter()
                .filter(|user| is_active_user(user))
                .map(|user| user.joined_at),
            now,
        ),
    }
}

/// Sign-ups per calendar day in date order, labelled like "Jan 5".
pub fn user_growth_per_day(users: &[UserDocument]) -> Vec<DayCount> {
    let mut days: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for joined in users.iter().filter_map(|user| user.joined_at) {
        *days.entry(joined.date_naive()).or_default() += 1;
    }
    days.into_iter()
        .map(|(day, count)| DayCount {
            day: day.format("%b %-d").to_string(),
            count,
        })
        .collect()
}

/// Most common style first; ties in name order.
pub fn trips_by_travel_style(trips: &[TripDocument]) -> Vec<TravelStyleCount> {
    let mut styles: BTreeMap<String, u64> = BTreeMap::new();
    for detail in trips
        .iter()
        .filter_map(|trip| parse_trip_data(&trip.trip_detail))
    {
        let style = detail.travel_style.trim();
        if !style.is_empty() {
            *styles.entry(style.to_string()).or_default() += 1;
        }
    }
    let mut counts: Vec<TravelStyleCount> = styles
        .into_iter()
        .map(|(travel_style, count)| TravelStyleCount {
            travel_style,
            count,
        })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Session account joined with its user document, when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub account: AuthUser,
    pub name: String,
    pub email: String,
    pub image_url: Option<String>,
    pub status: Option<String>,
}

impl UserProfile {
    fn from_parts(account: AuthUser, document: Option<UserDocument>) -> Self {
        match document {
            Some(document) => Self {
                name: non_blank(document.name).unwrap_or_else(|| account.name.clone()),
                email: non_blank(document.email).unwrap_or_else(|| account.email.clone()),
                image_url: document.image_url,
                status: document.status,
                account,
            },
            None => Self {
                name: account.name.clone(),
                email: account.email.clone(),
                image_url: None,
                status: None,
                account,
            },
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            GUEST_NAME
        } else {
            &self.name
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}

pub async fn current_user_profile(
    auth: &dyn AuthProvider,
    users: &dyn UserStore,
) -> Result<Option<UserProfile>> {
    let Some(account) = auth.current_user().await? else {
        return Ok(None);
    };
    let document = users
        .find_by_account(account.id.as_str())
        .await
        .with_context(|| format!("failed to look up user document for {}", account.id))?;
    if document.is_none() {
        debug!(account_id = %account.id, "no user document for session account");
    }
    Ok(Some(UserProfile::from_parts(account, document)))
}

async fn all_trips(store: &dyn TripStore) -> Result<Vec<TripDocument>> {
    let mut documents = Vec::new();
    let mut offset = 0u32;
    loop {
        let page = store.list_trips(STATS_PAGE_SIZE, offset).await?;
        let fetched = page.documents.len() as u32;
        documents.extend(page.documents);
        offset += fetched;
        if fetched < STATS_PAGE_SIZE || u64::from(offset) >= page.total {
            return Ok(documents);
        }
    }
}

async fn all_users(store: &dyn UserStore) -> Result<Vec<UserDocument>> {
    let mut documents = Vec::new();
    let mut offset = 0u32;
    loop {
        let page = store.list_users(STATS_PAGE_SIZE, offset).await?;
        let fetched = page.documents.len() as u32;
        documents.extend(page.documents);
        offset += fetched;
        if fetched < STATS_PAGE_SIZE || u64::from(offset) >= page.total {
            return Ok(documents);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub greeting: String,
    pub user: Option<UserProfile>,
    pub stats: DashboardStats,
    pub user_growth: Vec<DayCount>,
    pub trips_by_travel_style: Vec<TravelStyleCount>,
    pub trips: Vec<TripCard>,
    pub users: Vec<UserItineraryCount>,
}

pub async fn load_dashboard(
    auth: &dyn AuthProvider,
    trips: &dyn TripStore,
    users: &dyn UserStore,
) -> Result<DashboardView> {
    load_dashboard_at(auth, trips, users, Utc::now()).await
}

/// `load_dashboard` with an explicit clock for the monthly counts.
pub async fn load_dashboard_at(
    auth: &dyn AuthProvider,
    trips: &dyn TripStore,
    users: &dyn UserStore,
    now: DateTime<Utc>,
) -> Result<DashboardView> {
    let (profile, trip_page, user_page, every_trip, every_user) = futures::try_join!(
        current_user_profile(auth, users),
        trips.list_trips(POPULAR_TRIPS_LIMIT, 0),
        users.list_users(DASHBOARD_USERS_LIMIT, 0),
        all_trips(trips),
        all_users(users)
    )
    .context("failed to load dashboard")?;

    let name = profile
        .as_ref()
        .map(UserProfile::display_name)
        .unwrap_or(GUEST_NAME);

    Ok(DashboardView {
        greeting: format!("welcome {name}"),
        stats: dashboard_stats(&every_user, &every_trip, now),
        user_growth: user_growth_per_day(&every_user),
        trips_by_travel_style: trips_by_travel_style(&every_trip),
        trips: trip_page.documents.iter().map(trip_card).collect(),
        users: user_page.documents.iter().map(user_itinerary_count).collect(),
        user: profile,
    })
}
