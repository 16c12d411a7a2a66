use super::*;
use anyhow::anyhow;
use async_trait::async_trait;
use shared::{
    domain::{AuthUser, FormField, UserId},
    protocol::CreateTripResponse,
};
use tokio::sync::Notify;

struct StaticAuth {
    user: Option<AuthUser>,
    fail: bool,
}

impl StaticAuth {
    fn signed_in(id: &str) -> Self {
        Self {
            user: Some(AuthUser {
                id: UserId::new(id),
                name: "Ada".into(),
                email: "ada@example.com".into(),
            }),
            fail: false,
        }
    }

    fn signed_out() -> Self {
        Self {
            user: None,
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            user: None,
            fail: true,
        }
    }
}

#[async_trait]
impl AuthProvider for StaticAuth {
    async fn current_user(&self) -> Result<Option<AuthUser>> {
        if self.fail {
            return Err(anyhow!("session lookup failed"));
        }
        Ok(self.user.clone())
    }
}

enum Reply {
    Id(&'static str),
    NoId,
    Fail,
}

struct RecordingCreator {
    reply: Reply,
    calls: Mutex<Vec<CreateTripRequest>>,
    entered: Option<Arc<Notify>>,
    release: Option<Arc<Notify>>,
}

impl RecordingCreator {
    fn replying(reply: Reply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
            entered: None,
            release: None,
        }
    }

    fn gated(reply: Reply, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
            entered: Some(entered),
            release: Some(release),
        }
    }

    async fn calls(&self) -> Vec<CreateTripRequest> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl TripCreator for RecordingCreator {
    async fn create_trip(&self, request: CreateTripRequest) -> Result<CreateTripResponse> {
        self.calls.lock().await.push(request);
        if let Some(entered) = &self.entered {
            entered.notify_one();
        }
        if let Some(release) = &self.release {
            release.notified().await;
        }
        match self.reply {
            Reply::Id(id) => Ok(CreateTripResponse {
                id: Some(TripId::new(id)),
            }),
            Reply::NoId => Ok(CreateTripResponse::default()),
            Reply::Fail => Err(anyhow!("connection reset by peer")),
        }
    }
}

fn countries() -> Vec<Country> {
    vec![
        Country {
            name: "🇯🇵Japan".into(),
            coordinates: (36.0, 138.0),
            value: "Japan".into(),
            open_street_map: None,
        },
        Country {
            name: "🇵🇹Portugal".into(),
            coordinates: (39.5, -8.0),
            value: "Portugal".into(),
            open_street_map: Some("https://www.openstreetmap.org/relation/295480".into()),
        },
    ]
}

fn controller(auth: StaticAuth, creator: Arc<RecordingCreator>) -> TripDraftController {
    TripDraftController::new(Arc::new(auth), creator, countries())
}

async fn fill(controller: &TripDraftController) {
    for update in [
        FieldUpdate::Country("Portugal".into()),
        FieldUpdate::TravelStyle("Relaxed".into()),
        FieldUpdate::Interest("Food & Culinary".into()),
        FieldUpdate::Budget("Mid-range".into()),
        FieldUpdate::Duration(5),
        FieldUpdate::GroupType("Couple".into()),
    ] {
        controller.update_field(update).await;
    }
}

fn blank(field: FormField) -> FieldUpdate {
    match field {
        FormField::Country => FieldUpdate::Country(String::new()),
        FormField::TravelStyle => FieldUpdate::TravelStyle(String::new()),
        FormField::Interest => FieldUpdate::Interest(String::new()),
        FormField::Budget => FieldUpdate::Budget(String::new()),
        FormField::GroupType => FieldUpdate::GroupType(String::new()),
        FormField::Duration => FieldUpdate::Duration(0),
    }
}

#[tokio::test]
async fn initial_form_selects_first_country() {
    let creator = Arc::new(RecordingCreator::replying(Reply::Id("abc123")));
    let controller = controller(StaticAuth::signed_in("u-1"), creator);
    let form = controller.form().await;
    assert_eq!(form.country, "Japan");
    assert_eq!(form.duration, 0);
    assert!(form.travel_style.is_empty());
    assert_eq!(controller.request_state().await, RequestState::Idle);
}

#[tokio::test]
async fn empty_categorical_field_is_rejected_before_any_request() {
    for field in [
        FormField::Country,
        FormField::TravelStyle,
        FormField::Interest,
        FormField::Budget,
        FormField::GroupType,
    ] {
        let creator = Arc::new(RecordingCreator::replying(Reply::Id("abc123")));
        let controller = controller(StaticAuth::signed_in("u-1"), creator.clone());
        fill(&controller).await;
        controller.update_field(blank(field)).await;

        let outcome = controller.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected(FormError::MissingFields),
            "field {field:?}"
        );
        assert_eq!(
            controller.error_message().await.as_deref(),
            Some("Please provide values for all fields")
        );
        assert!(!controller.is_submitting().await);
        assert!(creator.calls().await.is_empty());
    }
}

#[tokio::test]
async fn duration_outside_range_is_rejected_before_any_request() {
    for days in [i64::MIN, -1, 0, 11, 30, i64::MAX] {
        let creator = Arc::new(RecordingCreator::replying(Reply::Id("abc123")));
        let controller = controller(StaticAuth::signed_in("u-1"), creator.clone());
        fill(&controller).await;
        controller.update_field(FieldUpdate::Duration(days)).await;

        let outcome = controller.submit().await;
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected(FormError::DurationOutOfRange),
            "duration {days}"
        );
        assert_eq!(
            controller.error_message().await.as_deref(),
            Some("Duration must be between 1 and 10 days")
        );
        assert!(!controller.is_submitting().await);
        assert!(creator.calls().await.is_empty());
    }
}

#[tokio::test]
async fn missing_fields_take_precedence_over_duration() {
    let creator = Arc::new(RecordingCreator::replying(Reply::Id("abc123")));
    let controller = controller(StaticAuth::signed_in("u-1"), creator);
    controller.update_field(FieldUpdate::Duration(99)).await;
    assert_eq!(
        controller.submit().await,
        SubmitOutcome::Rejected(FormError::MissingFields)
    );
}

#[tokio::test]
async fn unauthenticated_user_is_rejected_before_any_request() {
    let blank_id = StaticAuth {
        user: Some(AuthUser {
            id: UserId::new(""),
            name: String::new(),
            email: String::new(),
        }),
        fail: false,
    };
    for auth in [StaticAuth::signed_out(), StaticAuth::failing(), blank_id] {
        let creator = Arc::new(RecordingCreator::replying(Reply::Id("abc123")));
        let controller = controller(auth, creator.clone());
        fill(&controller).await;

        assert_eq!(
            controller.submit().await,
            SubmitOutcome::Rejected(FormError::NotAuthenticated)
        );
        assert_eq!(
            controller.error_message().await.as_deref(),
            Some("User not authenticated")
        );
        assert!(!controller.is_submitting().await);
        assert!(creator.calls().await.is_empty());
    }
}

#[tokio::test]
async fn successful_submission_returns_detail_route() {
    let creator = Arc::new(RecordingCreator::replying(Reply::Id("abc123")));
    let controller = controller(StaticAuth::signed_in("u-1"), creator.clone());
    fill(&controller).await;

    let outcome = controller.submit().await;
    assert_eq!(
        outcome,
        SubmitOutcome::Created {
            trip_id: TripId::new("abc123"),
            detail_path: "/trips/abc123".into(),
        }
    );
    assert_eq!(controller.error_message().await, None);
    assert!(!controller.is_submitting().await);
    assert_eq!(
        controller.request_state().await,
        RequestState::Succeeded {
            trip_id: TripId::new("abc123")
        }
    );

    let calls = creator.calls().await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].country, "Portugal");
    assert_eq!(calls[0].number_of_days, 5);
    assert_eq!(calls[0].interests, "Food & Culinary");
    assert_eq!(calls[0].user_id, UserId::new("u-1"));
}

#[tokio::test]
async fn response_without_id_reports_generation_failure() {
    let creator = Arc::new(RecordingCreator::replying(Reply::NoId));
    let controller = controller(StaticAuth::signed_in("u-1"), creator);
    fill(&controller).await;

    assert_eq!(
        controller.submit().await,
        SubmitOutcome::Rejected(FormError::GenerationFailed)
    );
    assert_eq!(
        controller.error_message().await.as_deref(),
        Some("Failed to generate trip")
    );
    assert!(!controller.is_submitting().await);
}

#[tokio::test]
async fn transport_failure_reports_generic_error() {
    let creator = Arc::new(RecordingCreator::replying(Reply::Fail));
    let controller = controller(StaticAuth::signed_in("u-1"), creator);
    fill(&controller).await;

    assert_eq!(
        controller.submit().await,
        SubmitOutcome::Rejected(FormError::Unexpected)
    );
    assert_eq!(
        controller.error_message().await.as_deref(),
        Some("Something went wrong")
    );
    assert!(!controller.is_submitting().await);
}

#[tokio::test]
async fn resubmitting_clears_previous_error() {
    let creator = Arc::new(RecordingCreator::replying(Reply::Id("trip-9")));
    let controller = controller(StaticAuth::signed_in("u-1"), creator);

    assert!(matches!(
        controller.submit().await,
        SubmitOutcome::Rejected(FormError::MissingFields)
    ));
    fill(&controller).await;
    assert!(matches!(
        controller.submit().await,
        SubmitOutcome::Created { .. }
    ));
    assert_eq!(controller.error_message().await, None);
}

#[tokio::test]
async fn second_submit_while_in_flight_is_ignored() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let creator = Arc::new(RecordingCreator::gated(
        Reply::Id("abc123"),
        entered.clone(),
        release.clone(),
    ));
    let controller = Arc::new(controller(StaticAuth::signed_in("u-1"), creator.clone()));
    fill(&controller).await;

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    entered.notified().await;

    assert!(controller.is_submitting().await);
    assert_eq!(controller.submit().await, SubmitOutcome::AlreadyInFlight);

    release.notify_one();
    let outcome = first.await.expect("join");
    assert!(matches!(outcome, SubmitOutcome::Created { .. }));
    assert_eq!(creator.calls().await.len(), 1);
    assert!(!controller.is_submitting().await);
}

#[tokio::test]
async fn reset_during_flight_keeps_request_state() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let creator = Arc::new(RecordingCreator::gated(
        Reply::NoId,
        entered.clone(),
        release.clone(),
    ));
    let controller = Arc::new(controller(StaticAuth::signed_in("u-1"), creator));
    fill(&controller).await;

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.submit().await }
    });
    entered.notified().await;
    controller.reset_form().await;
    assert!(controller.is_submitting().await);
    release.notify_one();

    assert_eq!(
        first.await.expect("join"),
        SubmitOutcome::Rejected(FormError::GenerationFailed)
    );
    assert_eq!(controller.form().await.country, "Japan");
    assert!(!controller.is_submitting().await);
}

#[tokio::test]
async fn load_fetches_countries_once() {
    struct CountingDirectory {
        calls: Mutex<u32>,
    }

    #[async_trait]
    impl CountryDirectory for CountingDirectory {
        async fn list_countries(&self) -> Result<Vec<Country>> {
            *self.calls.lock().await += 1;
            Ok(countries())
        }
    }

    let directory = CountingDirectory {
        calls: Mutex::new(0),
    };
    let controller = TripDraftController::load(
        Arc::new(StaticAuth::signed_in("u-1")),
        Arc::new(RecordingCreator::replying(Reply::Id("abc123"))),
        &directory,
    )
    .await
    .expect("load");
    assert_eq!(controller.countries().len(), 2);
    assert_eq!(*directory.calls.lock().await, 1);
}

#[tokio::test]
async fn load_surfaces_directory_failure() {
    let result = TripDraftController::load(
        Arc::new(StaticAuth::signed_in("u-1")),
        Arc::new(RecordingCreator::replying(Reply::Id("abc123"))),
        &crate::MissingCountryDirectory,
    )
    .await;
    let err = result.err().expect("should fail");
    assert!(format!("{err:#}").contains("failed to load country list"));
}

#[tokio::test]
async fn country_filter_and_marker() {
    let creator = Arc::new(RecordingCreator::replying(Reply::Id("abc123")));
    let controller = controller(StaticAuth::signed_in("u-1"), creator);

    assert_eq!(controller.country_options().len(), 2);
    let matches = controller.filter_countries("PORT");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].value, "Portugal");
    assert_eq!(controller.filter_countries("  ").len(), 2);

    let marker = controller.selected_country_marker().await.expect("marker");
    assert_eq!(marker.country, "Japan");
    assert_eq!(marker.color, SELECTED_COUNTRY_COLOR);

    controller
        .update_field(FieldUpdate::Country("Atlantis".into()))
        .await;
    assert!(controller.selected_country_marker().await.is_none());
}

#[test]
fn state_machine_rejects_illegal_transitions() {
    let mut state = RequestState::Idle;
    assert!(matches!(
        state.finish(&Ok(TripId::new("x"))),
        Err(FormError::IllegalTransition { from: "idle", .. })
    ));
    assert_eq!(state, RequestState::Idle);

    state.begin().expect("idle -> in_flight");
    assert_eq!(
        state.begin(),
        Err(FormError::IllegalTransition {
            from: "in_flight",
            to: "in_flight"
        })
    );
    assert!(state.is_in_flight());

    state
        .finish(&Err(FormError::GenerationFailed))
        .expect("in_flight -> failed");
    assert_eq!(state.error_message(), Some("Failed to generate trip"));

    state.begin().expect("failed -> in_flight");
    assert_eq!(state.error_message(), None);
    state
        .finish(&Ok(TripId::new("t-1")))
        .expect("in_flight -> succeeded");
    assert!(state.finish(&Ok(TripId::new("t-2"))).is_err());
    state.begin().expect("succeeded -> in_flight");
}

#[test]
fn validate_accepts_complete_form() {
    let form = TripFormData {
        country: "Japan".into(),
        travel_style: "Adventure".into(),
        interest: "Shopping".into(),
        budget: "Budget".into(),
        duration: 1,
        group_type: "Friends".into(),
    };
    assert_eq!(validate(&form), Ok(()));
    assert_eq!(
        validate(&form.with(FieldUpdate::Duration(10))),
        Ok(())
    );
}
