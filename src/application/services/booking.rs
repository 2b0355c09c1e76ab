//! Booking and emergency request workflow
//!
//! Submissions land in the pending queue; an admin decision goes through
//! `BookingRepository::decide`, which flips slot and request together.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::application::events::{
    Event, RequestDecidedEvent, RequestSubmittedEvent, SharedEventBus, SlotStatusChangedEvent,
};
use crate::domain::booking::RequestFilter;
use crate::domain::station::SlotStatus;
use crate::domain::{
    BookingRequest, Decision, DomainError, DomainResult, RepositoryProvider, RequestDetails,
    RequestKind, RequestStatus,
};
use crate::shared::{retry_with_backoff, PaginatedResult, RetryConfig};

/// Display name recorded when neither the form nor the token carries one
const GUEST_NAME: &str = "Guest";

/// Caller identity taken from a verified token
#[derive(Debug, Clone)]
pub struct Submitter {
    pub user_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BookingSubmission {
    pub station_id: String,
    pub slot_id: String,
    pub vehicle_number: String,
    pub user_name: Option<String>,
    pub phone_number: Option<String>,
    pub duration_minutes: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct EmergencySubmission {
    pub location: String,
    pub vehicle_type: String,
    pub message: Option<String>,
    pub user_name: Option<String>,
    pub phone_number: Option<String>,
    pub duration_minutes: Option<u32>,
}

pub struct BookingService {
    repos: Arc<dyn RepositoryProvider>,
    events: SharedEventBus,
    retry: RetryConfig,
}

impl BookingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, events: SharedEventBus) -> Self {
        Self::with_retry(repos, events, RetryConfig::default())
    }

    pub fn with_retry(
        repos: Arc<dyn RepositoryProvider>,
        events: SharedEventBus,
        retry: RetryConfig,
    ) -> Self {
        Self {
            repos,
            events,
            retry,
        }
    }

    pub async fn submit_booking(
        &self,
        submitter: Option<&Submitter>,
        input: BookingSubmission,
    ) -> DomainResult<BookingRequest> {
        let station = self
            .repos
            .stations()
            .find_by_id(&input.station_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Station", "id", input.station_id.as_str()))?;
        let slot = station
            .slot(&input.slot_id)
            .ok_or_else(|| DomainError::not_found("Slot", "id", input.slot_id.as_str()))?;
        if !slot.is_available() {
            return Err(DomainError::Conflict(format!(
                "Slot {} is not available",
                slot.label()
            )));
        }

        let request = BookingRequest::new(
            submitter.map(|s| s.user_id.as_str()),
            display_name(submitter, input.user_name),
            RequestDetails::Booking {
                station_id: station.id.clone(),
                station_name: station.name.clone(),
                slot_id: input.slot_id,
                vehicle_number: input.vehicle_number,
            },
        )
        .with_contact(input.phone_number, input.duration_minutes);

        self.record_submission(request).await
    }

    pub async fn submit_emergency(
        &self,
        submitter: Option<&Submitter>,
        input: EmergencySubmission,
    ) -> DomainResult<BookingRequest> {
        let request = BookingRequest::new(
            submitter.map(|s| s.user_id.as_str()),
            display_name(submitter, input.user_name),
            RequestDetails::Emergency {
                location: input.location,
                vehicle_type: input.vehicle_type,
                message: input.message.filter(|m| !m.trim().is_empty()),
            },
        )
        .with_contact(input.phone_number, input.duration_minutes);

        self.record_submission(request).await
    }

    async fn record_submission(&self, request: BookingRequest) -> DomainResult<BookingRequest> {
        self.repos.bookings().save(request.clone()).await?;
        let pending = self.repos.bookings().count_pending().await?;

        metrics::counter!("booking_requests_submitted_total", "kind" => request.kind().as_str())
            .increment(1);
        info!(
            request_id = %request.id,
            kind = request.kind().as_str(),
            user_id = %request.user_id,
            "Request submitted"
        );

        self.events.publish(Event::RequestSubmitted(RequestSubmittedEvent::from_request(
            &request, pending,
        )));
        Ok(request)
    }

    /// Approve or reject a pending request.
    ///
    /// Storage failures are retried; conflicts and missing records are not.
    pub async fn decide(
        &self,
        request_id: &str,
        decision: Decision,
        admin_id: &str,
    ) -> DomainResult<BookingRequest> {
        let result = retry_with_backoff(
            &self.retry,
            || self.repos.bookings().decide(request_id, decision, admin_id),
            DomainError::is_transient,
            "decide_request",
        )
        .await;

        let outcome = match &result {
            Ok(_) => "committed",
            Err(DomainError::Conflict(_)) => "conflict",
            Err(_) => "failed",
        };
        metrics::counter!(
            "booking_decisions_total",
            "decision" => decision.as_str(),
            "outcome" => outcome
        )
        .increment(1);

        let request = match result {
            Ok(request) => request,
            Err(e) => {
                warn!(request_id, decision = decision.as_str(), error = %e, "Decision aborted");
                return Err(e);
            }
        };

        info!(
            request_id,
            decision = decision.as_str(),
            admin_id,
            kind = request.kind().as_str(),
            "Request decided"
        );

        if request.status == RequestStatus::Approved {
            if let Some((station_id, slot_id)) = request.slot_ref() {
                self.events.publish(Event::SlotStatusChanged(SlotStatusChangedEvent {
                    station_id: station_id.to_string(),
                    slot_id: slot_id.to_string(),
                    old_status: Some(SlotStatus::Available),
                    new_status: SlotStatus::Occupied,
                    timestamp: request.decided_at.unwrap_or_else(Utc::now),
                }));
            }
        }
        self.events
            .publish(Event::RequestDecided(RequestDecidedEvent::from_request(&request)));

        Ok(request)
    }

    pub async fn get(&self, id: &str) -> DomainResult<BookingRequest> {
        self.repos
            .bookings()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("BookingRequest", "id", id))
    }

    pub async fn list(
        &self,
        status: Option<RequestStatus>,
        kind: Option<RequestKind>,
        page: u32,
        limit: u32,
    ) -> DomainResult<PaginatedResult<BookingRequest>> {
        let filter = RequestFilter {
            status,
            kind,
            user_id: None,
        };
        self.repos.bookings().find_filtered(&filter, page, limit).await
    }

    pub async fn list_for_user(
        &self,
        user_id: &str,
        page: u32,
        limit: u32,
    ) -> DomainResult<PaginatedResult<BookingRequest>> {
        let filter = RequestFilter {
            user_id: Some(user_id.to_string()),
            ..RequestFilter::default()
        };
        self.repos.bookings().find_filtered(&filter, page, limit).await
    }

    pub async fn count_pending(&self) -> DomainResult<u64> {
        self.repos.bookings().count_pending().await
    }
}

fn display_name(submitter: Option<&Submitter>, from_form: Option<String>) -> String {
    from_form
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .or_else(|| submitter.and_then(|s| s.name.clone()))
        .unwrap_or_else(|| GUEST_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::create_event_bus;
    use crate::application::services::seed::seed_demo_data;
    use crate::infrastructure::database::test_database;
    use crate::infrastructure::SeaOrmRepositoryProvider;

    async fn service() -> (BookingService, Arc<dyn RepositoryProvider>, SharedEventBus) {
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(test_database().await));
        seed_demo_data(repos.as_ref()).await.unwrap();
        let events = create_event_bus();
        (
            BookingService::new(repos.clone(), events.clone()),
            repos,
            events,
        )
    }

    fn alice() -> Submitter {
        Submitter {
            user_id: "user-1".into(),
            name: Some("Alice Johnson".into()),
        }
    }

    fn booking(slot_id: &str) -> BookingSubmission {
        BookingSubmission {
            station_id: "station-1".into(),
            slot_id: slot_id.into(),
            vehicle_number: "EV-12345".into(),
            user_name: None,
            phone_number: None,
            duration_minutes: None,
        }
    }

    #[tokio::test]
    async fn booking_copies_station_name_and_token_name() {
        let (svc, _, _) = service().await;
        let request = svc.submit_booking(Some(&alice()), booking("slot-1")).await.unwrap();

        assert_eq!(request.user_id, "user-1");
        assert_eq!(request.user_name, "Alice Johnson");
        match &request.details {
            RequestDetails::Booking { station_name, .. } => {
                assert_eq!(station_name, "Central Green Charge")
            }
            other => panic!("unexpected details {other:?}"),
        }
    }

    #[tokio::test]
    async fn booking_an_occupied_slot_is_refused() {
        let (svc, _, _) = service().await;
        let err = svc.submit_booking(None, booking("slot-2")).await.unwrap_err();
        match err {
            DomainError::Conflict(msg) => assert_eq!(msg, "Slot 2 is not available"),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn guest_emergency_is_recorded_as_guest() {
        let (svc, _, _) = service().await;
        let request = svc
            .submit_emergency(
                None,
                EmergencySubmission {
                    location: "Highway 44, km 12 near the toll".into(),
                    vehicle_type: "SUV".into(),
                    message: Some("   ".into()),
                    user_name: Some("Bob".into()),
                    phone_number: Some("9876543210".into()),
                    duration_minutes: Some(60),
                },
            )
            .await
            .unwrap();
        assert!(request.is_guest());
        assert_eq!(request.user_name, "Bob");
        assert_eq!(
            request.details,
            RequestDetails::Emergency {
                location: "Highway 44, km 12 near the toll".into(),
                vehicle_type: "SUV".into(),
                message: None,
            }
        );
        assert_eq!(svc.count_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn approval_occupies_slot_and_publishes() {
        let (svc, repos, events) = service().await;
        let request = svc.submit_booking(Some(&alice()), booking("slot-3")).await.unwrap();
        let mut sub = events.subscribe();

        let decided = svc
            .decide(&request.id, Decision::Approve, "admin-1")
            .await
            .unwrap();
        assert_eq!(decided.status, RequestStatus::Approved);

        let station = repos.stations().find_by_id("station-1").await.unwrap().unwrap();
        assert_eq!(station.slot("slot-3").unwrap().status, SlotStatus::Occupied);

        let first = sub.recv().await.unwrap();
        assert_eq!(first.event.event_type(), "slot_status_changed");
        let second = sub.recv().await.unwrap();
        assert_eq!(second.event.event_type(), "request_decided");
    }

    #[tokio::test]
    async fn only_one_of_two_competing_approvals_commits() {
        let (svc, _, _) = service().await;
        let first = svc.submit_booking(Some(&alice()), booking("slot-1")).await.unwrap();
        let second = svc.submit_booking(None, booking("slot-1")).await.unwrap();

        let (a, b) = tokio::join!(
            svc.decide(&first.id, Decision::Approve, "admin-1"),
            svc.decide(&second.id, Decision::Approve, "admin-2"),
        );
        let committed = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
        assert_eq!(committed, 1);

        let loser = if a.is_ok() { &second.id } else { &first.id };
        assert!(svc.get(loser).await.unwrap().is_pending());
        assert_eq!(svc.count_pending().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn user_listing_only_shows_own_requests() {
        let (svc, _, _) = service().await;
        svc.submit_booking(Some(&alice()), booking("slot-1")).await.unwrap();
        svc.submit_booking(None, booking("slot-3")).await.unwrap();

        let mine = svc.list_for_user("user-1", 1, 20).await.unwrap();
        assert_eq!(mine.total, 1);

        let all = svc.list(Some(RequestStatus::Pending), None, 1, 20).await.unwrap();
        assert_eq!(all.total, 2);
    }

    #[test]
    fn display_name_prefers_form_then_token() {
        assert_eq!(display_name(Some(&alice()), Some("Friend".into())), "Friend");
        assert_eq!(display_name(Some(&alice()), Some(" ".into())), "Alice Johnson");
        assert_eq!(display_name(None, None), GUEST_NAME);
    }

    /// Fails the first `failures` calls to `decide` with `error()`, then delegates.
    struct FlakyDecisions {
        inner: SeaOrmRepositoryProvider,
        failures: u32,
        error: fn() -> DomainError,
        calls: std::sync::atomic::AtomicU32,
    }

    impl FlakyDecisions {
        fn calls(&self) -> u32 {
            self.calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl crate::domain::booking::BookingRepository for FlakyDecisions {
        async fn save(&self, request: BookingRequest) -> DomainResult<()> {
            self.inner.bookings().save(request).await
        }

        async fn find_by_id(&self, id: &str) -> DomainResult<Option<BookingRequest>> {
            self.inner.bookings().find_by_id(id).await
        }

        async fn find_filtered(
            &self,
            filter: &RequestFilter,
            page: u32,
            limit: u32,
        ) -> DomainResult<PaginatedResult<BookingRequest>> {
            self.inner.bookings().find_filtered(filter, page, limit).await
        }

        async fn count_pending(&self) -> DomainResult<u64> {
            self.inner.bookings().count_pending().await
        }

        async fn decide(
            &self,
            request_id: &str,
            decision: Decision,
            admin_id: &str,
        ) -> DomainResult<BookingRequest> {
            let call = self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            if call < self.failures {
                return Err((self.error)());
            }
            self.inner.bookings().decide(request_id, decision, admin_id).await
        }
    }

    impl RepositoryProvider for FlakyDecisions {
        fn stations(&self) -> &dyn crate::domain::station::StationRepository {
            self.inner.stations()
        }

        fn bookings(&self) -> &dyn crate::domain::booking::BookingRepository {
            self
        }

        fn users(&self) -> &dyn crate::domain::user::UserRepository {
            self.inner.users()
        }

        fn payments(&self) -> &dyn crate::domain::payment::PaymentRepository {
            self.inner.payments()
        }
    }

    async fn flaky_service(
        failures: u32,
        error: fn() -> DomainError,
    ) -> (BookingService, Arc<FlakyDecisions>) {
        let inner = SeaOrmRepositoryProvider::new(test_database().await);
        seed_demo_data(&inner).await.unwrap();
        let repos = Arc::new(FlakyDecisions {
            inner,
            failures,
            error,
            calls: std::sync::atomic::AtomicU32::new(0),
        });
        let retry = RetryConfig {
            max_attempts: 3,
            initial_delay: std::time::Duration::from_millis(1),
            backoff_multiplier: 1.0,
            max_delay: std::time::Duration::from_millis(1),
        };
        let svc = BookingService::with_retry(repos.clone(), create_event_bus(), retry);
        (svc, repos)
    }

    #[tokio::test]
    async fn transient_store_failure_is_retried() {
        let (svc, repos) =
            flaky_service(1, || DomainError::Storage("database is locked".into())).await;
        let request = svc.submit_booking(Some(&alice()), booking("slot-1")).await.unwrap();

        let decided = svc
            .decide(&request.id, Decision::Approve, "admin-1")
            .await
            .unwrap();
        assert_eq!(decided.status, RequestStatus::Approved);
        assert_eq!(repos.calls(), 2);
    }

    #[tokio::test]
    async fn conflicts_are_not_retried() {
        let (svc, repos) =
            flaky_service(u32::MAX, || DomainError::Conflict("Slot 1 is taken.".into())).await;
        let request = svc.submit_booking(Some(&alice()), booking("slot-1")).await.unwrap();

        let err = svc
            .decide(&request.id, Decision::Approve, "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(repos.calls(), 1);
    }

    #[tokio::test]
    async fn retries_stop_at_max_attempts() {
        let (svc, repos) =
            flaky_service(u32::MAX, || DomainError::Storage("database is locked".into())).await;
        let request = svc.submit_booking(Some(&alice()), booking("slot-1")).await.unwrap();

        let err = svc
            .decide(&request.id, Decision::Approve, "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)));
        assert_eq!(repos.calls(), 3);
    }
}
