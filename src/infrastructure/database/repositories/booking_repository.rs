//! SeaORM implementation of BookingRepository

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use sea_orm::prelude::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Select, Set, TransactionTrait,
};

use crate::domain::booking::{
    BookingRepository, BookingRequest, Decision, RequestDetails, RequestFilter, RequestKind,
    RequestStatus,
};
use crate::domain::station::model::slot_label;
use crate::domain::station::SlotStatus;
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{booking_request, slot, station};
use crate::shared::PaginatedResult;

const ALREADY_PROCESSED: &str = "This request has already been processed.";

pub struct SeaOrmBookingRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookingRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn model_to_domain(m: booking_request::Model) -> DomainResult<BookingRequest> {
    let kind = RequestKind::parse(&m.kind).ok_or_else(|| {
        DomainError::Storage(format!("Unrecognised request kind '{}' in database", m.kind))
    })?;
    let status = RequestStatus::parse(&m.status).ok_or_else(|| {
        DomainError::Storage(format!("Unrecognised request status '{}' in database", m.status))
    })?;

    // Missing references are kept as empty strings so `decide` can reject
    // them explicitly instead of failing the whole listing.
    let details = match kind {
        RequestKind::Booking => RequestDetails::Booking {
            station_id: m.station_id.unwrap_or_default(),
            station_name: m.station_name.unwrap_or_default(),
            slot_id: m.slot_id.unwrap_or_default(),
            vehicle_number: m.vehicle_number.unwrap_or_default(),
        },
        RequestKind::Emergency => RequestDetails::Emergency {
            location: m.location.unwrap_or_default(),
            vehicle_type: m.vehicle_type.unwrap_or_default(),
            message: m.message,
        },
    };

    Ok(BookingRequest {
        id: m.id,
        user_id: m.user_id,
        user_name: m.user_name,
        phone_number: m.phone_number,
        duration_minutes: m.duration_minutes.and_then(|d| u32::try_from(d).ok()),
        details,
        status,
        created_at: m.created_at,
        decided_at: m.decided_at,
        decided_by: m.decided_by,
    })
}

fn domain_to_active(r: &BookingRequest) -> booking_request::ActiveModel {
    let mut model = booking_request::ActiveModel {
        id: Set(r.id.clone()),
        user_id: Set(r.user_id.clone()),
        user_name: Set(r.user_name.clone()),
        kind: Set(r.kind().as_str().to_string()),
        status: Set(r.status.as_str().to_string()),
        phone_number: Set(r.phone_number.clone()),
        duration_minutes: Set(r.duration_minutes.map(|d| d.min(i32::MAX as u32) as i32)),
        station_id: Set(None),
        station_name: Set(None),
        slot_id: Set(None),
        vehicle_number: Set(None),
        location: Set(None),
        vehicle_type: Set(None),
        message: Set(None),
        created_at: Set(r.created_at),
        decided_at: Set(r.decided_at),
        decided_by: Set(r.decided_by.clone()),
    };

    match &r.details {
        RequestDetails::Booking {
            station_id,
            station_name,
            slot_id,
            vehicle_number,
        } => {
            model.station_id = Set(Some(station_id.clone()));
            model.station_name = Set(Some(station_name.clone()));
            model.slot_id = Set(Some(slot_id.clone()));
            model.vehicle_number = Set(Some(vehicle_number.clone()));
        }
        RequestDetails::Emergency {
            location,
            vehicle_type,
            message,
        } => {
            model.location = Set(Some(location.clone()));
            model.vehicle_type = Set(Some(vehicle_type.clone()));
            model.message = Set(message.clone());
        }
    }
    model
}

fn apply_filter(
    mut query: Select<booking_request::Entity>,
    filter: &RequestFilter,
) -> Select<booking_request::Entity> {
    if let Some(status) = filter.status {
        query = query.filter(booking_request::Column::Status.eq(status.as_str()));
    }
    if let Some(kind) = filter.kind {
        query = query.filter(booking_request::Column::Kind.eq(kind.as_str()));
    }
    if let Some(ref user_id) = filter.user_id {
        query = query.filter(booking_request::Column::UserId.eq(user_id.as_str()));
    }
    query
}

/// Body of the decision transaction. Every write is conditional on the
/// status read earlier in the same transaction, so a concurrent decision
/// shows up as zero affected rows and aborts.
async fn decide_in(
    txn: &DatabaseTransaction,
    request_id: &str,
    decision: Decision,
    admin_id: &str,
) -> DomainResult<BookingRequest> {
    let model = booking_request::Entity::find_by_id(request_id.to_string())
        .one(txn)
        .await?
        .ok_or_else(|| DomainError::not_found("BookingRequest", "id", request_id))?;

    let mut request = model_to_domain(model)?;
    if !request.is_pending() {
        return Err(DomainError::Conflict(ALREADY_PROCESSED.to_string()));
    }

    let now = Utc::now();

    if decision == Decision::Approve {
        if let Some((station_id, slot_id)) = request.slot_ref() {
            if station_id.is_empty() || slot_id.is_empty() {
                return Err(DomainError::Validation(
                    "Invalid booking request data.".to_string(),
                ));
            }

            station::Entity::find_by_id(station_id.to_string())
                .one(txn)
                .await?
                .ok_or_else(|| DomainError::not_found("Station", "id", station_id))?;

            let current = slot::Entity::find_by_id((station_id.to_string(), slot_id.to_string()))
                .one(txn)
                .await?
                .ok_or_else(|| DomainError::not_found("Slot", "id", slot_id))?;

            let no_longer_available = || {
                DomainError::Conflict(format!(
                    "Slot {} is no longer available.",
                    slot_label(slot_id)
                ))
            };

            if current.status != SlotStatus::Available.as_str() {
                return Err(no_longer_available());
            }

            let occupied = slot::Entity::update_many()
                .col_expr(slot::Column::Status, Expr::value(SlotStatus::Occupied.as_str()))
                .col_expr(slot::Column::UpdatedAt, Expr::value(now))
                .filter(slot::Column::StationId.eq(station_id))
                .filter(slot::Column::SlotId.eq(slot_id))
                .filter(slot::Column::Status.eq(SlotStatus::Available.as_str()))
                .exec(txn)
                .await?;
            if occupied.rows_affected != 1 {
                return Err(no_longer_available());
            }
        }
    }

    let target = decision.target_status();
    let updated = booking_request::Entity::update_many()
        .col_expr(booking_request::Column::Status, Expr::value(target.as_str()))
        .col_expr(booking_request::Column::DecidedAt, Expr::value(now))
        .col_expr(booking_request::Column::DecidedBy, Expr::value(admin_id))
        .filter(booking_request::Column::Id.eq(request_id))
        .filter(booking_request::Column::Status.eq(RequestStatus::Pending.as_str()))
        .exec(txn)
        .await?;
    if updated.rows_affected != 1 {
        return Err(DomainError::Conflict(ALREADY_PROCESSED.to_string()));
    }

    request.apply_decision(decision, admin_id, now);
    Ok(request)
}

// ── BookingRepository impl ──────────────────────────────────────

#[async_trait]
impl BookingRepository for SeaOrmBookingRepository {
    async fn save(&self, r: BookingRequest) -> DomainResult<()> {
        debug!("Saving {} request: {}", r.kind().as_str(), r.id);
        domain_to_active(&r).insert(&self.db).await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<BookingRequest>> {
        booking_request::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
            .map(model_to_domain)
            .transpose()
    }

    async fn find_filtered(
        &self,
        filter: &RequestFilter,
        page: u32,
        limit: u32,
    ) -> DomainResult<PaginatedResult<BookingRequest>> {
        let query = apply_filter(booking_request::Entity::find(), filter)
            .order_by_desc(booking_request::Column::CreatedAt)
            .order_by_desc(booking_request::Column::Id);

        let paginator = query.paginate(&self.db, u64::from(limit.max(1)));
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(u64::from(page.saturating_sub(1))).await?;
        let items = models
            .into_iter()
            .map(model_to_domain)
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(PaginatedResult::new(items, total, page, limit))
    }

    async fn count_pending(&self) -> DomainResult<u64> {
        Ok(booking_request::Entity::find()
            .filter(booking_request::Column::Status.eq(RequestStatus::Pending.as_str()))
            .count(&self.db)
            .await?)
    }

    async fn decide(
        &self,
        request_id: &str,
        decision: Decision,
        admin_id: &str,
    ) -> DomainResult<BookingRequest> {
        debug!("Deciding request {}: {}", request_id, decision.as_str());

        let txn = self.db.begin().await?;
        match decide_in(&txn, request_id, decision, admin_id).await {
            Ok(request) => {
                txn.commit().await?;
                Ok(request)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!("Rollback of decision on {} failed: {}", request_id, rollback_err);
                }
                Err(e)
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::station::{
        Charger, ChargerType, ConnectorType, GeoLocation, Slot, Station, StationRepository,
    };
    use crate::infrastructure::database::repositories::station_repository::SeaOrmStationRepository;
    use crate::infrastructure::database::test_database;

    struct Fixture {
        stations: SeaOrmStationRepository,
        bookings: SeaOrmBookingRepository,
    }

    async fn fixture() -> Fixture {
        let db = test_database().await;
        let stations = SeaOrmStationRepository::new(db.clone());
        stations
            .save(Station::new(
                "station-1",
                "Central Green Charge",
                "123 Eco Avenue, Downtown",
                GeoLocation { lat: 37.7749, lng: -122.4194 },
                "/placeholder.svg",
                vec![
                    Slot::new(
                        "slot-1",
                        SlotStatus::Available,
                        Charger::new(ChargerType::DC, ConnectorType::Ccs, "150kW"),
                    ),
                    Slot::new(
                        "slot-2",
                        SlotStatus::Occupied,
                        Charger::new(ChargerType::DC, ConnectorType::Ccs, "150kW"),
                    ),
                ],
            ))
            .await
            .unwrap();
        Fixture {
            stations,
            bookings: SeaOrmBookingRepository::new(db),
        }
    }

    fn booking(user: &str, slot_id: &str) -> BookingRequest {
        BookingRequest::new(
            Some(user),
            user,
            RequestDetails::Booking {
                station_id: "station-1".into(),
                station_name: "Central Green Charge".into(),
                slot_id: slot_id.into(),
                vehicle_number: "KA01AB1234".into(),
            },
        )
    }

    fn emergency(user: &str) -> BookingRequest {
        BookingRequest::new(
            Some(user),
            user,
            RequestDetails::Emergency {
                location: "Ring Road exit 4".into(),
                vehicle_type: "Hatchback".into(),
                message: Some("Battery at 1%".into()),
            },
        )
        .with_contact(Some("9876543210".into()), Some(30))
    }

    async fn slot_status(f: &Fixture, slot_id: &str) -> SlotStatus {
        f.stations
            .find_by_id("station-1")
            .await
            .unwrap()
            .unwrap()
            .slot(slot_id)
            .unwrap()
            .status
    }

    #[tokio::test]
    async fn save_and_find_roundtrip_keeps_details() {
        let f = fixture().await;
        let req = emergency("user-1");
        let id = req.id.clone();
        f.bookings.save(req.clone()).await.unwrap();

        let loaded = f.bookings.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(loaded.details, req.details);
        assert_eq!(loaded.phone_number.as_deref(), Some("9876543210"));
        assert_eq!(loaded.duration_minutes, Some(30));
        assert!(loaded.is_pending());
    }

    #[tokio::test]
    async fn approve_booking_occupies_slot() {
        let f = fixture().await;
        let req = booking("user-1", "slot-1");
        let id = req.id.clone();
        f.bookings.save(req).await.unwrap();

        let decided = f
            .bookings
            .decide(&id, Decision::Approve, "admin-1")
            .await
            .unwrap();
        assert_eq!(decided.status, RequestStatus::Approved);
        assert_eq!(decided.decided_by.as_deref(), Some("admin-1"));
        assert_eq!(slot_status(&f, "slot-1").await, SlotStatus::Occupied);

        let stored = f.bookings.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Approved);
        assert!(stored.decided_at.is_some());
    }

    #[tokio::test]
    async fn second_approval_for_same_slot_aborts() {
        let f = fixture().await;
        let first = booking("user-1", "slot-1");
        let second = booking("user-2", "slot-1");
        let (first_id, second_id) = (first.id.clone(), second.id.clone());
        f.bookings.save(first).await.unwrap();
        f.bookings.save(second).await.unwrap();

        f.bookings
            .decide(&first_id, Decision::Approve, "admin-1")
            .await
            .unwrap();
        let err = f
            .bookings
            .decide(&second_id, Decision::Approve, "admin-1")
            .await
            .unwrap_err();
        match err {
            DomainError::Conflict(msg) => assert_eq!(msg, "Slot 1 is no longer available."),
            other => panic!("expected conflict, got {other:?}"),
        }

        // The losing request is untouched and can still be rejected.
        let loser = f.bookings.find_by_id(&second_id).await.unwrap().unwrap();
        assert!(loser.is_pending());
        f.bookings
            .decide(&second_id, Decision::Reject, "admin-1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn reject_leaves_slot_available() {
        let f = fixture().await;
        let req = booking("user-1", "slot-1");
        let id = req.id.clone();
        f.bookings.save(req).await.unwrap();

        let decided = f
            .bookings
            .decide(&id, Decision::Reject, "admin-1")
            .await
            .unwrap();
        assert_eq!(decided.status, RequestStatus::Rejected);
        assert_eq!(slot_status(&f, "slot-1").await, SlotStatus::Available);
    }

    #[tokio::test]
    async fn processed_request_cannot_be_decided_again() {
        let f = fixture().await;
        let req = emergency("user-1");
        let id = req.id.clone();
        f.bookings.save(req).await.unwrap();

        f.bookings
            .decide(&id, Decision::Approve, "admin-1")
            .await
            .unwrap();
        let err = f
            .bookings
            .decide(&id, Decision::Reject, "admin-2")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(ref m) if m == ALREADY_PROCESSED));

        let stored = f.bookings.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Approved);
        assert_eq!(stored.decided_by.as_deref(), Some("admin-1"));
    }

    #[tokio::test]
    async fn approving_without_slot_reference_is_invalid() {
        let f = fixture().await;
        let mut req = booking("user-1", "");
        if let RequestDetails::Booking { station_id, .. } = &mut req.details {
            station_id.clear();
        }
        let id = req.id.clone();
        f.bookings.save(req).await.unwrap();

        let err = f
            .bookings
            .decide(&id, Decision::Approve, "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref m) if m == "Invalid booking request data."));
        assert!(f.bookings.find_by_id(&id).await.unwrap().unwrap().is_pending());
        assert_eq!(slot_status(&f, "slot-1").await, SlotStatus::Available);
    }

    #[tokio::test]
    async fn missing_slot_rolls_back() {
        let f = fixture().await;
        let req = booking("user-1", "slot-9");
        let id = req.id.clone();
        f.bookings.save(req).await.unwrap();

        let err = f
            .bookings
            .decide(&id, Decision::Approve, "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "Slot", .. }));
        assert!(f.bookings.find_by_id(&id).await.unwrap().unwrap().is_pending());
    }

    #[tokio::test]
    async fn approving_onto_occupied_slot_conflicts() {
        let f = fixture().await;
        let req = booking("user-1", "slot-2");
        let id = req.id.clone();
        f.bookings.save(req).await.unwrap();

        let err = f
            .bookings
            .decide(&id, Decision::Approve, "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(f.bookings.find_by_id(&id).await.unwrap().unwrap().is_pending());
    }

    #[tokio::test]
    async fn unknown_request_is_not_found() {
        let f = fixture().await;
        let err = f
            .bookings
            .decide("missing", Decision::Approve, "admin-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { entity: "BookingRequest", .. }));
    }

    #[tokio::test]
    async fn filtered_listing_and_pending_count() {
        let f = fixture().await;
        let a = booking("user-1", "slot-1");
        let b = emergency("user-2");
        let c = emergency("user-1");
        let b_id = b.id.clone();
        for r in [a, b, c] {
            f.bookings.save(r).await.unwrap();
        }
        f.bookings
            .decide(&b_id, Decision::Reject, "admin-1")
            .await
            .unwrap();

        assert_eq!(f.bookings.count_pending().await.unwrap(), 2);

        let pending = f
            .bookings
            .find_filtered(
                &RequestFilter {
                    status: Some(RequestStatus::Pending),
                    ..Default::default()
                },
                1,
                20,
            )
            .await
            .unwrap();
        assert_eq!(pending.total, 2);

        let mine = f
            .bookings
            .find_filtered(
                &RequestFilter {
                    user_id: Some("user-1".into()),
                    kind: Some(RequestKind::Emergency),
                    ..Default::default()
                },
                1,
                20,
            )
            .await
            .unwrap();
        assert_eq!(mine.items.len(), 1);
        assert_eq!(mine.items[0].user_id, "user-1");

        let paged = f
            .bookings
            .find_filtered(&RequestFilter::default(), 2, 2)
            .await
            .unwrap();
        assert_eq!(paged.total, 3);
        assert_eq!(paged.total_pages, 2);
        assert_eq!(paged.items.len(), 1);
    }
}
