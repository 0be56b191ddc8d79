// Event service: RSVP admission, listing and admin lifecycle
//
// Decision: Admission never separates the decision from its effect. The store
// applies "capacity > 0 AND user not in rsvps" and the mutation as one
// conditional update; the event is only re-read to explain a rejection.

use crate::storage::{
    models::{CreateEventRow, UpdateEvent},
    EventRow, StorageBackend,
};
use rsvp_core::telemetry::fields;
use rsvp_core::{
    parse_event_date, require_admin, required_text, validate_capacity, Event, EventError,
    EventWithAttendees, Identity, Result, UserProfile,
};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::api::events::{CreateEventRequest, UpdateEventRequest};

/// Conditional-update attempts before admission gives up.
/// A retry only happens when the event changed between the failed update and
/// the re-read (e.g. an admin raised capacity).
const MAX_ADMISSION_ATTEMPTS: usize = 3;

pub struct EventService {
    db: Arc<StorageBackend>,
}

impl EventService {
    pub fn new(db: Arc<StorageBackend>) -> Self {
        Self { db }
    }

    // ============================================
    // Admission
    // ============================================

    /// Admit `user_id` to the event, consuming one seat.
    ///
    /// Failures, in order: missing user id (`InvalidInput`), unknown event
    /// (`NotFound`), no seats (`CapacityExhausted`), already admitted
    /// (`DuplicateRsvp`). A malformed user id is `InvalidInput` once the
    /// event is known to exist.
    pub async fn request_rsvp(&self, event_id: Uuid, user_id: Option<&str>) -> Result<Event> {
        let span = tracing::info_span!(
            "rsvp.request",
            "event.id" = %event_id,
            "user.id" = tracing::field::Empty,
            "rsvp.outcome" = tracing::field::Empty,
        );

        let result = self
            .request_rsvp_inner(event_id, user_id)
            .instrument(span.clone())
            .await;

        let outcome = match &result {
            Ok(_) => "admitted",
            Err(EventError::CapacityExhausted(_)) => "capacity_exhausted",
            Err(EventError::DuplicateRsvp { .. }) => "duplicate",
            Err(EventError::NotFound(_)) => "not_found",
            Err(EventError::InvalidInput(_)) => "invalid_input",
            Err(_) => "error",
        };
        span.record(fields::OUTCOME, outcome);

        result
    }

    async fn request_rsvp_inner(&self, event_id: Uuid, user_id: Option<&str>) -> Result<Event> {
        let raw_user_id = user_id.map(str::trim).unwrap_or_default();
        if raw_user_id.is_empty() {
            return Err(EventError::invalid_input("User ID is required"));
        }

        let user_id = match Uuid::parse_str(raw_user_id) {
            Ok(id) => id,
            Err(_) => {
                // Unknown event wins over a malformed user id
                self.load(event_id).await?;
                return Err(EventError::invalid_input(format!(
                    "'{}' is not a valid user ID",
                    raw_user_id
                )));
            }
        };
        tracing::Span::current().record(fields::USER_ID, user_id.to_string().as_str());

        for attempt in 1..=MAX_ADMISSION_ATTEMPTS {
            if let Some(row) = self.db.admit_rsvp(event_id, user_id).await? {
                tracing::info!(
                    capacity = row.capacity,
                    attendees = row.rsvps.len(),
                    "RSVP admitted"
                );
                return Ok(Self::row_to_event(row));
            }

            // Nothing matched; explain why from the current state
            let event = self.load(event_id).await?;
            if !event.has_open_seats() {
                tracing::warn!("RSVP rejected: no seats available");
                return Err(EventError::CapacityExhausted(event_id));
            }
            if event.has_rsvp(user_id) {
                tracing::warn!("RSVP rejected: user already admitted");
                return Err(EventError::DuplicateRsvp { event_id, user_id });
            }

            tracing::debug!(attempt, "Event changed during admission, retrying");
        }

        Err(EventError::StoreUnavailable(anyhow::anyhow!(
            "admission for event {} did not settle after {} attempts",
            event_id,
            MAX_ADMISSION_ATTEMPTS
        )))
    }

    // ============================================
    // Queries
    // ============================================

    pub async fn get(&self, id: Uuid) -> Result<Event> {
        self.load(id).await
    }

    /// All events, or those whose type equals `event_type` exactly.
    /// A blank filter means no filter.
    pub async fn list(&self, event_type: Option<&str>) -> Result<Vec<Event>> {
        let filter = event_type.map(str::trim).filter(|t| !t.is_empty());
        let rows = self.db.list_events(filter).await?;
        Ok(rows.into_iter().map(Self::row_to_event).collect())
    }

    /// Events the user has RSVP'd to, with attendees resolved to profiles.
    /// An empty result is reported as `NotFound`.
    pub async fn list_user_rsvps(&self, user_id: Uuid) -> Result<Vec<EventWithAttendees>> {
        let rows = self.db.list_events_for_user(user_id).await?;
        if rows.is_empty() {
            return Err(EventError::not_found("RSVP'd events"));
        }

        let mut attendee_ids: Vec<Uuid> = rows.iter().flat_map(|r| r.rsvps.clone()).collect();
        attendee_ids.sort_unstable();
        attendee_ids.dedup();

        let profiles: std::collections::HashMap<Uuid, UserProfile> = self
            .db
            .get_users_by_ids(&attendee_ids)
            .await?
            .into_iter()
            .map(|p| {
                (
                    p.id,
                    UserProfile {
                        id: p.id,
                        name: p.name,
                        email: p.email,
                    },
                )
            })
            .collect();

        Ok(rows
            .into_iter()
            .map(|row| {
                let attendees = row
                    .rsvps
                    .iter()
                    .filter_map(|id| profiles.get(id).cloned())
                    .collect();
                EventWithAttendees::new(Self::row_to_event(row), attendees)
            })
            .collect())
    }

    // ============================================
    // Lifecycle (admin only)
    // ============================================

    pub async fn create(&self, identity: &Identity, req: CreateEventRequest) -> Result<Event> {
        require_admin(identity)?;

        let name = required_text("Name", req.name)?;
        let date = parse_event_date(&required_text("Date", req.date)?)?;
        let location = required_text("Location", req.location)?;
        let capacity = validate_capacity(
            req.capacity
                .ok_or_else(|| EventError::invalid_input("Capacity is required"))?,
        )?;
        let event_type = required_text("Event type", req.event_type)?;

        let span = tracing::info_span!(
            "event.create",
            "event.type" = %event_type,
            "event.id" = tracing::field::Empty,
        );

        self.create_inner(
            identity,
            CreateEventRow {
                name,
                date,
                location,
                capacity,
                event_type,
            },
        )
        .instrument(span)
        .await
    }

    async fn create_inner(&self, identity: &Identity, input: CreateEventRow) -> Result<Event> {
        let row = self.db.create_event(input).await?;

        tracing::Span::current().record(fields::EVENT_ID, row.id.to_string().as_str());
        tracing::info!(admin = %identity.id, capacity = row.capacity, "Event created");
        Ok(Self::row_to_event(row))
    }

    pub async fn update(
        &self,
        identity: &Identity,
        id: Uuid,
        req: UpdateEventRequest,
    ) -> Result<Event> {
        require_admin(identity)?;

        let input = UpdateEvent {
            name: req
                .name
                .map(|v| required_text("Name", Some(v)))
                .transpose()?,
            date: req
                .date
                .map(|v| parse_event_date(&required_text("Date", Some(v))?))
                .transpose()?,
            location: req
                .location
                .map(|v| required_text("Location", Some(v)))
                .transpose()?,
            capacity: req.capacity.map(validate_capacity).transpose()?,
            event_type: req
                .event_type
                .map(|v| required_text("Event type", Some(v)))
                .transpose()?,
        };

        let row = self
            .db
            .update_event(id, input)
            .await?
            .ok_or_else(|| EventError::not_found("Event"))?;

        tracing::info!(event.id = %id, admin = %identity.id, "Event updated");
        Ok(Self::row_to_event(row))
    }

    pub async fn delete(&self, identity: &Identity, id: Uuid) -> Result<()> {
        require_admin(identity)?;

        if !self.db.delete_event(id).await? {
            return Err(EventError::not_found("Event"));
        }

        tracing::info!(event.id = %id, admin = %identity.id, "Event deleted");
        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Event> {
        self.db
            .get_event(id)
            .await?
            .map(Self::row_to_event)
            .ok_or_else(|| EventError::not_found("Event"))
    }

    fn row_to_event(row: EventRow) -> Event {
        Event {
            id: row.id,
            name: row.name,
            date: row.date,
            location: row.location,
            capacity: row.capacity,
            event_type: row.event_type,
            rsvps: row.rsvps,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> EventService {
        EventService::new(Arc::new(StorageBackend::in_memory()))
    }

    fn admin() -> Identity {
        Identity::admin(Uuid::now_v7())
    }

    fn create_request(capacity: i64, event_type: &str) -> CreateEventRequest {
        CreateEventRequest {
            name: Some("Jazz Night".to_string()),
            date: Some("2030-06-01T19:00:00Z".to_string()),
            location: Some("Blue Room".to_string()),
            capacity: Some(capacity),
            event_type: Some(event_type.to_string()),
        }
    }

    async fn event_with_capacity(service: &EventService, capacity: i64) -> Event {
        service
            .create(&admin(), create_request(capacity, "concert"))
            .await
            .unwrap()
    }

    fn uid() -> String {
        Uuid::now_v7().to_string()
    }

    #[tokio::test]
    async fn test_capacity_one_example() {
        let service = service();
        let event = event_with_capacity(&service, 1).await;

        let u1 = uid();
        let admitted = service.request_rsvp(event.id, Some(&u1)).await.unwrap();
        assert_eq!(admitted.capacity, 0);
        assert_eq!(admitted.rsvps, vec![Uuid::parse_str(&u1).unwrap()]);

        let err = service
            .request_rsvp(event.id, Some(&uid()))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::CapacityExhausted(id) if id == event.id));
    }

    #[tokio::test]
    async fn test_admits_exactly_capacity_distinct_users() {
        let service = service();
        let event = event_with_capacity(&service, 5).await;

        for _ in 0..5 {
            service.request_rsvp(event.id, Some(&uid())).await.unwrap();
        }

        let err = service
            .request_rsvp(event.id, Some(&uid()))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::CapacityExhausted(_)));

        let stored = service.get(event.id).await.unwrap();
        assert_eq!(stored.capacity, 0);
        assert_eq!(stored.rsvps.len(), 5);
    }

    #[tokio::test]
    async fn test_duplicate_rsvp_decrements_once() {
        let service = service();
        let event = event_with_capacity(&service, 3).await;
        let user = uid();

        service.request_rsvp(event.id, Some(&user)).await.unwrap();
        let err = service
            .request_rsvp(event.id, Some(&user))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::DuplicateRsvp { .. }));

        let stored = service.get(event.id).await.unwrap();
        assert_eq!(stored.capacity, 2);
        assert_eq!(stored.rsvps.len(), 1);
    }

    #[tokio::test]
    async fn test_full_event_reports_capacity_before_duplicate() {
        let service = service();
        let event = event_with_capacity(&service, 1).await;
        let user = uid();

        service.request_rsvp(event.id, Some(&user)).await.unwrap();
        let err = service
            .request_rsvp(event.id, Some(&user))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::CapacityExhausted(_)));
    }

    #[tokio::test]
    async fn test_missing_user_id_is_invalid_input() {
        let service = service();
        let event = event_with_capacity(&service, 1).await;

        for user in [None, Some(""), Some("   ")] {
            let err = service.request_rsvp(event.id, user).await.unwrap_err();
            assert!(matches!(err, EventError::InvalidInput(_)));
        }

        // Missing user id is checked before event existence
        let err = service.request_rsvp(Uuid::now_v7(), None).await.unwrap_err();
        assert!(matches!(err, EventError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_unknown_event_not_found_regardless_of_user_id() {
        let service = service();
        let missing = Uuid::now_v7();

        let err = service
            .request_rsvp(missing, Some(&uid()))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::NotFound(_)));

        let err = service
            .request_rsvp(missing, Some("not-a-uuid"))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_malformed_user_id_on_existing_event() {
        let service = service();
        let event = event_with_capacity(&service, 1).await;

        let err = service
            .request_rsvp(event.id, Some("not-a-uuid"))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::InvalidInput(_)));
        assert_eq!(service.get(event.id).await.unwrap().capacity, 1);
    }

    #[tokio::test]
    async fn test_zero_capacity_event_rejects_everyone() {
        let service = service();
        let event = event_with_capacity(&service, 0).await;

        let err = service
            .request_rsvp(event.id, Some(&uid()))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::CapacityExhausted(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admissions_are_linearizable() {
        let service = Arc::new(service());
        let capacity = 7;
        let contenders = 40;
        let event = event_with_capacity(&service, capacity).await;

        let handles: Vec<_> = (0..contenders)
            .map(|_| {
                let service = service.clone();
                let user = uid();
                tokio::spawn(async move { service.request_rsvp(event.id, Some(&user)).await })
            })
            .collect();

        let mut admitted = 0;
        let mut exhausted = 0;
        for result in futures::future::join_all(handles).await {
            match result.unwrap() {
                Ok(_) => admitted += 1,
                Err(EventError::CapacityExhausted(_)) => exhausted += 1,
                Err(other) => panic!("unexpected admission error: {other}"),
            }
        }

        assert_eq!(admitted, capacity);
        assert_eq!(exhausted, contenders - capacity);

        let stored = service.get(event.id).await.unwrap();
        assert_eq!(stored.capacity, 0);
        assert_eq!(stored.rsvps.len() as i64, capacity);

        let mut unique = stored.rsvps.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), stored.rsvps.len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_requests_admit_once() {
        let service = Arc::new(service());
        let event = event_with_capacity(&service, 10).await;
        let user = uid();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                let user = user.clone();
                tokio::spawn(async move { service.request_rsvp(event.id, Some(&user)).await })
            })
            .collect();

        let results: Vec<_> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, EventError::DuplicateRsvp { .. })));

        let stored = service.get(event.id).await.unwrap();
        assert_eq!(stored.capacity, 9);
        assert_eq!(stored.rsvps.len(), 1);
    }

    #[tokio::test]
    async fn test_list_filters_by_exact_type() {
        let service = service();
        service
            .create(&admin(), create_request(1, "concert"))
            .await
            .unwrap();
        service
            .create(&admin(), create_request(1, "meetup"))
            .await
            .unwrap();
        service
            .create(&admin(), create_request(1, "concert"))
            .await
            .unwrap();

        assert_eq!(service.list(None).await.unwrap().len(), 3);
        assert_eq!(service.list(Some("  ")).await.unwrap().len(), 3);

        let concerts = service.list(Some("concert")).await.unwrap();
        assert_eq!(concerts.len(), 2);
        assert!(concerts.iter().all(|e| e.event_type == "concert"));

        assert!(service.list(Some("conc")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_rsvp_not_found() {
        let service = service();
        let event = event_with_capacity(&service, 2).await;

        service.delete(&admin(), event.id).await.unwrap();

        let err = service
            .request_rsvp(event.id, Some(&uid()))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::NotFound(_)));

        let err = service.delete(&admin(), event.id).await.unwrap_err();
        assert!(matches!(err, EventError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lifecycle_requires_admin() {
        let service = service();
        let user = Identity::user(Uuid::now_v7());

        let err = service
            .create(&user, create_request(1, "concert"))
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Forbidden(_)));

        let event = event_with_capacity(&service, 1).await;
        let err = service.delete(&user, event.id).await.unwrap_err();
        assert!(matches!(err, EventError::Forbidden(_)));

        let err = service
            .update(&user, event.id, UpdateEventRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Forbidden(_)));

        // Nothing was deleted
        assert!(service.get(event.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_validation() {
        let service = service();

        let mut missing_name = create_request(1, "concert");
        missing_name.name = None;
        assert!(matches!(
            service.create(&admin(), missing_name).await,
            Err(EventError::InvalidInput(_))
        ));

        let mut blank_type = create_request(1, "concert");
        blank_type.event_type = Some(" ".to_string());
        assert!(matches!(
            service.create(&admin(), blank_type).await,
            Err(EventError::InvalidInput(_))
        ));

        let mut no_capacity = create_request(1, "concert");
        no_capacity.capacity = None;
        assert!(matches!(
            service.create(&admin(), no_capacity).await,
            Err(EventError::InvalidInput(_))
        ));

        assert!(matches!(
            service.create(&admin(), create_request(-3, "concert")).await,
            Err(EventError::InvalidInput(_))
        ));

        let mut bad_date = create_request(1, "concert");
        bad_date.date = Some("someday".to_string());
        assert!(matches!(
            service.create(&admin(), bad_date).await,
            Err(EventError::InvalidInput(_))
        ));

        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_reopens_seats() {
        let service = service();
        let event = event_with_capacity(&service, 1).await;
        service.request_rsvp(event.id, Some(&uid())).await.unwrap();

        let updated = service
            .update(
                &admin(),
                event.id,
                UpdateEventRequest {
                    capacity: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.capacity, 2);
        assert_eq!(updated.rsvps.len(), 1);

        service.request_rsvp(event.id, Some(&uid())).await.unwrap();

        let err = service
            .update(
                &admin(),
                event.id,
                UpdateEventRequest {
                    capacity: Some(-1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_list_user_rsvps() {
        let db = Arc::new(StorageBackend::in_memory());
        let service = EventService::new(db.clone());

        let user = db
            .create_user(crate::storage::CreateUserRow {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password_hash: "hash".to_string(),
                preferences: None,
                is_admin: false,
            })
            .await
            .unwrap()
            .unwrap();

        let err = service.list_user_rsvps(user.id).await.unwrap_err();
        assert!(matches!(err, EventError::NotFound(_)));

        let event = event_with_capacity(&service, 3).await;
        let _other = event_with_capacity(&service, 3).await;
        let stranger = Uuid::now_v7();
        service
            .request_rsvp(event.id, Some(&user.id.to_string()))
            .await
            .unwrap();
        service
            .request_rsvp(event.id, Some(&stranger.to_string()))
            .await
            .unwrap();

        let events = service.list_user_rsvps(user.id).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, event.id);
        // Unregistered attendee ids are not resolved
        assert_eq!(events[0].rsvps.len(), 1);
        assert_eq!(events[0].rsvps[0].email, "ada@example.com");
    }
}
