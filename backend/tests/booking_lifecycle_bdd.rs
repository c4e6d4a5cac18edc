//! Behaviour tests for booking, cancelling and completing appointments.
//!
//! Scenarios drive the booking service through the in-memory adapters with a
//! clock pinned to 2024-06-01 so times in the feature file read as UTC
//! wall-clock times on that day.

use std::sync::Arc;

use appointments::domain::ports::{
    BookAppointmentRequest, BookAppointmentResponse, BookingCommand, CatalogueStatus,
    NotificationKind, ServiceDefinition, TransitionAppointmentRequest,
    TransitionAppointmentResponse,
};
use appointments::domain::{
    Actor, AppointmentId, BookingFlow, BookingService, CancellationBuffer, ClientId, Error,
    ErrorCode, LifecycleEvent, SchedulingPolicy, ServiceDuration, ServiceId, StaffId,
};
use appointments::outbound::memory::{InMemoryAppointmentRepository, InMemoryCatalogue};
use appointments::test_support::{MutableClock, RecordingNotificationSink};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mockable::Clock;
use rstest::fixture;
use rstest_bdd::Slot;
use rstest_bdd_macros::{ScenarioState, given, scenario, then, when};
use tokio::runtime::Runtime;

type SalonService =
    BookingService<InMemoryAppointmentRepository, InMemoryCatalogue, RecordingNotificationSink>;

#[derive(Clone)]
struct RuntimeHandle(Arc<Runtime>);

/// Collaborators shared by every step of a scenario.
#[derive(Clone)]
struct Salon {
    staff_id: StaffId,
    client_id: ClientId,
    catalogue: Arc<InMemoryCatalogue>,
    clock: Arc<MutableClock>,
    notifications: Arc<RecordingNotificationSink>,
}

#[derive(Clone)]
struct ServiceHandle(Arc<SalonService>);

#[derive(Default, ScenarioState)]
struct BookingWorld {
    runtime: Slot<RuntimeHandle>,
    salon: Slot<Salon>,
    manicure: Slot<ServiceId>,
    service: Slot<ServiceHandle>,
    first_appointment: Slot<AppointmentId>,
    last_booking: Slot<Result<BookAppointmentResponse, Error>>,
    last_transition: Slot<Result<TransitionAppointmentResponse, Error>>,
}

impl BookingWorld {
    fn salon(&self) -> Salon {
        self.salon.get().expect("salon should be set up")
    }

    fn runtime(&self) -> RuntimeHandle {
        self.runtime.get().expect("runtime should be set up")
    }

    fn service(&self) -> ServiceHandle {
        self.service
            .get()
            .expect("cancellation buffer step should build the service")
    }

    fn transition(&self, event: LifecycleEvent, time: &str) {
        let salon = self.salon();
        salon.clock.set(on_booking_day(time));
        let appointment_id = self
            .first_appointment
            .get()
            .expect("an appointment should have been booked");
        let service = self.service();
        let runtime = self.runtime();
        let result = runtime.0.block_on(async {
            service
                .0
                .transition(TransitionAppointmentRequest {
                    actor: Actor::client(salon.client_id),
                    appointment_id,
                    event,
                    reason: None,
                })
                .await
        });
        self.last_transition.set(result);
    }
}

fn on_booking_day(time: &str) -> DateTime<Utc> {
    let day = NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date");
    let time = NaiveTime::parse_from_str(time, "%H:%M").expect("time should be HH:MM");
    day.and_time(time).and_utc()
}

#[fixture]
fn world() -> BookingWorld {
    BookingWorld::default()
}

#[given("a salon with staff member S and client C")]
fn a_salon_with_staff_and_client(world: &BookingWorld) {
    let runtime = Runtime::new().expect("create runtime");
    let catalogue = Arc::new(InMemoryCatalogue::new());
    let staff_id = StaffId::random();
    let client_id = ClientId::random();
    catalogue.register_staff(staff_id, CatalogueStatus::Active);
    catalogue.register_client(client_id, CatalogueStatus::Active);

    world.runtime.set(RuntimeHandle(Arc::new(runtime)));
    world.salon.set(Salon {
        staff_id,
        client_id,
        catalogue,
        clock: Arc::new(MutableClock::new(on_booking_day("06:00"))),
        notifications: Arc::new(RecordingNotificationSink::new()),
    });
}

#[given("the Manicure service lasts {minutes} minutes")]
fn the_manicure_service_lasts(world: &BookingWorld, minutes: i64) {
    let salon = world.salon();
    let id = ServiceId::random();
    salon.catalogue.register_service(ServiceDefinition {
        id,
        name: "Manicure".to_owned(),
        duration: ServiceDuration::from_minutes(minutes).expect("positive duration"),
        status: CatalogueStatus::Active,
    });
    world.manicure.set(id);
}

#[given("a {minutes} minute cancellation buffer")]
fn a_cancellation_buffer(world: &BookingWorld, minutes: u32) {
    let salon = world.salon();
    let clock: Arc<dyn Clock> = salon.clock.clone();
    let policy = SchedulingPolicy {
        buffer: CancellationBuffer::from_minutes(minutes),
        flow: BookingFlow::AutoConfirm,
        ..SchedulingPolicy::default()
    };
    let service = BookingService::new(
        Arc::new(InMemoryAppointmentRepository::new()),
        salon.catalogue.clone(),
        salon.notifications.clone(),
        clock,
        policy,
    );
    world.service.set(ServiceHandle(Arc::new(service)));
}

#[when("client C books a Manicure with S at {time}")]
fn client_books_a_manicure(world: &BookingWorld, time: String) {
    let salon = world.salon();
    let service_id = world.manicure.get().expect("manicure should be registered");
    let service = world.service();
    let runtime = world.runtime();
    let result = runtime.0.block_on(async {
        service
            .0
            .book(BookAppointmentRequest {
                actor: Actor::client(salon.client_id),
                client_id: salon.client_id,
                staff_id: salon.staff_id,
                service_id,
                requested_start: on_booking_day(&time).fixed_offset(),
                notes: None,
            })
            .await
    });
    if let Ok(response) = &result {
        if world.first_appointment.get().is_none() {
            world.first_appointment.set(response.appointment.id);
        }
    }
    world.last_booking.set(result);
}

#[when("client C cancels the first appointment at {time}")]
fn client_cancels_the_first_appointment(world: &BookingWorld, time: String) {
    world.transition(LifecycleEvent::Cancel, &time);
}

#[when("client C completes the first appointment at {time}")]
fn client_completes_the_first_appointment(world: &BookingWorld, time: String) {
    world.transition(LifecycleEvent::Complete, &time);
}

#[then("the booking succeeds from {start} to {end}")]
fn the_booking_succeeds(world: &BookingWorld, start: String, end: String) {
    let response = world
        .last_booking
        .get()
        .expect("a booking should have been attempted")
        .expect("booking should succeed");
    assert_eq!(response.appointment.start, on_booking_day(&start));
    assert_eq!(response.appointment.end, on_booking_day(&end));
}

#[then("the booking fails with a slot conflict")]
fn the_booking_fails_with_a_slot_conflict(world: &BookingWorld) {
    let error = world
        .last_booking
        .get()
        .expect("a booking should have been attempted")
        .expect_err("booking should fail");
    assert_eq!(error.code(), ErrorCode::SlotConflict);
}

#[then("the cancellation succeeds")]
fn the_cancellation_succeeds(world: &BookingWorld) {
    let response = world
        .last_transition
        .get()
        .expect("a cancellation should have been attempted")
        .expect("cancellation should succeed");
    assert!(response.changed);
    assert!(response.appointment.is_deleted);
    assert!(response.appointment.cancelled_at.is_some());
}

#[then("the cancellation fails with an invalid transition")]
fn the_cancellation_fails_with_an_invalid_transition(world: &BookingWorld) {
    let error = world
        .last_transition
        .get()
        .expect("a cancellation should have been attempted")
        .expect_err("cancellation should fail");
    assert_eq!(error.code(), ErrorCode::InvalidTransition);
}

#[then("the request is denied")]
fn the_request_is_denied(world: &BookingWorld) {
    let error = world
        .last_transition
        .get()
        .expect("a transition should have been attempted")
        .expect_err("transition should fail");
    assert_eq!(error.code(), ErrorCode::AuthorizationDenied);
}

#[then("{count} cancellation notifications were sent")]
fn cancellation_notifications_were_sent(world: &BookingWorld, count: usize) {
    let sent = world
        .salon()
        .notifications
        .sent()
        .into_iter()
        .filter(|notification| notification.kind == NotificationKind::Cancelled)
        .count();
    assert_eq!(sent, count);
}

#[scenario(
    path = "tests/features/booking_lifecycle.feature",
    name = "Adjacent bookings succeed and overlapping ones conflict"
)]
fn adjacent_bookings_succeed_and_overlapping_ones_conflict(world: BookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/booking_lifecycle.feature",
    name = "Cancellation respects the buffer and frees the slot"
)]
fn cancellation_respects_the_buffer_and_frees_the_slot(world: BookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/booking_lifecycle.feature",
    name = "Cancelling twice does not notify twice"
)]
fn cancelling_twice_does_not_notify_twice(world: BookingWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/booking_lifecycle.feature",
    name = "Clients cannot complete their own appointments"
)]
fn clients_cannot_complete_their_own_appointments(world: BookingWorld) {
    drop(world);
}
