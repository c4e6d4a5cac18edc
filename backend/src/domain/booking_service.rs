//! Booking coordinator implementing the appointment driving ports.
//!
//! Every request runs the same protocol: authorise, validate, decide in the
//! pure domain, persist through the repository's atomic write, and only
//! then dispatch notifications. A request either commits one new snapshot
//! or fails with a typed [`Error`]; callers never observe partial state.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use mockable::Clock;
use pagination::Page;
use tracing::{info, warn};

use crate::domain::booking_service_support::{
    map_catalogue_error, map_repository_error, map_slot_error, map_transition_error,
    map_validation_error, notifications_for,
};
use crate::domain::ports::{
    AppointmentFilter, AppointmentPayload, AppointmentRepository, AppointmentRepositoryError,
    AppointmentsQuery, BookAppointmentRequest, BookAppointmentResponse, BookingCommand,
    CatalogueLookup, CatalogueStatus, DateRange, GetAppointmentRequest, GetAppointmentResponse,
    ListAppointmentsRequest, NotificationKind, NotificationSink, RescheduleAppointmentRequest,
    RescheduleAppointmentResponse, ServiceDefinition, TransitionAppointmentRequest,
    TransitionAppointmentResponse,
};
use crate::domain::{
    Action, Actor, Appointment, AppointmentDraft, AppointmentId, AvailabilityChecker, Error,
    LifecycleEvent, ListScope, Ownership, SchedulingPolicy, TimeSlot, TransitionContext,
    TransitionOutcome, can,
};

/// Appointment service implementing [`BookingCommand`] and
/// [`AppointmentsQuery`].
///
/// Cloning shares the underlying ports.
pub struct BookingService<R, C, N> {
    appointments: Arc<R>,
    catalogue: Arc<C>,
    notifications: Arc<N>,
    availability: AvailabilityChecker<R>,
    clock: Arc<dyn Clock>,
    policy: SchedulingPolicy,
}

impl<R, C, N> Clone for BookingService<R, C, N> {
    fn clone(&self) -> Self {
        Self {
            appointments: Arc::clone(&self.appointments),
            catalogue: Arc::clone(&self.catalogue),
            notifications: Arc::clone(&self.notifications),
            availability: self.availability.clone(),
            clock: Arc::clone(&self.clock),
            policy: self.policy,
        }
    }
}

impl<R, C, N> BookingService<R, C, N> {
    /// Create a booking service over its driven ports.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use appointments::domain::{BookingService, SchedulingPolicy};
    /// # use appointments::domain::ports::{
    /// #     FixtureAppointmentRepository, FixtureCatalogueLookup, FixtureNotificationSink,
    /// # };
    /// # use mockable::DefaultClock;
    /// let service = BookingService::new(
    ///     Arc::new(FixtureAppointmentRepository),
    ///     Arc::new(FixtureCatalogueLookup),
    ///     Arc::new(FixtureNotificationSink),
    ///     Arc::new(DefaultClock),
    ///     SchedulingPolicy::default(),
    /// );
    /// # let _ = service;
    /// ```
    pub fn new(
        appointments: Arc<R>,
        catalogue: Arc<C>,
        notifications: Arc<N>,
        clock: Arc<dyn Clock>,
        policy: SchedulingPolicy,
    ) -> Self {
        Self {
            availability: AvailabilityChecker::new(Arc::clone(&appointments)),
            appointments,
            catalogue,
            notifications,
            clock,
            policy,
        }
    }

    /// Rules this service applies to every request.
    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    fn transition_context(&self, actor: &Actor, reason: Option<String>) -> TransitionContext {
        TransitionContext {
            now: self.clock.utc(),
            actor_id: actor.id,
            bypass_buffer: actor.is_admin(),
            buffer: self.policy.buffer,
            flow: self.policy.flow,
            reason,
        }
    }
}

impl<R, C, N> BookingService<R, C, N>
where
    R: AppointmentRepository,
    C: CatalogueLookup,
    N: NotificationSink,
{
    async fn load(&self, id: &AppointmentId) -> Result<Appointment, Error> {
        self.appointments
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(format!("appointment {id} not found")))
    }

    async fn load_authorised(
        &self,
        actor: &Actor,
        id: &AppointmentId,
        action: Action,
    ) -> Result<Appointment, Error> {
        let appointment = self.load(id).await?;
        if !can(actor, action, &appointment.ownership()) {
            return Err(denied(actor, action));
        }
        Ok(appointment)
    }

    async fn bookable_service(
        &self,
        request: &BookAppointmentRequest,
    ) -> Result<ServiceDefinition, Error> {
        let service = self
            .catalogue
            .service(&request.service_id)
            .await
            .map_err(map_catalogue_error)?
            .filter(|service| service.status == CatalogueStatus::Active)
            .ok_or_else(|| Error::not_found(format!("service {} not found", request.service_id)))?;

        let client = self
            .catalogue
            .client_status(&request.client_id)
            .await
            .map_err(map_catalogue_error)?;
        if client != Some(CatalogueStatus::Active) {
            return Err(Error::not_found(format!(
                "client {} not found",
                request.client_id
            )));
        }

        let staff = self
            .catalogue
            .staff_status(&request.staff_id)
            .await
            .map_err(map_catalogue_error)?;
        if staff != Some(CatalogueStatus::Active) {
            return Err(Error::not_found(format!(
                "staff member {} not found",
                request.staff_id
            )));
        }

        Ok(service)
    }

    async fn ensure_free(
        &self,
        appointment: &Appointment,
        exclude: Option<AppointmentId>,
    ) -> Result<(), Error> {
        let free = self
            .availability
            .is_available(&appointment.staff_id(), &appointment.slot(), exclude)
            .await
            .map_err(map_repository_error)?;
        if free {
            Ok(())
        } else {
            Err(slot_conflict(&appointment.slot()))
        }
    }

    async fn persist_update(&self, next: &Appointment, expected: u64) -> Result<(), Error> {
        self.appointments
            .update(next, expected)
            .await
            .map_err(|error| {
                if matches!(
                    error,
                    AppointmentRepositoryError::VersionMismatch { .. }
                        | AppointmentRepositoryError::SlotTaken { .. }
                ) {
                    warn!(
                        appointment_id = %next.id(),
                        error_kind = error.kind(),
                        error = %error,
                        "lost a concurrent update"
                    );
                }
                map_repository_error(error)
            })
    }

    /// Failures are logged and swallowed: the change is already committed.
    async fn notify(&self, appointment: &Appointment, kind: NotificationKind) {
        for notification in notifications_for(appointment, kind) {
            if let Err(error) = self.notifications.dispatch(&notification).await {
                warn!(
                    appointment_id = %appointment.id(),
                    kind = %kind,
                    error_kind = error.kind(),
                    error = %error,
                    "notification dispatch failed"
                );
            }
        }
    }
}

#[async_trait]
impl<R, C, N> BookingCommand for BookingService<R, C, N>
where
    R: AppointmentRepository,
    C: CatalogueLookup,
    N: NotificationSink,
{
    async fn book(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<BookAppointmentResponse, Error> {
        let ownership = Ownership {
            client_id: request.client_id,
            staff_id: request.staff_id,
        };
        if !can(&request.actor, Action::Book, &ownership) {
            return Err(denied(&request.actor, Action::Book));
        }

        let service = self.bookable_service(&request).await?;
        let slot = TimeSlot::starting_at(request.requested_start, service.duration)
            .map_err(map_slot_error)?;
        let appointment = Appointment::book(AppointmentDraft {
            id: AppointmentId::random(),
            client_id: request.client_id,
            staff_id: request.staff_id,
            service_id: service.id,
            slot,
            notes: request.notes,
            booked_at: self.clock.utc(),
            flow: self.policy.flow,
        })
        .map_err(map_validation_error)?;

        self.ensure_free(&appointment, None).await?;
        self.appointments
            .insert(&appointment)
            .await
            .map_err(|error| {
                if matches!(error, AppointmentRepositoryError::SlotTaken { .. }) {
                    warn!(
                        error_kind = error.kind(),
                        staff_id = %appointment.staff_id(),
                        start = %slot.start(),
                        "booking lost a race for the slot"
                    );
                }
                map_repository_error(error)
            })?;

        info!(
            appointment_id = %appointment.id(),
            staff_id = %appointment.staff_id(),
            event = "book",
            status = %appointment.status(),
            "appointment booked"
        );
        self.notify(&appointment, NotificationKind::Booked).await;

        Ok(BookAppointmentResponse {
            appointment: AppointmentPayload::from(&appointment),
        })
    }

    async fn transition(
        &self,
        request: TransitionAppointmentRequest,
    ) -> Result<TransitionAppointmentResponse, Error> {
        let TransitionAppointmentRequest {
            actor,
            appointment_id,
            event,
            reason,
        } = request;
        let current = self
            .load_authorised(&actor, &appointment_id, Action::from(event))
            .await?;
        let ctx = self.transition_context(&actor, reason);

        let next = match current.apply(event, &ctx).map_err(map_transition_error)? {
            TransitionOutcome::Applied(next) => next,
            TransitionOutcome::Unchanged => {
                return Ok(TransitionAppointmentResponse {
                    appointment: AppointmentPayload::from(&current),
                    changed: false,
                });
            }
        };
        self.persist_update(&next, current.version()).await?;

        info!(
            appointment_id = %next.id(),
            staff_id = %next.staff_id(),
            event = %event,
            status = %next.status(),
            "appointment transitioned"
        );
        match event {
            LifecycleEvent::Cancel => self.notify(&next, NotificationKind::Cancelled).await,
            LifecycleEvent::Complete => self.notify(&next, NotificationKind::Completed).await,
            LifecycleEvent::Confirm => {}
        }

        Ok(TransitionAppointmentResponse {
            appointment: AppointmentPayload::from(&next),
            changed: true,
        })
    }

    async fn reschedule(
        &self,
        request: RescheduleAppointmentRequest,
    ) -> Result<RescheduleAppointmentResponse, Error> {
        let current = self
            .load_authorised(&request.actor, &request.appointment_id, Action::Reschedule)
            .await?;
        let target = current
            .slot()
            .moved_to(request.new_start)
            .map_err(map_slot_error)?;
        let ctx = self.transition_context(&request.actor, None);
        let next = current
            .reschedule(target, &ctx)
            .map_err(map_transition_error)?;

        self.ensure_free(&next, Some(next.id())).await?;
        self.persist_update(&next, current.version()).await?;

        info!(
            appointment_id = %next.id(),
            staff_id = %next.staff_id(),
            event = "reschedule",
            start = %target.start(),
            "appointment rescheduled"
        );
        self.notify(&next, NotificationKind::Rescheduled).await;

        Ok(RescheduleAppointmentResponse {
            appointment: AppointmentPayload::from(&next),
        })
    }
}

#[async_trait]
impl<R, C, N> AppointmentsQuery for BookingService<R, C, N>
where
    R: AppointmentRepository,
    C: CatalogueLookup,
    N: NotificationSink,
{
    async fn list_appointments(
        &self,
        request: ListAppointmentsRequest,
    ) -> Result<Page<AppointmentPayload>, Error> {
        let ListAppointmentsRequest {
            actor,
            filters,
            page,
            page_size,
        } = request;
        let page = self
            .policy
            .page_request(page, page_size)
            .map_err(|err| Error::validation(format!("invalid page request: {err}")))?;

        if filters.include_deleted && !actor.is_admin() {
            return Err(denied(&actor, Action::ViewDeleted));
        }
        let date_range = DateRange {
            from: filters.from.map(|from| from.with_timezone(&Utc)),
            until: filters.until.map(|until| until.with_timezone(&Utc)),
        };
        if let (Some(from), Some(until)) = (date_range.from, date_range.until) {
            if until <= from {
                return Err(Error::validation("date range must end after it starts"));
            }
        }

        let mut filter = AppointmentFilter {
            staff_id: filters.staff_id,
            client_id: filters.client_id,
            status: filters.status,
            date_range,
            notes_contains: filters
                .notes_contains
                .map(|needle| needle.trim().to_owned())
                .filter(|needle| !needle.is_empty()),
            include_deleted: filters.include_deleted,
        };
        match ListScope::for_actor(&actor) {
            ListScope::Everything => {}
            ListScope::Staff(own) => {
                if filter.staff_id.is_some_and(|id| id != own) {
                    return Err(denied(&actor, Action::View));
                }
                filter.staff_id = Some(own);
            }
            ListScope::Client(own) => {
                if filter.client_id.is_some_and(|id| id != own) {
                    return Err(denied(&actor, Action::View));
                }
                filter.client_id = Some(own);
            }
        }

        let listed = self
            .appointments
            .list(&filter, page)
            .await
            .map_err(map_repository_error)?;
        Ok(listed.map(|appointment| AppointmentPayload::from(&appointment)))
    }

    async fn get_appointment(
        &self,
        request: GetAppointmentRequest,
    ) -> Result<GetAppointmentResponse, Error> {
        let appointment = self.load(&request.appointment_id).await?;
        let ownership = appointment.ownership();
        let visible = can(&request.actor, Action::View, &ownership)
            && (!appointment.is_deleted()
                || can(&request.actor, Action::ViewDeleted, &ownership));
        if !visible {
            return Err(Error::not_found(format!(
                "appointment {} not found",
                request.appointment_id
            )));
        }
        Ok(GetAppointmentResponse {
            appointment: AppointmentPayload::from(appointment),
        })
    }
}

fn denied(actor: &Actor, action: Action) -> Error {
    Error::authorization_denied(format!("actor {} may not {action} here", actor.id))
}

fn slot_conflict(slot: &TimeSlot) -> Error {
    Error::slot_conflict("the requested slot overlaps an existing appointment").with_details(
        serde_json::json!({
            "start": slot.start(),
            "end": slot.end(),
        }),
    )
}

#[cfg(test)]
#[path = "booking_service_tests.rs"]
mod tests;
