//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`BookingCommand`, `AppointmentsQuery`) are implemented by
//! the booking service. Driven ports (`AppointmentRepository`,
//! `CatalogueLookup`, `NotificationSink`) are implemented by outbound
//! adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod appointment_repository;
mod appointments_query;
mod booking_command;
mod catalogue_lookup;
mod notification_sink;

#[cfg(test)]
pub use appointment_repository::MockAppointmentRepository;
pub use appointment_repository::{
    AppointmentFilter, AppointmentRepository, AppointmentRepositoryError, DateRange,
    FixtureAppointmentRepository,
};
#[cfg(test)]
pub use appointments_query::MockAppointmentsQuery;
pub use appointments_query::{
    AppointmentFilters, AppointmentsQuery, GetAppointmentRequest, GetAppointmentResponse,
    ListAppointmentsRequest,
};
#[cfg(test)]
pub use booking_command::MockBookingCommand;
pub use booking_command::{
    AppointmentPayload, BookAppointmentRequest, BookAppointmentResponse, BookingCommand,
    RescheduleAppointmentRequest, RescheduleAppointmentResponse, TransitionAppointmentRequest,
    TransitionAppointmentResponse,
};
#[cfg(test)]
pub use catalogue_lookup::MockCatalogueLookup;
pub use catalogue_lookup::{
    CatalogueLookup, CatalogueLookupError, CatalogueStatus, FixtureCatalogueLookup,
    ServiceDefinition,
};
#[cfg(test)]
pub use notification_sink::MockNotificationSink;
pub use notification_sink::{
    FixtureNotificationSink, Notification, NotificationKind, NotificationSink,
    NotificationSinkError, Recipient,
};
